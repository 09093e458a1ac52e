//! Port traits through which the core reaches prices, configuration and
//! report output.

pub mod config_port;
pub mod price_port;
pub mod report_port;
