//! quantdash: backtested strategy performance and portfolio risk metrics
//! from daily price series.
//!
//! Hexagonal architecture: pure computations in [`domain`], port traits in
//! [`ports`], concrete implementations in [`adapters`], wiring in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
