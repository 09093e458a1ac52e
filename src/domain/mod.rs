//! Core domain types and the pure numerical transforms.

pub mod price;
pub mod returns;
pub mod moving_average;
pub mod strategy;
pub mod metrics;
pub mod portfolio;
pub mod daily_report;
pub mod config;
pub mod config_validation;
pub mod error;
