//! Immutable run configuration.
//!
//! Built once from a `ConfigPort` and handed to the CLI and presentation
//! code. The numerical modules never read it; they only receive prices and
//! parameters.

use crate::domain::error::QuantError;
use crate::domain::metrics::DEFAULT_RISK_FREE_RATE;
use crate::domain::portfolio::Weights;
use crate::domain::strategy::{DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW, Strategy};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_REPORT_OUTPUT: &str = "data/daily_report.txt";
pub const DEFAULT_LOOKBACK_DAYS: i64 = 180;

#[derive(Debug, Clone, PartialEq)]
pub struct DataConfig {
    pub directory: PathBuf,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SingleAssetConfig {
    pub ticker: String,
    pub strategy: Strategy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioConfig {
    pub tickers: Vec<String>,
    pub weights: Weights,
    /// Chart colour per ticker.
    pub colors: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub ticker: String,
    pub output: PathBuf,
    pub lookback_days: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub data: DataConfig,
    pub risk_free_rate: f64,
    pub single: Option<SingleAssetConfig>,
    pub portfolio: Option<PortfolioConfig>,
    pub report: Option<ReportConfig>,
}

impl DashboardConfig {
    pub fn from_port(config: &dyn ConfigPort) -> Result<Self, QuantError> {
        let data = DataConfig {
            directory: config
                .get_string("data", "directory")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            start_date: optional_date(config, "start_date")?.unwrap_or(NaiveDate::MIN),
            end_date: optional_date(config, "end_date")?.unwrap_or(NaiveDate::MAX),
        };

        Ok(DashboardConfig {
            data,
            risk_free_rate: config.get_double("metrics", "risk_free_rate", DEFAULT_RISK_FREE_RATE),
            single: build_single(config)?,
            portfolio: build_portfolio(config)?,
            report: build_report(config),
        })
    }
}

pub fn optional_date(config: &dyn ConfigPort, key: &str) -> Result<Option<NaiveDate>, QuantError> {
    config
        .get_string("data", key)
        .map(|s| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
                QuantError::ConfigInvalid {
                    section: "data".into(),
                    key: key.into(),
                    reason: "invalid date format (expected YYYY-MM-DD)".into(),
                }
            })
        })
        .transpose()
}

pub fn window(config: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, QuantError> {
    let value = config.get_int("single", key, default as i64);
    usize::try_from(value)
        .ok()
        .filter(|&w| w > 0)
        .ok_or_else(|| QuantError::ConfigInvalid {
            section: "single".into(),
            key: key.into(),
            reason: format!("{key} must be a positive integer"),
        })
}

fn build_single(config: &dyn ConfigPort) -> Result<Option<SingleAssetConfig>, QuantError> {
    let Some(ticker) = config.get_string("single", "ticker").map(|t| t.trim().to_uppercase())
    else {
        return Ok(None);
    };

    let name = config
        .get_string("single", "strategy")
        .unwrap_or_else(|| "buy-and-hold".to_string());
    let short_window = window(config, "short_window", DEFAULT_SHORT_WINDOW)?;
    let long_window = window(config, "long_window", DEFAULT_LONG_WINDOW)?;
    let strategy = Strategy::from_name(&name, short_window, long_window)
        .ok_or(QuantError::UnknownStrategy { name })?;

    Ok(Some(SingleAssetConfig { ticker, strategy }))
}

pub fn parse_weights(config: &dyn ConfigPort) -> Result<Vec<f64>, QuantError> {
    config
        .get_list("portfolio", "weights")
        .iter()
        .map(|w| {
            w.parse::<f64>().map_err(|_| QuantError::ConfigInvalid {
                section: "portfolio".into(),
                key: "weights".into(),
                reason: format!("'{w}' is not a number"),
            })
        })
        .collect()
}

pub fn parse_colors(config: &dyn ConfigPort) -> Result<BTreeMap<String, String>, QuantError> {
    config
        .get_list("portfolio", "colors")
        .iter()
        .map(|entry| match entry.split_once(':') {
            Some((ticker, color)) if !ticker.trim().is_empty() && !color.trim().is_empty() => {
                Ok((ticker.trim().to_uppercase(), color.trim().to_string()))
            }
            _ => Err(QuantError::ConfigInvalid {
                section: "portfolio".into(),
                key: "colors".into(),
                reason: format!("'{entry}' is not TICKER:colour"),
            }),
        })
        .collect()
}

fn build_portfolio(config: &dyn ConfigPort) -> Result<Option<PortfolioConfig>, QuantError> {
    let tickers: Vec<String> = config
        .get_list("portfolio", "tickers")
        .iter()
        .map(|t| t.to_uppercase())
        .collect();
    if tickers.is_empty() {
        return Ok(None);
    }

    let raw = parse_weights(config)?;
    let weights = if raw.is_empty() {
        Weights::equal(tickers.len())?
    } else if raw.len() != tickers.len() {
        return Err(QuantError::InvalidWeights {
            reason: format!("{} weights for {} tickers", raw.len(), tickers.len()),
        });
    } else {
        Weights::normalize(&raw)?
    };

    Ok(Some(PortfolioConfig {
        tickers,
        weights,
        colors: parse_colors(config)?,
    }))
}

fn build_report(config: &dyn ConfigPort) -> Option<ReportConfig> {
    let ticker = config
        .get_string("report", "ticker")
        .or_else(|| config.get_string("single", "ticker"))?
        .trim()
        .to_uppercase();

    Some(ReportConfig {
        ticker,
        output: config
            .get_string("report", "output")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_OUTPUT)),
        lookback_days: config.get_int("report", "lookback_days", DEFAULT_LOOKBACK_DAYS),
    })
}
