//! Configuration validation.
//!
//! Validates config fields before any prices are loaded, so a bad value
//! fails fast with the offending section and key.

use crate::domain::config::{optional_date, parse_colors, parse_weights, window};
use crate::domain::error::QuantError;
use crate::domain::strategy::{DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW, Strategy};
use crate::ports::config_port::ConfigPort;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), QuantError> {
    validate_risk_free_rate(config)?;
    validate_dates(config)?;
    validate_single(config)?;
    validate_portfolio(config)?;
    validate_report(config)?;
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), QuantError> {
    let value = config.get_double("metrics", "risk_free_rate", 0.0);
    if !(0.0..1.0).contains(&value) {
        return Err(QuantError::ConfigInvalid {
            section: "metrics".to_string(),
            key: "risk_free_rate".to_string(),
            reason: "risk_free_rate must be between 0 and 1".to_string(),
        });
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), QuantError> {
    let start = optional_date(config, "start_date")?;
    let end = optional_date(config, "end_date")?;

    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(QuantError::ConfigInvalid {
                section: "data".to_string(),
                key: "start_date".to_string(),
                reason: "start_date must be before end_date".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_single(config: &dyn ConfigPort) -> Result<(), QuantError> {
    let Some(name) = config.get_string("single", "strategy") else {
        return Ok(());
    };
    let short_window = window(config, "short_window", DEFAULT_SHORT_WINDOW)?;
    let long_window = window(config, "long_window", DEFAULT_LONG_WINDOW)?;

    if Strategy::from_name(&name, short_window, long_window).is_none() {
        return Err(QuantError::ConfigInvalid {
            section: "single".to_string(),
            key: "strategy".to_string(),
            reason: format!("unknown strategy '{name}' (expected buy-and-hold or ma-crossover)"),
        });
    }

    match config.get_string("single", "ticker") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(QuantError::ConfigMissing {
            section: "single".to_string(),
            key: "ticker".to_string(),
        }),
    }
}

fn validate_portfolio(config: &dyn ConfigPort) -> Result<(), QuantError> {
    let tickers = config.get_list("portfolio", "tickers");
    let weights = parse_weights(config)?;
    parse_colors(config)?;

    if tickers.is_empty() {
        if !weights.is_empty() {
            return Err(QuantError::ConfigMissing {
                section: "portfolio".to_string(),
                key: "tickers".to_string(),
            });
        }
        return Ok(());
    }

    if weights.is_empty() {
        return Ok(());
    }
    if weights.len() != tickers.len() {
        return Err(QuantError::ConfigInvalid {
            section: "portfolio".to_string(),
            key: "weights".to_string(),
            reason: format!("{} weights for {} tickers", weights.len(), tickers.len()),
        });
    }
    if weights.iter().any(|w| *w < 0.0) {
        return Err(QuantError::ConfigInvalid {
            section: "portfolio".to_string(),
            key: "weights".to_string(),
            reason: "weights must be non-negative".to_string(),
        });
    }
    if weights.iter().sum::<f64>() <= 0.0 {
        return Err(QuantError::ConfigInvalid {
            section: "portfolio".to_string(),
            key: "weights".to_string(),
            reason: "at least one weight must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_report(config: &dyn ConfigPort) -> Result<(), QuantError> {
    let value = config.get_int("report", "lookback_days", 1);
    if value < 1 {
        return Err(QuantError::ConfigInvalid {
            section: "report".to_string(),
            key: "lookback_days".to_string(),
            reason: "lookback_days must be at least 1".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn valid_config_passes() {
        let config = make_config(
            r#"
[data]
directory = data
start_date = 2024-01-01
end_date = 2024-12-31

[metrics]
risk_free_rate = 0.04

[single]
ticker = BTC-USD
strategy = ma-crossover
short_window = 20
long_window = 50

[portfolio]
tickers = GOOGL,AMZN,JNJ
weights = 40,30,30

[report]
lookback_days = 180
"#,
        );
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn risk_free_rate_out_of_range_fails() {
        let config = make_config("[metrics]\nrisk_free_rate = 1.5\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, QuantError::ConfigInvalid { key, .. } if key == "risk_free_rate"));
    }

    #[test]
    fn risk_free_rate_negative_fails() {
        let config = make_config("[metrics]\nrisk_free_rate = -0.01\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, QuantError::ConfigInvalid { key, .. } if key == "risk_free_rate"));
    }

    #[test]
    fn invalid_date_format_fails() {
        let config = make_config("[data]\nstart_date = 2024/01/01\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, QuantError::ConfigInvalid { key, .. } if key == "start_date"));
    }

    #[test]
    fn start_after_end_fails() {
        let config = make_config("[data]\nstart_date = 2024-12-31\nend_date = 2024-01-01\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, QuantError::ConfigInvalid { key, .. } if key == "start_date"));
    }

    #[test]
    fn unknown_strategy_fails() {
        let config = make_config("[single]\nticker = X\nstrategy = grid\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, QuantError::ConfigInvalid { key, .. } if key == "strategy"));
    }

    #[test]
    fn zero_window_fails() {
        let config = make_config("[single]\nticker = X\nstrategy = ma-crossover\nlong_window = 0\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, QuantError::ConfigInvalid { key, .. } if key == "long_window"));
    }

    #[test]
    fn strategy_without_ticker_fails() {
        let config = make_config("[single]\nstrategy = buy-and-hold\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, QuantError::ConfigMissing { key, .. } if key == "ticker"));
    }

    #[test]
    fn weight_count_mismatch_fails() {
        let config = make_config("[portfolio]\ntickers = A,B,C\nweights = 1,1\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, QuantError::ConfigInvalid { key, .. } if key == "weights"));
    }

    #[test]
    fn negative_weight_fails() {
        let config = make_config("[portfolio]\ntickers = A,B\nweights = 1,-1\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, QuantError::ConfigInvalid { key, .. } if key == "weights"));
    }

    #[test]
    fn all_zero_weights_fail() {
        let config = make_config("[portfolio]\ntickers = A,B\nweights = 0,0\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, QuantError::ConfigInvalid { key, .. } if key == "weights"));
    }

    #[test]
    fn non_numeric_weight_fails() {
        let config = make_config("[portfolio]\ntickers = A,B\nweights = 1,abc\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, QuantError::ConfigInvalid { key, .. } if key == "weights"));
    }

    #[test]
    fn weights_without_tickers_fail() {
        let config = make_config("[portfolio]\nweights = 1,1\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, QuantError::ConfigMissing { key, .. } if key == "tickers"));
    }

    #[test]
    fn lookback_days_zero_fails() {
        let config = make_config("[report]\nlookback_days = 0\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, QuantError::ConfigInvalid { key, .. } if key == "lookback_days"));
    }
}
