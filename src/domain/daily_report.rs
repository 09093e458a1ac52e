//! Daily single-asset risk summary.
//!
//! Combines the last trading day's intraday move with risk figures over the
//! supplied lookback window.

use crate::domain::metrics::{TRADING_DAYS_PER_YEAR, max_drawdown, sample_std};
use crate::domain::price::PriceBar;
use crate::domain::returns::simple_returns;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct DailyReport {
    pub code: String,
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    /// close / open - 1 of the last bar, in percent.
    pub daily_return: f64,
    /// In percent; `None` with fewer than three bars.
    pub annualized_volatility: Option<f64>,
    /// In percent; `None` with fewer than two bars.
    pub max_drawdown: Option<f64>,
    pub bars: usize,
}

impl DailyReport {
    /// `bars` must be sorted by date. Returns `None` for an empty window.
    pub fn compute(code: &str, bars: &[PriceBar]) -> Option<Self> {
        let last = bars.last()?;
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let returns = simple_returns(&closes);

        Some(DailyReport {
            code: code.to_string(),
            date: last.date,
            open: last.open,
            close: last.close,
            daily_return: last.intraday_return() * 100.0,
            annualized_volatility: sample_std(&returns)
                .map(|sd| sd * TRADING_DAYS_PER_YEAR.sqrt() * 100.0),
            max_drawdown: max_drawdown(&returns).map(|dd| dd * 100.0),
            bars: bars.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_bar(day: u32, open: f64, close: f64) -> PriceBar {
        PriceBar {
            code: "NVDA".into(),
            date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            open,
            high: open.max(close),
            low: open.min(close),
            close,
        }
    }

    #[test]
    fn empty_window_has_no_report() {
        assert!(DailyReport::compute("NVDA", &[]).is_none());
    }

    #[test]
    fn single_bar_report() {
        let report = DailyReport::compute("NVDA", &[make_bar(3, 100.0, 102.0)]).unwrap();
        assert_eq!(report.date, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        assert_relative_eq!(report.daily_return, 2.0, epsilon = 1e-9);
        assert!(report.annualized_volatility.is_none());
        assert!(report.max_drawdown.is_none());
        assert_eq!(report.bars, 1);
    }

    #[test]
    fn report_over_window() {
        let bars = vec![
            make_bar(3, 99.0, 100.0),
            make_bar(4, 100.0, 110.0),
            make_bar(5, 110.0, 88.0),
            make_bar(6, 90.0, 99.0),
        ];
        let report = DailyReport::compute("NVDA", &bars).unwrap();

        assert_eq!(report.open, 90.0);
        assert_eq!(report.close, 99.0);
        assert_relative_eq!(report.daily_return, 10.0, epsilon = 1e-9);
        assert_relative_eq!(report.max_drawdown.unwrap(), -20.0, epsilon = 1e-9);

        let returns = [0.1, -0.2, 0.125];
        let avg = returns.iter().sum::<f64>() / 3.0;
        let var = returns.iter().map(|r| (r - avg).powi(2)).sum::<f64>() / 2.0;
        assert_relative_eq!(
            report.annualized_volatility.unwrap(),
            var.sqrt() * 252f64.sqrt() * 100.0,
            epsilon = 1e-9
        );
    }
}
