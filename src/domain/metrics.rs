//! Risk and performance metrics of a cumulative value series.
//!
//! Every field is `None` when the input is too short to produce a real
//! number. Percentage-valued fields are in percentage units (x100) and
//! unrounded; rounding belongs to whoever renders them.

use crate::domain::price::ValueSeries;
use crate::domain::returns::simple_returns;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.04;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Metrics {
    /// mean(daily return) * 252, in percent.
    pub annualized_return: Option<f64>,
    /// sample stdev(daily return) * sqrt(252), in percent.
    pub annualized_volatility: Option<f64>,
    pub sharpe_ratio: Option<f64>,
    /// Most negative peak-to-trough move, in percent (<= 0).
    pub max_drawdown: Option<f64>,
}

impl Metrics {
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Metrics of a cumulative value series; needs at least two points.
    pub fn compute(series: &ValueSeries, risk_free_rate: f64) -> Self {
        if series.len() < 2 {
            return Self::unavailable();
        }
        Self::from_returns(&simple_returns(&series.values()), risk_free_rate)
    }

    pub fn from_returns(daily_returns: &[f64], risk_free_rate: f64) -> Self {
        let Some(avg) = mean(daily_returns) else {
            return Self::unavailable();
        };

        let annual_return = avg * TRADING_DAYS_PER_YEAR;
        let annual_volatility =
            sample_std(daily_returns).map(|sd| sd * TRADING_DAYS_PER_YEAR.sqrt());
        let sharpe_ratio = annual_volatility.map(|vol| {
            if vol == 0.0 {
                0.0
            } else {
                (annual_return - risk_free_rate) / vol
            }
        });

        Metrics {
            annualized_return: Some(annual_return * 100.0),
            annualized_volatility: annual_volatility.map(|v| v * 100.0),
            sharpe_ratio,
            max_drawdown: max_drawdown(daily_returns).map(|dd| dd * 100.0),
        }
    }

    pub fn is_available(&self) -> bool {
        self.annualized_return.is_some()
    }
}

/// Drawdown of the value path rebuilt from `daily_returns` on a base of 1.0,
/// as a fraction.
///
/// The base itself counts as the first peak, so a loss on the first return
/// is a drawdown: `[-0.1, 0.05]` gives -0.1. A running maximum taken only
/// over the compounded values (excluding the base) would report 0.0 there.
pub fn max_drawdown(daily_returns: &[f64]) -> Option<f64> {
    if daily_returns.is_empty() {
        return None;
    }

    let mut value = 1.0_f64;
    let mut peak = 1.0_f64;
    let mut worst = 0.0_f64;

    for r in daily_returns {
        value *= 1.0 + r;
        if value > peak {
            peak = value;
        }
        let dd = value / peak - 1.0;
        if dd < worst {
            worst = dd;
        }
    }

    Some(worst)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let avg = mean(values)?;
    let variance = values
        .iter()
        .map(|v| {
            let diff = v - avg;
            diff * diff
        })
        .sum::<f64>()
        / (values.len() - 1) as f64;
    Some(variance.sqrt())
}
