//! Single-asset strategy engine.
//!
//! Each strategy turns a price series into a cumulative value series based
//! at 100. Neither variant fails: short or empty inputs degrade to an empty
//! or single-point series.

use crate::domain::error::QuantError;
use crate::domain::moving_average::rolling_mean;
use crate::domain::price::{BASE_VALUE, PriceSeries, ValuePoint, ValueSeries};
use crate::domain::returns::{compound, filled_returns, normalized_growth};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_SHORT_WINDOW: usize = 50;
pub const DEFAULT_LONG_WINDOW: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    BuyAndHold,
    MovingAverageCrossover {
        short_window: usize,
        long_window: usize,
    },
}

/// Anything that can produce a cumulative value series from prices.
pub trait StrategyEngine {
    fn cumulative_value(&self, prices: &PriceSeries) -> ValueSeries;
}

impl StrategyEngine for Strategy {
    fn cumulative_value(&self, prices: &PriceSeries) -> ValueSeries {
        match *self {
            Strategy::BuyAndHold => buy_and_hold(prices),
            Strategy::MovingAverageCrossover {
                short_window,
                long_window,
            } => ma_crossover(prices, short_window, long_window),
        }
    }
}

impl Strategy {
    pub fn crossover(short_window: usize, long_window: usize) -> Self {
        Strategy::MovingAverageCrossover {
            short_window,
            long_window,
        }
    }

    /// Resolves a strategy identifier. Windows only apply to the crossover.
    ///
    /// Accepted identifiers (case-insensitive): `buy-and-hold`, `buy_and_hold`,
    /// `bh`, `ma-crossover`, `ma_crossover`, `ma crossover`, `sma`.
    pub fn from_name(name: &str, short_window: usize, long_window: usize) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "buy-and-hold" | "buy_and_hold" | "buy and hold" | "bh" => Some(Strategy::BuyAndHold),
            "ma-crossover" | "ma_crossover" | "ma crossover" | "sma" => {
                Some(Strategy::crossover(short_window, long_window))
            }
            _ => None,
        }
    }
}

impl FromStr for Strategy {
    type Err = QuantError;

    /// Parses an identifier using the default crossover windows.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::from_name(s, DEFAULT_SHORT_WINDOW, DEFAULT_LONG_WINDOW).ok_or_else(|| {
            QuantError::UnknownStrategy {
                name: s.to_string(),
            }
        })
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::BuyAndHold => write!(f, "Buy-and-Hold"),
            Strategy::MovingAverageCrossover {
                short_window,
                long_window,
            } => write!(f, "MA Crossover({},{})", short_window, long_window),
        }
    }
}

/// Runs the strategy named by `name`. An unrecognized name yields an empty
/// series; validating the identifier is the caller's job.
pub fn run_strategy(
    prices: &PriceSeries,
    name: &str,
    short_window: usize,
    long_window: usize,
) -> ValueSeries {
    match Strategy::from_name(name, short_window, long_window) {
        Some(strategy) => strategy.cumulative_value(prices),
        None => ValueSeries::empty(),
    }
}

pub fn buy_and_hold(prices: &PriceSeries) -> ValueSeries {
    let values = normalized_growth(&prices.prices());
    ValueSeries::new(
        prices
            .points()
            .iter()
            .zip(values)
            .map(|(p, value)| ValuePoint {
                date: p.date,
                value,
            })
            .collect(),
    )
}

/// Long (1.0) when the short MA is above the long MA, flat (0.0) otherwise.
/// `None` until both averages are defined.
pub fn crossover_signals(prices: &[f64], short_window: usize, long_window: usize) -> Vec<Option<f64>> {
    let short_ma = rolling_mean(prices, short_window);
    let long_ma = rolling_mean(prices, long_window);

    short_ma
        .iter()
        .zip(&long_ma)
        .map(|(s, l)| match (s, l) {
            (Some(s), Some(l)) => Some(if s > l { 1.0 } else { 0.0 }),
            _ => None,
        })
        .collect()
}

pub fn ma_crossover(prices: &PriceSeries, short_window: usize, long_window: usize) -> ValueSeries {
    let Some(last_date) = prices.last_date() else {
        return ValueSeries::empty();
    };
    if short_window == 0 || long_window == 0 || prices.len() < long_window {
        return ValueSeries::base_at(last_date);
    }

    let closes = prices.prices();
    let signals = crossover_signals(&closes, short_window, long_window);
    let market = filled_returns(&closes);

    // The position held over (t-1, t] is the one decided at t-1.
    let strategy_returns: Vec<f64> = market
        .iter()
        .enumerate()
        .map(|(t, r)| match t {
            0 => 0.0,
            _ => signals[t - 1].unwrap_or(0.0) * r,
        })
        .collect();

    let growth = compound(&strategy_returns, 1.0);
    let start = long_window - 1;
    let usable = |g: f64| g.is_finite() && g != 0.0;
    let anchor = Some(growth[start])
        .filter(|&g| usable(g))
        .or_else(|| growth.iter().copied().find(|&g| usable(g)))
        .unwrap_or(1.0);

    let points = prices
        .points()
        .iter()
        .zip(&growth)
        .map(|(p, g)| ValuePoint {
            date: p.date,
            value: g / anchor * BASE_VALUE,
        })
        .collect();

    ValueSeries {
        points,
        warmup: start,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::PricePoint;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_series(prices: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceSeries::new(
            "TEST",
            prices
                .iter()
                .enumerate()
                .map(|(i, &price)| PricePoint {
                    date: start + chrono::Duration::days(i as i64),
                    price,
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn buy_and_hold_starts_at_base() {
        let vs = buy_and_hold(&make_series(&[100.0, 101.0, 99.0, 105.0]));
        assert_eq!(vs.first(), Some(100.0));
        assert_relative_eq!(vs.last().unwrap(), 105.0, epsilon = 1e-9);
        assert_eq!(vs.warmup, 0);
    }

    #[test]
    fn buy_and_hold_tracks_price_ratio() {
        let prices = [100.0, 101.0, 99.0, 105.0, 100.0, 110.0, 120.0, 115.0, 130.0, 140.0];
        let vs = buy_and_hold(&make_series(&prices));
        assert_eq!(vs.len(), 10);
        assert_eq!(vs.first(), Some(100.0));
        assert_relative_eq!(vs.last().unwrap(), 140.0, epsilon = 1e-9);
    }

    #[test]
    fn buy_and_hold_empty() {
        assert!(buy_and_hold(&PriceSeries::empty("X")).is_empty());
    }

    #[test]
    fn crossover_short_history_is_single_base_point() {
        let series = make_series(&[5.0, 500.0, 0.5]);
        let vs = ma_crossover(&series, 2, 10);
        assert_eq!(vs.len(), 1);
        assert_eq!(vs.first(), Some(100.0));
        assert_eq!(vs.points[0].date, series.last_date().unwrap());
    }

    #[test]
    fn crossover_empty_input() {
        assert!(ma_crossover(&PriceSeries::empty("X"), 2, 3).is_empty());
    }

    #[test]
    fn crossover_uses_previous_signal() {
        // SMA(1) = price, SMA(2) = [-, 10, 11, 9]; signal turns long on day 2
        // and flat on day 3. Day 2's +20% must not be captured.
        let vs = ma_crossover(&make_series(&[10.0, 10.0, 12.0, 6.0]), 1, 2);
        let values = vs.values();
        assert_eq!(values.len(), 4);
        assert_relative_eq!(values[1], 100.0, epsilon = 1e-12);
        assert_relative_eq!(values[2], 100.0, epsilon = 1e-12);
        assert_relative_eq!(values[3], 50.0, epsilon = 1e-12);
        assert_eq!(vs.warmup, 1);
    }

    #[test]
    fn crossover_normalized_at_first_long_ma() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let vs = ma_crossover(&make_series(&prices), 3, 10);
        assert_eq!(vs.len(), 30);
        assert_eq!(vs.points[9].value, 100.0);
        assert!(vs.points[..9].iter().all(|p| p.value == 100.0));
        // rising prices keep the short MA above the long MA
        assert!(vs.last().unwrap() > 100.0);
    }

    #[test]
    fn crossover_signals_warmup() {
        let signals = crossover_signals(&[1.0, 2.0, 3.0, 2.0, 1.0], 2, 3);
        assert_eq!(signals[0], None);
        assert_eq!(signals[1], None);
        assert_eq!(signals[2], Some(1.0));
        assert_eq!(signals[4], Some(0.0));
    }

    #[test]
    fn crossover_zero_window_degrades() {
        let vs = ma_crossover(&make_series(&[1.0, 2.0, 3.0]), 0, 2);
        assert_eq!(vs.values(), vec![100.0]);
    }

    #[test]
    fn from_name_variants() {
        assert_eq!(Strategy::from_name("Buy-and-Hold", 1, 2), Some(Strategy::BuyAndHold));
        assert_eq!(
            Strategy::from_name("MA Crossover", 20, 50),
            Some(Strategy::crossover(20, 50))
        );
        assert_eq!(Strategy::from_name("momentum", 1, 2), None);
    }

    #[test]
    fn from_str_uses_defaults() {
        let s: Strategy = "ma-crossover".parse().unwrap();
        assert_eq!(s, Strategy::crossover(DEFAULT_SHORT_WINDOW, DEFAULT_LONG_WINDOW));
        assert!(matches!(
            "nope".parse::<Strategy>(),
            Err(QuantError::UnknownStrategy { .. })
        ));
    }

    #[test]
    fn run_strategy_unknown_is_empty() {
        let vs = run_strategy(&make_series(&[1.0, 2.0]), "pairs", 1, 2);
        assert!(vs.is_empty());
    }

    #[test]
    fn display() {
        assert_eq!(Strategy::BuyAndHold.to_string(), "Buy-and-Hold");
        assert_eq!(Strategy::crossover(20, 50).to_string(), "MA Crossover(20,50)");
    }
}
