//! Return transform: prices to period-over-period returns and back.
//!
//! r[i] = P[i] / P[i-1] - 1

use crate::domain::price::BASE_VALUE;

/// Standalone return series, one element shorter than `prices`.
/// The undefined leading return is dropped.
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// Returns aligned 1:1 with `prices`, the first treated as no change.
pub fn filled_returns(prices: &[f64]) -> Vec<f64> {
    if prices.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(prices.len());
    out.push(0.0);
    out.extend(simple_returns(prices));
    out
}

/// Running product of (1 + r), starting from `base`.
pub fn compound(returns: &[f64], base: f64) -> Vec<f64> {
    returns
        .iter()
        .scan(base, |acc, r| {
            *acc *= 1.0 + r;
            Some(*acc)
        })
        .collect()
}

/// Cumulative value of holding `prices`, first element exactly `BASE_VALUE`.
pub fn normalized_growth(prices: &[f64]) -> Vec<f64> {
    let growth = compound(&filled_returns(prices), 1.0);
    match growth.first().copied() {
        Some(first) => growth.iter().map(|g| g / first * BASE_VALUE).collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn simple_returns_basic() {
        let r = simple_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(r.len(), 2);
        assert_relative_eq!(r[0], 0.10, epsilon = 1e-12);
        assert_relative_eq!(r[1], -0.10, epsilon = 1e-12);
    }

    #[test]
    fn empty_and_single_inputs() {
        assert!(simple_returns(&[]).is_empty());
        assert!(simple_returns(&[100.0]).is_empty());
        assert!(filled_returns(&[]).is_empty());
        assert_eq!(filled_returns(&[100.0]), vec![0.0]);
        assert!(normalized_growth(&[]).is_empty());
    }

    #[test]
    fn filled_returns_align_with_prices() {
        let r = filled_returns(&[50.0, 55.0, 44.0]);
        assert_eq!(r.len(), 3);
        assert_eq!(r[0], 0.0);
        assert_relative_eq!(r[2], -0.2, epsilon = 1e-12);
    }

    #[test]
    fn compound_from_base() {
        let v = compound(&[0.1, -0.5], 2.0);
        assert_relative_eq!(v[0], 2.2, epsilon = 1e-12);
        assert_relative_eq!(v[1], 1.1, epsilon = 1e-12);
    }

    #[test]
    fn normalized_growth_tracks_price_ratio() {
        let v = normalized_growth(&[40.0, 44.0, 20.0]);
        assert_eq!(v[0], 100.0);
        assert_relative_eq!(v[1], 110.0, epsilon = 1e-9);
        assert_relative_eq!(v[2], 50.0, epsilon = 1e-9);
    }

    proptest! {
        #[test]
        fn round_trip_reproduces_prices(prices in prop::collection::vec(1.0f64..1000.0, 1..60)) {
            let rebuilt = compound(&filled_returns(&prices), prices[0]);
            prop_assert_eq!(rebuilt.len(), prices.len());
            for (a, b) in rebuilt.iter().zip(&prices) {
                prop_assert!((a - b).abs() <= 1e-9 * b.abs());
            }
        }
    }
}
