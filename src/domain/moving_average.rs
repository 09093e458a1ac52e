//! Trailing simple moving average.
//!
//! O(n) sliding window sum.
//! SMA(n)[i] = (P[i-n+1] + ... + P[i]) / n
//! Warmup: the first (n-1) values are `None`.

pub fn rolling_mean(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; prices.len()];
    }

    let mut values = Vec::with_capacity(prices.len());
    let mut window_sum = 0.0_f64;

    for (i, &price) in prices.iter().enumerate() {
        window_sum += price;
        if i >= period {
            window_sum -= prices[i - period];
        }

        let valid = i + 1 >= period;
        values.push(valid.then(|| window_sum / period as f64));
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn warmup_is_none() {
        let ma = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 3);
        assert!(ma[0].is_none());
        assert!(ma[1].is_none());
        assert!(ma[2].is_some());
        assert!(ma[3].is_some());
    }

    #[test]
    fn known_values() {
        let ma = rolling_mean(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);
        assert_relative_eq!(ma[2].unwrap(), 20.0, epsilon = 1e-12);
        assert_relative_eq!(ma[3].unwrap(), 30.0, epsilon = 1e-12);
        assert_relative_eq!(ma[4].unwrap(), 40.0, epsilon = 1e-12);
    }

    #[test]
    fn period_one_is_identity() {
        let prices = [5.0, 7.0, 6.0];
        let ma = rolling_mean(&prices, 1);
        for (m, p) in ma.iter().zip(prices) {
            assert_relative_eq!(m.unwrap(), p);
        }
    }

    #[test]
    fn period_longer_than_input() {
        let ma = rolling_mean(&[1.0, 2.0], 5);
        assert!(ma.iter().all(Option::is_none));
    }

    #[test]
    fn zero_period() {
        let ma = rolling_mean(&[1.0, 2.0], 0);
        assert_eq!(ma, vec![None, None]);
    }

    #[test]
    fn empty_input() {
        assert!(rolling_mean(&[], 3).is_empty());
    }
}
