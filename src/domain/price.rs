//! Price and value series representations.
//!
//! `PriceBar` is what the data boundary delivers; the computational core
//! works on `PriceSeries` (one asset, closing prices), `PriceTable` (several
//! assets aligned on a shared date axis) and produces `ValueSeries`.

use crate::domain::error::QuantError;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

/// Base notional of every cumulative value series.
pub const BASE_VALUE: f64 = 100.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub code: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceBar {
    /// close / open - 1, the intraday move of the bar.
    pub fn intraday_return(&self) -> f64 {
        self.close / self.open - 1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Closing prices of one asset, strictly increasing in date.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub code: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series, sorting by date. Duplicate dates and prices that are
    /// not finite and positive are rejected.
    pub fn new(code: impl Into<String>, mut points: Vec<PricePoint>) -> Result<Self, QuantError> {
        let code = code.into();
        if let Some(p) = points.iter().find(|p| !(p.price.is_finite() && p.price > 0.0)) {
            return Err(QuantError::Data {
                reason: format!(
                    "price {} on {} in series {} is not positive",
                    p.price, p.date, code
                ),
            });
        }
        points.sort_by_key(|p| p.date);
        if let Some(w) = points.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(QuantError::Data {
                reason: format!("duplicate date {} in series {}", w[0].date, code),
            });
        }
        Ok(Self { code, points })
    }

    pub fn from_bars(code: impl Into<String>, bars: &[PriceBar]) -> Result<Self, QuantError> {
        let points = bars
            .iter()
            .map(|b| PricePoint {
                date: b.date,
                price: b.close,
            })
            .collect();
        Self::new(code, points)
    }

    pub fn empty(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            points: Vec::new(),
        }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}

/// Several assets outer-joined on the union of their dates.
///
/// `rows[i][j]` is the price of `codes[j]` on `dates[i]`, or `None` when that
/// asset did not trade that day. Every row has at least one price.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    pub codes: Vec<String>,
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<Vec<Option<f64>>>,
}

impl PriceTable {
    pub fn from_series(series: &[PriceSeries]) -> Self {
        let dates: Vec<NaiveDate> = series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.date))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let lookups: Vec<HashMap<NaiveDate, f64>> = series
            .iter()
            .map(|s| s.points.iter().map(|p| (p.date, p.price)).collect())
            .collect();

        let rows = dates
            .iter()
            .map(|d| lookups.iter().map(|l| l.get(d).copied()).collect())
            .collect();

        Self {
            codes: series.iter().map(|s| s.code.clone()).collect(),
            dates,
            rows,
        }
    }

    pub fn column_count(&self) -> usize {
        self.codes.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty() || self.rows.is_empty()
    }

    /// Date of the first row where every asset has a price.
    pub fn first_complete_date(&self) -> Option<NaiveDate> {
        self.dates
            .iter()
            .zip(&self.rows)
            .find(|(_, row)| row.iter().all(Option::is_some))
            .map(|(date, _)| *date)
    }

    /// Rows where every asset has a price, in date order.
    pub fn complete_rows(&self) -> (Vec<NaiveDate>, Vec<Vec<f64>>) {
        self.dates
            .iter()
            .zip(&self.rows)
            .filter_map(|(date, row)| {
                row.iter()
                    .copied()
                    .collect::<Option<Vec<f64>>>()
                    .map(|prices| (*date, prices))
            })
            .unzip()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Cumulative value of a strategy or portfolio, based at 100 notional units.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueSeries {
    pub points: Vec<ValuePoint>,
    /// Leading points that precede the first tradeable signal.
    pub warmup: usize,
}

impl ValueSeries {
    pub fn new(points: Vec<ValuePoint>) -> Self {
        Self { points, warmup: 0 }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// One point valued at the base, used when there is no tradeable history.
    pub fn base_at(date: NaiveDate) -> Self {
        Self::new(vec![ValuePoint {
            date,
            value: BASE_VALUE,
        }])
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<f64> {
        self.points.first().map(|p| p.value)
    }

    pub fn last(&self) -> Option<f64> {
        self.points.last().map(|p| p.value)
    }

    /// Points from the first tradeable signal onward.
    pub fn active(&self) -> &[ValuePoint] {
        &self.points[self.warmup.min(self.points.len())..]
    }
}
