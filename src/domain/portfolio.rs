//! Multi-asset portfolio aggregation.
//!
//! Asset returns are taken over rows where every asset has a price, combined
//! with a fixed weight vector into portfolio daily returns, and compounded
//! into a value series based at 100. The correlation matrix is computed over
//! the same aligned window.

use crate::domain::error::QuantError;
use crate::domain::metrics::{Metrics, mean};
use crate::domain::price::{BASE_VALUE, PriceTable, ValuePoint, ValueSeries};
use crate::domain::returns::compound;
use chrono::NaiveDate;
use tracing::debug;

/// Allowed distance of a weight vector's sum from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Non-negative weights summing to 1.0, one per asset column.
#[derive(Debug, Clone, PartialEq)]
pub struct Weights(Vec<f64>);

impl Weights {
    /// Accepts an already normalized vector; anything else is rejected.
    pub fn new(values: Vec<f64>) -> Result<Self, QuantError> {
        check_components(&values)?;
        let total: f64 = values.iter().sum();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(QuantError::InvalidWeights {
                reason: format!("weights sum to {total}, expected 1"),
            });
        }
        Ok(Self(values))
    }

    /// Scales raw non-negative inputs (e.g. slider positions) to sum to 1.0.
    pub fn normalize(raw: &[f64]) -> Result<Self, QuantError> {
        check_components(raw)?;
        let total: f64 = raw.iter().sum();
        if total <= 0.0 {
            return Err(QuantError::InvalidWeights {
                reason: "weights sum to 0".into(),
            });
        }
        Ok(Self(raw.iter().map(|w| w / total).collect()))
    }

    pub fn equal(count: usize) -> Result<Self, QuantError> {
        Self::normalize(&vec![1.0; count])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn check_components(values: &[f64]) -> Result<(), QuantError> {
    if values.is_empty() {
        return Err(QuantError::InvalidWeights {
            reason: "no weights given".into(),
        });
    }
    if let Some(w) = values.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(QuantError::InvalidWeights {
            reason: format!("weight {w} is not a non-negative number"),
        });
    }
    Ok(())
}

/// Pairwise Pearson correlation of asset daily returns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CorrelationMatrix {
    pub codes: Vec<String>,
    /// `values[i][j]`; `None` where a correlation is undefined.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.codes.iter().position(|c| c == a)?;
        let j = self.codes.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

/// Returns over the row-aligned window of a price table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlignedReturns {
    /// Date of each return row.
    pub dates: Vec<NaiveDate>,
    /// `rows[t][j]`: return of asset j over (t-1, t].
    pub rows: Vec<Vec<f64>>,
}

impl AlignedReturns {
    pub fn from_table(table: &PriceTable) -> Self {
        let (dates, prices) = table.complete_rows();
        let rows = prices
            .windows(2)
            .map(|w| w[1].iter().zip(&w[0]).map(|(now, prev)| now / prev - 1.0).collect())
            .collect();
        Self {
            dates: dates.into_iter().skip(1).collect(),
            rows,
        }
    }

    pub fn column(&self, j: usize) -> Vec<f64> {
        self.rows.iter().map(|row| row[j]).collect()
    }

    /// Weighted sum of asset returns for each row.
    pub fn weighted(&self, weights: &Weights) -> Vec<f64> {
        self.rows
            .iter()
            .map(|row| row.iter().zip(weights.as_slice()).map(|(r, w)| r * w).sum())
            .collect()
    }
}

fn check_shape(table: &PriceTable, weights: &Weights) -> Result<(), QuantError> {
    if weights.len() != table.column_count() {
        return Err(QuantError::InvalidWeights {
            reason: format!(
                "{} weights for {} assets",
                weights.len(),
                table.column_count()
            ),
        });
    }
    Ok(())
}

/// Portfolio daily returns, paired with their dates.
pub fn portfolio_returns(
    table: &PriceTable,
    weights: &Weights,
) -> Result<Vec<(NaiveDate, f64)>, QuantError> {
    if table.is_empty() {
        return Ok(Vec::new());
    }
    check_shape(table, weights)?;
    let aligned = AlignedReturns::from_table(table);
    Ok(aligned.dates.iter().copied().zip(aligned.weighted(weights)).collect())
}

/// Cumulative portfolio value.
///
/// The series is 100.0 on the first date where every asset has a price, the
/// same anchoring as buy-and-hold, and then compounds each portfolio return.
/// It has one point more than the return series, so the first return moves
/// the value like every other.
pub fn portfolio_value(table: &PriceTable, weights: &Weights) -> Result<ValueSeries, QuantError> {
    let returns = portfolio_returns(table, weights)?;
    let Some(base_date) = table.first_complete_date() else {
        return Ok(ValueSeries::empty());
    };
    debug!(
        assets = table.column_count(),
        rows = table.row_count(),
        aligned = returns.len(),
        "aligned portfolio returns"
    );

    let growth = compound(&returns.iter().map(|&(_, r)| r).collect::<Vec<_>>(), BASE_VALUE);
    let mut points = Vec::with_capacity(growth.len() + 1);
    points.push(ValuePoint {
        date: base_date,
        value: BASE_VALUE,
    });
    points.extend(
        returns
            .iter()
            .zip(growth)
            .map(|(&(date, _), value)| ValuePoint { date, value }),
    );
    Ok(ValueSeries::new(points))
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PortfolioMetrics {
    pub metrics: Metrics,
    pub correlation: CorrelationMatrix,
}

pub fn portfolio_metrics(
    table: &PriceTable,
    weights: &Weights,
    risk_free_rate: f64,
) -> Result<PortfolioMetrics, QuantError> {
    if table.is_empty() {
        return Ok(PortfolioMetrics::default());
    }
    check_shape(table, weights)?;

    let aligned = AlignedReturns::from_table(table);
    Ok(PortfolioMetrics {
        metrics: Metrics::from_returns(&aligned.weighted(weights), risk_free_rate),
        correlation: correlation_matrix(&table.codes, &aligned),
    })
}

pub fn correlation_matrix(codes: &[String], aligned: &AlignedReturns) -> CorrelationMatrix {
    let columns: Vec<Vec<f64>> = (0..codes.len()).map(|j| aligned.column(j)).collect();
    let values = (0..codes.len())
        .map(|i| {
            (0..codes.len())
                .map(|j| {
                    if i == j {
                        Some(1.0)
                    } else {
                        pearson(&columns[i], &columns[j])
                    }
                })
                .collect()
        })
        .collect();

    CorrelationMatrix {
        codes: codes.to_vec(),
        values,
    }
}

/// Pearson correlation; `None` with fewer than two pairs or zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mx = mean(xs)?;
    let my = mean(ys)?;

    let mut cov = 0.0_f64;
    let mut vx = 0.0_f64;
    let mut vy = 0.0_f64;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        cov += dx * dy;
        vx += dx * dx;
        vy += dy * dy;
    }

    if vx == 0.0 || vy == 0.0 {
        return None;
    }
    Some((cov / (vx * vy).sqrt()).clamp(-1.0, 1.0))
}
