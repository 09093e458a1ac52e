#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use quantdash::domain::error::QuantError;
pub use quantdash::domain::price::{PriceBar, PricePoint, PriceSeries};
use quantdash::ports::price_port::PricePort;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub struct MockPricePort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockPricePort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, code: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(code.to_string(), bars);
        self
    }

    pub fn with_closes(self, code: &str, start: &str, closes: &[f64]) -> Self {
        let bars = make_bars(code, start, closes);
        self.with_bars(code, bars)
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }
}

impl PricePort for MockPricePort {
    fn fetch_bars(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, QuantError> {
        if let Some(reason) = self.errors.get(code) {
            return Err(QuantError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(code)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, QuantError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn make_bar(code: &str, date_str: &str, open: f64, close: f64) -> PriceBar {
    PriceBar {
        code: code.to_string(),
        date: date(date_str),
        open,
        high: open.max(close),
        low: open.min(close),
        close,
    }
}

/// One bar per consecutive calendar day starting at `start`, opening at the
/// previous close.
pub fn make_bars(code: &str, start: &str, closes: &[f64]) -> Vec<PriceBar> {
    let first = date(start);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            PriceBar {
                code: code.to_string(),
                date: first + Duration::days(i as i64),
                open,
                high: open.max(close),
                low: open.min(close),
                close,
            }
        })
        .collect()
}

pub fn make_series(code: &str, start: &str, closes: &[f64]) -> PriceSeries {
    PriceSeries::from_bars(code, &make_bars(code, start, closes)).unwrap()
}

pub fn series_on(code: &str, points: &[(&str, f64)]) -> PriceSeries {
    PriceSeries::new(
        code,
        points
            .iter()
            .map(|&(d, price)| PricePoint {
                date: date(d),
                price,
            })
            .collect(),
    )
    .unwrap()
}

/// Writes `<dir>/<code>.csv` in the on-disk price format.
pub fn write_price_csv(dir: &Path, code: &str, start: &str, closes: &[f64]) {
    let mut content = String::from("date,open,high,low,close,volume\n");
    for bar in make_bars(code, start, closes) {
        content.push_str(&format!(
            "{},{},{},{},{},1000\n",
            bar.date, bar.open, bar.high, bar.low, bar.close
        ));
    }
    fs::write(dir.join(format!("{code}.csv")), content).unwrap();
}

/// Deterministic wavy price path.
pub fn wave(len: usize, base: f64, amplitude: f64, period: f64) -> Vec<f64> {
    (0..len)
        .map(|i| base + amplitude * (i as f64 * std::f64::consts::TAU / period).sin() + i as f64 * 0.05)
        .collect()
}
