//! CSV file price adapter.
//!
//! One file per ticker, `<base>/<CODE>.csv`. Columns are located by header
//! name (case-insensitive), so both `date,open,high,low,close` and exports
//! such as `Date,Open,High,Low,Close,Adj Close,Volume` load. Other columns
//! are ignored. Rows with an empty or `null` price are skipped.

use crate::domain::error::QuantError;
use crate::domain::price::PriceBar;
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", code))
    }
}

/// Positions of the columns a bar is built from.
struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self, QuantError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| QuantError::Data {
                    reason: format!("missing {} column", name),
                })
        };
        Ok(Self {
            date: find("date")?,
            open: find("open")?,
            high: find("high")?,
            low: find("low")?,
            close: find("close")?,
        })
    }
}

fn field<'r>(record: &'r csv::StringRecord, index: usize, name: &str) -> Result<&'r str, QuantError> {
    record
        .get(index)
        .map(str::trim)
        .ok_or_else(|| QuantError::Data {
            reason: format!("row without {} value", name),
        })
}

/// Markers for a value the provider did not have.
const MISSING: [&str; 4] = ["", "null", "nan", "n/a"];

/// `Ok(None)` for a missing value; an error for anything that is not a
/// finite positive number.
fn price(record: &csv::StringRecord, index: usize, name: &str) -> Result<Option<f64>, QuantError> {
    let text = field(record, index, name)?;
    if MISSING.iter().any(|m| text.eq_ignore_ascii_case(m)) {
        return Ok(None);
    }
    let value: f64 = text.parse().map_err(|e| QuantError::Data {
        reason: format!("invalid {} value: {}", name, e),
    })?;
    if !value.is_finite() || value <= 0.0 {
        return Err(QuantError::Data {
            reason: format!("invalid {} value: {} is not a positive price", name, text),
        });
    }
    Ok(Some(value))
}

impl PricePort for CsvAdapter {
    fn fetch_bars(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, QuantError> {
        let path = self.csv_path(code);
        let content = fs::read_to_string(&path).map_err(|e| QuantError::Data {
            reason: format!("cannot open {}: {}", path.display(), e),
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());
        let to_data = |e: csv::Error| QuantError::Data {
            reason: format!("{}: {}", path.display(), e),
        };
        let columns = Columns::locate(reader.headers().map_err(to_data)?)?;

        let mut bars = Vec::new();
        let mut skipped = 0usize;
        for row in reader.records() {
            let record = row.map_err(to_data)?;
            let date = NaiveDate::parse_from_str(field(&record, columns.date, "date")?, "%Y-%m-%d")
                .map_err(|e| QuantError::Data {
                    reason: format!("bad date in {}: {}", path.display(), e),
                })?;
            if !(start_date..=end_date).contains(&date) {
                continue;
            }

            let (Some(open), Some(high), Some(low), Some(close)) = (
                price(&record, columns.open, "open")?,
                price(&record, columns.high, "high")?,
                price(&record, columns.low, "low")?,
                price(&record, columns.close, "close")?,
            ) else {
                debug!(code, %date, "skipping row with missing prices");
                skipped += 1;
                continue;
            };

            bars.push(PriceBar {
                code: code.to_string(),
                date,
                open,
                high,
                low,
                close,
            });
        }

        bars.sort_by_key(|b| b.date);
        if let Some(w) = bars.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(QuantError::Data {
                reason: format!("duplicate date {} in {}", w[0].date, path.display()),
            });
        }

        debug!(code, bars = bars.len(), skipped, "loaded price file");
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, QuantError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| QuantError::Data {
            reason: format!("cannot list {}: {}", self.base_path.display(), e),
        })?;

        let mut symbols: Vec<String> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .and_then(|name| name.strip_suffix(".csv"))
                    .map(str::to_string)
            })
            .collect();

        symbols.sort();
        Ok(symbols)
    }
}
