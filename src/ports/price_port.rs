//! Price data access port trait.

use crate::domain::error::QuantError;
use crate::domain::price::PriceBar;
use chrono::NaiveDate;

pub trait PricePort {
    /// Daily bars for `code` within `[start_date, end_date]`, sorted by date.
    fn fetch_bars(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, QuantError>;

    fn list_symbols(&self) -> Result<Vec<String>, QuantError>;
}
