//! Report output port trait.

use crate::domain::daily_report::DailyReport;
use crate::domain::error::QuantError;
use chrono::NaiveDateTime;

/// Port for writing the daily risk report.
pub trait ReportPort {
    /// `report` is `None` when no prices were available for `code`.
    fn write_daily(
        &self,
        code: &str,
        report: Option<&DailyReport>,
        generated_at: NaiveDateTime,
        output_path: &str,
    ) -> Result<(), QuantError>;
}
