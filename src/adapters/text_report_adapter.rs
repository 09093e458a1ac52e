//! Plain-text rendering of computed results.
//!
//! This is the only place numbers become strings: two decimals, a " %"
//! suffix for percentage-valued figures, and "N/A" for anything the core
//! reported as unavailable.

use crate::domain::daily_report::DailyReport;
use crate::domain::error::QuantError;
use crate::domain::metrics::Metrics;
use crate::domain::portfolio::CorrelationMatrix;
use crate::ports::report_port::ReportPort;
use chrono::NaiveDateTime;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

pub const NOT_AVAILABLE: &str = "N/A";

pub fn format_percent(value: Option<f64>) -> String {
    value
        .filter(|v| v.is_finite())
        .map(|v| format!("{:.2} %", v))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn format_ratio(value: Option<f64>) -> String {
    value
        .filter(|v| v.is_finite())
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Label/value lines for a metrics record.
pub fn metrics_lines(metrics: &Metrics) -> Vec<(&'static str, String)> {
    vec![
        ("Annualized Return", format_percent(metrics.annualized_return)),
        (
            "Annualized Volatility",
            format_percent(metrics.annualized_volatility),
        ),
        ("Sharpe Ratio", format_ratio(metrics.sharpe_ratio)),
        ("Max Drawdown", format_percent(metrics.max_drawdown)),
    ]
}

pub fn render_metrics(metrics: &Metrics) -> String {
    let mut out = String::new();
    for (label, value) in metrics_lines(metrics) {
        let _ = writeln!(out, "{:<22} {}", format!("{label}:"), value);
    }
    out
}

pub fn render_correlation(matrix: &CorrelationMatrix) -> String {
    if matrix.is_empty() {
        return format!("{NOT_AVAILABLE}\n");
    }

    let width = matrix
        .codes
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(0)
        .max(6);

    let mut out = format!("{:width$}", "");
    for code in &matrix.codes {
        let _ = write!(out, " {:>width$}", code);
    }
    out.push('\n');

    for (code, row) in matrix.codes.iter().zip(&matrix.values) {
        let _ = write!(out, "{:<width$}", code);
        for value in row {
            let _ = write!(out, " {:>width$}", format_ratio(*value));
        }
        out.push('\n');
    }
    out
}

pub fn render_daily_report(
    code: &str,
    report: Option<&DailyReport>,
    generated_at: NaiveDateTime,
) -> String {
    let Some(report) = report else {
        return format!(
            "--- Daily Report {} ({}) ---\nERROR: no price data available.\n",
            code,
            generated_at.date()
        );
    };

    let mut out = String::new();
    let _ = writeln!(out, "--- Daily Report {} for {} ---", code, report.date);
    let _ = writeln!(out, "Generated at: {}", generated_at.format("%Y-%m-%d %H:%M:%S"));
    out.push('\n');
    let _ = writeln!(out, "--- Last Trading Day ---");
    let _ = writeln!(out, "Open:  {:.2}", report.open);
    let _ = writeln!(out, "Close: {:.2}", report.close);
    let _ = writeln!(out, "Daily Performance: {}", format_percent(Some(report.daily_return)));
    out.push('\n');
    let _ = writeln!(out, "--- Risk Metrics ({} sessions) ---", report.bars);
    let _ = writeln!(
        out,
        "Annualized Volatility: {}",
        format_percent(report.annualized_volatility)
    );
    let _ = writeln!(out, "Max Drawdown: {}", format_percent(report.max_drawdown));
    out
}

pub struct TextReportAdapter;

impl ReportPort for TextReportAdapter {
    fn write_daily(
        &self,
        code: &str,
        report: Option<&DailyReport>,
        generated_at: NaiveDateTime,
        output_path: &str,
    ) -> Result<(), QuantError> {
        let content = render_daily_report(code, report, generated_at);
        if let Some(parent) = Path::new(output_path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(output_path, content)?;
        Ok(())
    }
}
