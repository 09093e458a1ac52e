//! CLI definition and dispatch.
//!
//! Loads configuration and prices at the boundary, runs the pure domain
//! computations, and renders the results as text.

use chrono::{Duration, Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report_adapter::{
    TextReportAdapter, render_correlation, render_metrics,
};
use crate::domain::config::{
    DEFAULT_LOOKBACK_DAYS, DEFAULT_REPORT_OUTPUT, DashboardConfig, DataConfig, PortfolioConfig,
    ReportConfig, SingleAssetConfig,
};
use crate::domain::config_validation::validate_config;
use crate::domain::daily_report::DailyReport;
use crate::domain::error::QuantError;
use crate::domain::metrics::Metrics;
use crate::domain::portfolio::{PortfolioMetrics, Weights, portfolio_metrics, portfolio_value};
use crate::domain::price::{PriceSeries, PriceTable, ValueSeries};
use crate::domain::strategy::{DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW, Strategy, StrategyEngine};
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PricePort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "quantdash",
    about = "Strategy backtests and portfolio risk metrics from daily prices"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backtest a single-asset strategy against buy-and-hold
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
        /// buy-and-hold or ma-crossover
        #[arg(short, long)]
        strategy: Option<String>,
        #[arg(long)]
        short_window: Option<usize>,
        #[arg(long)]
        long_window: Option<usize>,
        /// Print the cumulative value series as CSV
        #[arg(long)]
        series: bool,
    },
    /// Portfolio metrics and correlation matrix
    Portfolio {
        #[arg(short, long)]
        config: PathBuf,
        /// Raw comma-separated weights, normalized before use
        #[arg(short, long)]
        weights: Option<String>,
        #[arg(long)]
        series: bool,
    },
    /// Write the daily risk report
    Report {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List tickers available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            ticker,
            strategy,
            short_window,
            long_window,
            series,
        } => run_backtest(
            &config,
            ticker.as_deref(),
            strategy.as_deref(),
            short_window,
            long_window,
            series,
        ),
        Command::Portfolio {
            config,
            weights,
            series,
        } => run_portfolio(&config, weights.as_deref(), series),
        Command::Report {
            config,
            ticker,
            output,
        } => run_report(&config, ticker.as_deref(), output.as_ref()),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config } => run_list_symbols(&config),
    }
}

fn fail(err: QuantError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, QuantError> {
    FileConfigAdapter::from_file(path).map_err(|e| QuantError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Loads, validates and builds the dashboard configuration.
pub fn load_dashboard(path: &PathBuf) -> Result<DashboardConfig, QuantError> {
    eprintln!("Loading config from {}", path.display());
    let adapter = load_config(path)?;
    validate_config(&adapter)?;
    DashboardConfig::from_port(&adapter)
}

/// Fetches one ticker's closes. A failed fetch is logged and treated as an
/// empty series.
pub fn fetch_series(port: &dyn PricePort, code: &str, data: &DataConfig) -> PriceSeries {
    let bars = match port.fetch_bars(code, data.start_date, data.end_date) {
        Ok(bars) => bars,
        Err(e) => {
            warn!(code, error = %e, "price fetch failed");
            eprintln!("warning: no prices for {} ({})", code, e);
            return PriceSeries::empty(code);
        }
    };
    PriceSeries::from_bars(code, &bars).unwrap_or_else(|e| {
        warn!(code, error = %e, "discarding malformed series");
        PriceSeries::empty(code)
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestOutcome {
    pub ticker: String,
    pub strategy: Strategy,
    pub values: ValueSeries,
    pub metrics: Metrics,
    /// Buy-and-hold reference, absent when the strategy already is one.
    pub benchmark: Option<(ValueSeries, Metrics)>,
}

impl BacktestOutcome {
    /// First date after the warm-up, when the strategy can hold a position.
    pub fn first_active_date(&self) -> Option<NaiveDate> {
        self.values.active().first().map(|p| p.date)
    }
}

pub fn backtest_single(
    port: &dyn PricePort,
    single: &SingleAssetConfig,
    data: &DataConfig,
    risk_free_rate: f64,
) -> BacktestOutcome {
    let prices = fetch_series(port, &single.ticker, data);
    info!(ticker = %single.ticker, strategy = %single.strategy, points = prices.len(), "running backtest");

    let values = single.strategy.cumulative_value(&prices);
    let metrics = Metrics::compute(&values, risk_free_rate);

    let benchmark = match single.strategy {
        Strategy::BuyAndHold => None,
        _ => {
            let bh = Strategy::BuyAndHold.cumulative_value(&prices);
            let bh_metrics = Metrics::compute(&bh, risk_free_rate);
            Some((bh, bh_metrics))
        }
    };

    BacktestOutcome {
        ticker: single.ticker.clone(),
        strategy: single.strategy,
        values,
        metrics,
        benchmark,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioOutcome {
    pub table: PriceTable,
    pub values: ValueSeries,
    pub result: PortfolioMetrics,
}

pub fn analyze_portfolio(
    port: &dyn PricePort,
    portfolio: &PortfolioConfig,
    data: &DataConfig,
    risk_free_rate: f64,
) -> Result<PortfolioOutcome, QuantError> {
    let series: Vec<PriceSeries> = portfolio
        .tickers
        .iter()
        .map(|code| fetch_series(port, code, data))
        .collect();
    let table = PriceTable::from_series(&series);
    info!(
        assets = table.column_count(),
        rows = table.row_count(),
        "built price table"
    );

    let values = portfolio_value(&table, &portfolio.weights)?;
    let result = portfolio_metrics(&table, &portfolio.weights, risk_free_rate)?;
    Ok(PortfolioOutcome {
        table,
        values,
        result,
    })
}

/// Report over the `lookback_days` ending at `min(today, end_date)`.
pub fn build_daily_report(
    port: &dyn PricePort,
    report: &ReportConfig,
    data: &DataConfig,
    today: NaiveDate,
) -> Result<DailyReport, QuantError> {
    let end = data.end_date.min(today);
    let start = Duration::try_days(report.lookback_days)
        .and_then(|span| end.checked_sub_signed(span))
        .unwrap_or(NaiveDate::MIN)
        .max(data.start_date);

    let bars = port.fetch_bars(&report.ticker, start, end)?;
    DailyReport::compute(&report.ticker, &bars).ok_or_else(|| QuantError::NoData {
        code: report.ticker.clone(),
    })
}

fn write_series_csv(values: &ValueSeries) -> Result<(), QuantError> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    let to_io = |e: csv::Error| QuantError::Io(io::Error::other(e));
    writer.write_record(["date", "value"]).map_err(to_io)?;
    for point in &values.points {
        writer
            .write_record([point.date.to_string(), format!("{:.6}", point.value)])
            .map_err(to_io)?;
    }
    writer.flush()?;
    Ok(())
}

fn run_backtest(
    config_path: &PathBuf,
    ticker: Option<&str>,
    strategy: Option<&str>,
    short_window: Option<usize>,
    long_window: Option<usize>,
    show_series: bool,
) -> ExitCode {
    let config = match load_dashboard(config_path) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };

    let single = match resolve_single(&config, ticker, strategy, short_window, long_window) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    let port = CsvAdapter::new(config.data.directory.clone());
    let outcome = backtest_single(&port, &single, &config.data, config.risk_free_rate);

    println!("=== {} / {} ===", outcome.ticker, outcome.strategy);
    if outcome.values.warmup > 0 {
        match outcome.first_active_date() {
            Some(d) => println!("Active from:           {}", d),
            None => println!("Active from:           N/A"),
        }
    }
    match outcome.values.last() {
        Some(v) => println!("Final value:           {:.2}", v),
        None => println!("Final value:           N/A"),
    }
    print!("{}", render_metrics(&outcome.metrics));

    if let Some((bh, bh_metrics)) = &outcome.benchmark {
        println!("\n=== {} / {} ===", outcome.ticker, Strategy::BuyAndHold);
        match bh.last() {
            Some(v) => println!("Final value:           {:.2}", v),
            None => println!("Final value:           N/A"),
        }
        print!("{}", render_metrics(bh_metrics));
    }

    if show_series {
        println!();
        if let Err(e) = write_series_csv(&outcome.values) {
            return fail(e);
        }
    }
    ExitCode::SUCCESS
}

/// Applies command-line overrides on top of the `[single]` section.
pub fn resolve_single(
    config: &DashboardConfig,
    ticker: Option<&str>,
    strategy: Option<&str>,
    short_window: Option<usize>,
    long_window: Option<usize>,
) -> Result<SingleAssetConfig, QuantError> {
    let base = config.single.as_ref();

    let ticker = ticker
        .map(str::to_uppercase)
        .or_else(|| base.map(|s| s.ticker.clone()))
        .ok_or_else(|| QuantError::ConfigMissing {
            section: "single".into(),
            key: "ticker".into(),
        })?;

    let (base_short, base_long) = match base.map(|s| s.strategy) {
        Some(Strategy::MovingAverageCrossover {
            short_window,
            long_window,
        }) => (short_window, long_window),
        _ => (DEFAULT_SHORT_WINDOW, DEFAULT_LONG_WINDOW),
    };
    let short = short_window.unwrap_or(base_short);
    let long = long_window.unwrap_or(base_long);

    let strategy = match strategy {
        Some(name) => Strategy::from_name(name, short, long).ok_or_else(|| {
            QuantError::UnknownStrategy {
                name: name.to_string(),
            }
        })?,
        None => match base.map(|s| s.strategy) {
            Some(Strategy::MovingAverageCrossover { .. }) => Strategy::crossover(short, long),
            Some(s) => s,
            None => Strategy::BuyAndHold,
        },
    };

    Ok(SingleAssetConfig { ticker, strategy })
}

fn run_portfolio(config_path: &PathBuf, weights: Option<&str>, show_series: bool) -> ExitCode {
    let config = match load_dashboard(config_path) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };

    let Some(mut portfolio) = config.portfolio.clone() else {
        return fail(QuantError::ConfigMissing {
            section: "portfolio".into(),
            key: "tickers".into(),
        });
    };

    if let Some(raw) = weights {
        match parse_raw_weights(raw).and_then(|w| Weights::normalize(&w)) {
            Ok(w) => portfolio.weights = w,
            Err(e) => return fail(e),
        }
    }

    let port = CsvAdapter::new(config.data.directory.clone());
    eprintln!(
        "Analyzing portfolio of {} assets: {}",
        portfolio.tickers.len(),
        portfolio.tickers.join(", ")
    );
    let outcome = match analyze_portfolio(&port, &portfolio, &config.data, config.risk_free_rate) {
        Ok(o) => o,
        Err(e) => return fail(e),
    };

    println!("=== Portfolio ===");
    for (code, w) in portfolio.tickers.iter().zip(portfolio.weights.as_slice()) {
        match portfolio.colors.get(code) {
            Some(color) => println!("  {:<8} {:>6.2}%  ({})", code, w * 100.0, color),
            None => println!("  {:<8} {:>6.2}%", code, w * 100.0),
        }
    }
    match outcome.values.last() {
        Some(v) => println!("Final value:           {:.2}", v),
        None => println!("Final value:           N/A"),
    }
    print!("{}", render_metrics(&outcome.result.metrics));
    println!("\n=== Correlation of daily returns ===");
    print!("{}", render_correlation(&outcome.result.correlation));

    if show_series {
        println!();
        if let Err(e) = write_series_csv(&outcome.values) {
            return fail(e);
        }
    }
    ExitCode::SUCCESS
}

pub fn parse_raw_weights(raw: &str) -> Result<Vec<f64>, QuantError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>().map_err(|_| QuantError::InvalidWeights {
                reason: format!("'{s}' is not a number"),
            })
        })
        .collect()
}

fn run_report(config_path: &PathBuf, ticker: Option<&str>, output: Option<&PathBuf>) -> ExitCode {
    let config = match load_dashboard(config_path) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };

    let mut report_cfg = match (config.report.clone(), ticker) {
        (Some(r), _) => r,
        (None, Some(t)) => ReportConfig {
            ticker: t.to_string(),
            output: PathBuf::from(DEFAULT_REPORT_OUTPUT),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        },
        (None, None) => {
            return fail(QuantError::ConfigMissing {
                section: "report".into(),
                key: "ticker".into(),
            });
        }
    };
    if let Some(t) = ticker {
        report_cfg.ticker = t.to_uppercase();
    }
    if let Some(o) = output {
        report_cfg.output = o.clone();
    }

    let now = Local::now().naive_local();
    let port = CsvAdapter::new(config.data.directory.clone());
    let report = match build_daily_report(&port, &report_cfg, &config.data, now.date()) {
        Ok(r) => Some(r),
        Err(e) => {
            warn!(code = %report_cfg.ticker, error = %e, "writing report without data");
            eprintln!("warning: {}", e);
            None
        }
    };

    let output_path = report_cfg.output.display().to_string();
    match TextReportAdapter.write_daily(&report_cfg.ticker, report.as_ref(), now, &output_path) {
        Ok(()) => {
            eprintln!("Daily report written to: {}", output_path);
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return fail(e),
    };
    if let Err(e) = validate_config(&adapter) {
        return fail(e);
    }
    let config = match DashboardConfig::from_port(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };

    eprintln!("  data directory: {}", config.data.directory.display());
    eprintln!("  risk-free rate: {}", config.risk_free_rate);
    if let Some(single) = &config.single {
        eprintln!("  single asset:   {} ({})", single.ticker, single.strategy);
    }
    if let Some(portfolio) = &config.portfolio {
        eprintln!("  portfolio:      {}", portfolio.tickers.join(", "));
    }
    if let Some(report) = &config.report {
        eprintln!(
            "  daily report:   {} -> {}",
            report.ticker,
            report.output.display()
        );
    }
    if adapter.get_string("data", "directory").is_none() {
        eprintln!("  (data directory not set, using default)");
    }
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: &PathBuf) -> ExitCode {
    let config = match load_dashboard(config_path) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let port = CsvAdapter::new(config.data.directory.clone());
    match port.list_symbols() {
        Ok(symbols) if symbols.is_empty() => {
            eprintln!("No price files in {}", config.data.directory.display());
            ExitCode::SUCCESS
        }
        Ok(symbols) => {
            for symbol in &symbols {
                println!("{}", symbol);
            }
            eprintln!("{} symbols found", symbols.len());
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}
