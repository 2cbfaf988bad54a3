use anyhow::{Context, Result};
use api_client::YahooClient;
use chrono::NaiveDate;
use clap::Parser;
use configuration::{Calendar, Config, LoggingConfig, Overrides};
use engine::{Engine, RunOutcome};
use report::{ChartSeries, ReportRenderer, SvgChartRenderer, summary_table};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// The main entry point for the ETF risk/return analyser.
#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file, if there is one
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = match load_settings(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return ExitCode::from(2);
        }
    };

    // Held until the end of main so buffered file logs get flushed.
    let _log_guard = match init_tracing(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialise logging: {:#}", e);
            return ExitCode::from(2);
        }
    };

    let result = run(config).await;
    if let Err(e) = &result {
        tracing::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
    }
    ExitCode::from(exit_status(&result))
}

/// 0 once the chart is written, 1 when the run produced nothing usable.
fn exit_status(result: &Result<PathBuf>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Compares annualised return, volatility and Sharpe ratio of a set of ETFs
/// and charts their growth of $1.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults to ./config.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Comma-separated ticker symbols (e.g., "SPY,QQQ,VUKE.L,EEM").
    #[arg(long, value_delimiter = ',')]
    symbols: Option<Vec<String>>,

    /// The start date of the analysis (format: YYYY-MM-DD).
    #[arg(long)]
    from: Option<NaiveDate>,

    /// The end date of the analysis, inclusive (format: YYYY-MM-DD).
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Annual risk-free rate used for the Sharpe ratio (e.g., 0.02).
    #[arg(long)]
    risk_free_rate: Option<f64>,

    /// Directory the chart is written into.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Compute every symbol on its own trading calendar or on the shared one.
    #[arg(long, value_enum)]
    calendar: Option<Calendar>,
}

/// Layers file, environment and command-line settings, then validates them.
fn load_settings(cli: &Cli) -> Result<Config> {
    let config = configuration::load_config(cli.config.as_deref())
        .context("Failed to load configuration")?
        .apply_overrides(Overrides {
            symbols: cli.symbols.clone(),
            start_date: cli.from,
            end_date: cli.to,
            risk_free_rate: cli.risk_free_rate,
            output_dir: cli.output_dir.clone(),
            calendar: cli.calendar,
        });

    config.validate()?;
    Ok(config)
}

// ==============================================================================
// Logging
// ==============================================================================

/// Console logging to stderr, plus an optional plain-text log file.
///
/// `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let (file_layer, guard) = if logging.file.trim().is_empty() {
        (None, None)
    } else {
        let appender = log_file_appender(Path::new(logging.file.trim()))?;
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer().with_ansi(false).with_writer(writer);
        (Some(layer), Some(guard))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}

/// A never-rotating appender writing to exactly `path`, creating its directory.
fn log_file_appender(path: &Path) -> Result<RollingFileAppender> {
    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .context("logging.file must name a file")?;

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)
        .with_context(|| format!("Cannot open log file {}", path.display()))
}

// ==============================================================================
// Analysis Run
// ==============================================================================

/// Fetch -> compute -> chart -> summary.
///
/// Per-symbol problems only shrink the comparison; the run fails when no symbol
/// survives or when the chart cannot be written.
async fn run(config: Config) -> Result<PathBuf> {
    let client = YahooClient::new(&config.provider).context("Failed to build the HTTP client")?;
    let engine = Engine::new(client, config.analysis.clone());

    // Skipped symbols are already reported by the engine's warnings.
    let outcome = engine.run().await;

    let renderer = SvgChartRenderer::new(&config.output);
    let chart_path = render_outcome(&outcome, &renderer)?;

    println!("\n📊 ETF Risk/Return Summary:");
    println!("{}", summary_table(outcome.table.records()));
    println!("Chart saved to {}", chart_path.display());

    Ok(chart_path)
}

/// Charts every surviving symbol, or fails when none survived.
fn render_outcome(outcome: &RunOutcome, renderer: &impl ReportRenderer) -> Result<PathBuf> {
    if outcome.is_total_failure() {
        anyhow::bail!(
            "No symbol could be analysed ({} attempted)",
            outcome.failures.len()
        );
    }

    let series: Vec<ChartSeries> = outcome.table.records().map(ChartSeries::from).collect();
    renderer
        .render(&series)
        .context("Failed to render the cumulative-return chart")
}
