use crate::error::ConfigError;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section is optional in `config.toml`; a missing section falls back to
/// the defaults below, which reproduce the classic four-ETF comparison.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub output: OutputConfig,
    pub provider: ProviderConfig,
    pub logging: LoggingConfig,
}

/// Which trading calendar the metrics are computed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Calendar {
    /// Each symbol keeps every date its exchange traded on.
    #[default]
    Own,
    /// Only dates on which every successfully fetched symbol traded are kept.
    Common,
}

/// What to analyse and how to annualise it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Ticker symbols, in the order they are processed (e.g., "SPY", "VUKE.L").
    pub symbols: Vec<String>,
    /// First date of the requested range.
    pub start_date: NaiveDate,
    /// Last date of the requested range (inclusive).
    pub end_date: NaiveDate,
    /// Annual risk-free rate used by the Sharpe ratio. 0.02 corresponds to 2%.
    pub risk_free_rate: f64,
    /// Fixed annualisation constant; 252 for daily bars. Never inferred from the data.
    pub periods_per_year: u32,
    pub calendar: Calendar,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the chart is written into. Created if missing.
    pub directory: PathBuf,
    pub chart_file: String,
}

/// Settings for the Yahoo Finance chart endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    /// When non-empty, logs are also appended to this file.
    pub file: String,
}

// --- Default Implementations ---

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            symbols: ["SPY", "QQQ", "VUKE.L", "EEM"]
                .into_iter()
                .map(String::from)
                .collect(),
            start_date: NaiveDate::from_ymd_opt(2018, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
            risk_free_rate: 0.02,
            periods_per_year: 252,
            calendar: Calendar::Own,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output/charts"),
            chart_file: "cumulative_returns.svg".to_string(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: String::new(),
        }
    }
}

/// Values supplied on the command line. `None` leaves the loaded value untouched.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub symbols: Option<Vec<String>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub risk_free_rate: Option<f64>,
    pub output_dir: Option<PathBuf>,
    pub calendar: Option<Calendar>,
}

impl Config {
    /// Layers command-line values on top of the file/environment configuration.
    pub fn apply_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(symbols) = overrides.symbols {
            self.analysis.symbols = symbols;
        }
        if let Some(start) = overrides.start_date {
            self.analysis.start_date = start;
        }
        if let Some(end) = overrides.end_date {
            self.analysis.end_date = end;
        }
        if let Some(rate) = overrides.risk_free_rate {
            self.analysis.risk_free_rate = rate;
        }
        if let Some(dir) = overrides.output_dir {
            self.output.directory = dir;
        }
        if let Some(calendar) = overrides.calendar {
            self.analysis.calendar = calendar;
        }
        self
    }

    /// Rejects configurations that would make the run meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let analysis = &self.analysis;

        if analysis.symbols.iter().all(|s| s.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "at least one symbol must be configured".to_string(),
            ));
        }
        if analysis.start_date >= analysis.end_date {
            return Err(ConfigError::ValidationError(format!(
                "start_date ({}) must be before end_date ({})",
                analysis.start_date, analysis.end_date
            )));
        }
        if analysis.periods_per_year == 0 {
            return Err(ConfigError::ValidationError(
                "periods_per_year must be greater than zero".to_string(),
            ));
        }
        if !analysis.risk_free_rate.is_finite() {
            return Err(ConfigError::ValidationError(
                "risk_free_rate must be a finite number".to_string(),
            ));
        }
        if self.output.chart_file.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "output.chart_file must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl OutputConfig {
    pub fn chart_path(&self) -> PathBuf {
        self.directory.join(&self.chart_file)
    }
}
