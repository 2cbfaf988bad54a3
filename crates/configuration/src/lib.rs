use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    AnalysisConfig, Calendar, Config, LoggingConfig, OutputConfig, Overrides, ProviderConfig,
};

/// Environment variables such as `ETF_RISK__ANALYSIS__RISK_FREE_RATE=0.03`
/// override values from the file.
const ENV_PREFIX: &str = "ETF_RISK";

/// Loads the application configuration.
///
/// When `path` is given the file must exist. Otherwise an optional `config.toml`
/// in the working directory is used, and built-in defaults fill every gap.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name("config").required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("analysis.symbols"),
        );

    let config = builder.build()?.try_deserialize::<Config>()?;
    tracing::debug!(?config, "Configuration loaded");

    Ok(config)
}

/// Parses configuration from an in-memory TOML document.
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?
        .try_deserialize::<Config>()?;

    Ok(config)
}
