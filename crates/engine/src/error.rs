use thiserror::Error;

/// Why a single symbol was left out of the comparison.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Price fetch failed: {0}")]
    Fetch(#[from] api_client::FetchError),

    #[error("Metric calculation failed: {0}")]
    Analytics(#[from] analytics::AnalyticsError),

    #[error("Symbol '{0}' is already in the comparison table.")]
    DuplicateSymbol(String),
}
