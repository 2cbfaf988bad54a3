use thiserror::Error;

/// Everything that can go wrong while retrieving a price series for one symbol.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("The API responded with HTTP status {0}")]
    Status(u16),

    #[error("The API returned an error [{code}]: {description}")]
    Api { code: String, description: String },

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("No price data for {symbol} between {start} and {end}")]
    EmptyRange {
        symbol: String,
        start: String,
        end: String,
    },

    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Received an invalid price series: {0}")]
    InvalidSeries(#[from] core_types::CoreError),
}
