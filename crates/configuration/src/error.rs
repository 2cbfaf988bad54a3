use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read, or a value has the wrong type.
    #[error("Failed to read settings: {0}")]
    LoadError(#[from] config::ConfigError),

    /// Values parsed fine but describe an unusable run.
    #[error("Invalid settings: {0}")]
    ValidationError(String),
}
