//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Engine construction error
    #[error("Engine error: {0}")]
    Engine(String),

    /// Generation service error
    #[error("Generation error: {0}")]
    Generation(#[from] fundwire_domain::GenerationError),

    /// Batch run error
    #[error("Batch error: {0}")]
    Batch(#[from] fundwire_batch::BatchError),

    /// Output store error
    #[error("Store error: {0}")]
    Store(#[from] fundwire_store::StoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
