//! Error types for geodrop

use thiserror::Error;

/// Result type alias for geodrop operations
pub type Result<T> = std::result::Result<T, GeodropError>;

/// Main error type for geodrop
#[derive(Error, Debug)]
pub enum GeodropError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
