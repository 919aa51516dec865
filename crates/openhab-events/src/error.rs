//! Error types for openHAB event client operations

use thiserror::Error;

/// Result type alias for client construction
pub type Result<T> = std::result::Result<T, ItemEventError>;

/// Errors that can occur while building an event client
#[derive(Error, Debug)]
pub enum ItemEventError {
    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
