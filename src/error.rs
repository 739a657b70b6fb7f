//! Error types for StudyConcierge.

use thiserror::Error;

/// Library-level error type for StudyConcierge operations.
///
/// Looking up an unknown memory key or session id is never an error; those
/// operations return empty or absent results instead.
#[derive(Error, Debug)]
pub enum ConciergeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Collaborator unavailable: {0}")]
    Collaborator(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Result type alias for StudyConcierge operations.
pub type Result<T> = std::result::Result<T, ConciergeError>;
