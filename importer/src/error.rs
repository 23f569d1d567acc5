//! Error types for the fallible edges of an import: configuration files and
//! serialized output.
//!
//! Parsing itself never fails; see [`crate::parse_hierarchical`].

use thiserror::Error;

/// Errors that can occur while loading configuration or rendering output.
#[derive(Debug, Error)]
pub enum ImportError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Configuration values outside their allowed range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience alias for results with [`ImportError`].
pub type Result<T> = std::result::Result<T, ImportError>;
