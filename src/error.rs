//! Error types for a3s-sid
//!
//! Classification itself never fails. Errors only surface while building a
//! knowledge base, loading configuration, or pulling data from an external
//! provider.

use thiserror::Error;

/// Errors that can occur while preparing a classification run
#[derive(Debug, Error)]
pub enum SidError {
    /// A pattern rule could not be compiled
    #[error("Invalid pattern for '{label}': {reason}")]
    InvalidPattern {
        label: String,
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O failure while writing a report
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// External account or token provider failure
    #[error("Provider error: {0}")]
    Provider(String),
}

/// Result type alias for SID operations
pub type Result<T> = std::result::Result<T, SidError>;
