//! Error types for DocuMinds
//!
//! Provides the unified error type that crate-specific errors convert into
//! at the service boundary.

use thiserror::Error;

/// Result type alias using DocuMindsError
pub type Result<T> = std::result::Result<T, DocuMindsError>;

/// Unified error type for DocuMinds operations
#[derive(Debug, Error)]
pub enum DocuMindsError {
    // Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    // Timeout error
    #[error("Operation timed out: {0}")]
    Timeout(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Agent task errors
    #[error("Agent error: {0}")]
    Agent(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DocuMindsError {
    /// Whether the failure is transient and worth retrying with backoff
    pub fn is_transient(&self) -> bool {
        matches!(self, DocuMindsError::Storage(_) | DocuMindsError::Timeout(_))
    }
}

// Implement From for common external error types
impl From<serde_json::Error> for DocuMindsError {
    fn from(err: serde_json::Error) -> Self {
        DocuMindsError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for DocuMindsError {
    fn from(err: std::io::Error) -> Self {
        DocuMindsError::Storage(err.to_string())
    }
}

impl From<anyhow::Error> for DocuMindsError {
    fn from(err: anyhow::Error) -> Self {
        DocuMindsError::Internal(err.to_string())
    }
}
