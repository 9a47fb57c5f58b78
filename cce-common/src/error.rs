//! Error types for the Covered Call Engine client.

use thiserror::Error;

/// Result type alias using the CCE error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the screening pipeline.
///
/// Every failure in the pipeline maps to one of these variants; nothing is
/// fatal. The session keeps its filter state and last-good result set across
/// any of them.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid input (blank preset name, inverted numeric range)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network error (connection failed, timed out)
    #[error("Network error: {0}")]
    Network(String),

    /// Backend rejected the request due to a conflict (e.g. duplicate preset)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend answered with an unexpected status
    #[error("Backend error (HTTP {status}): {message}")]
    Backend { status: u16, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Check if this is a validation error.
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a network error.
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Check if this is a conflict error.
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// HTTP status code this error corresponds to, for logging and
    /// user-facing notices.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Network(_) => 502,
            Self::Backend { status, .. } => *status,
            _ => 500,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
