//! Error types for Citescope
//!
//! Provides a single error taxonomy for the client stack with:
//! - Distinct error types for transport, payload, and configuration failures
//! - Machine-readable error codes
//! - Transient/permanent classification for diagnostics
//!
//! Nothing in this taxonomy is fatal to the process: callers degrade to an
//! empty graph or a partial transcript and log the error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,

    // Resource errors (4xxx)
    PaperNotFound,

    // External service errors (8xxx)
    UpstreamError,
    UpstreamStatus,
    StreamInterrupted,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
    Cancelled,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::ValidationError => 1001,

            ErrorCode::PaperNotFound => 4002,

            ErrorCode::UpstreamError => 8001,
            ErrorCode::UpstreamStatus => 8002,
            ErrorCode::StreamInterrupted => 8003,

            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
            ErrorCode::Cancelled => 9004,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Paper not found: {id}")]
    PaperNotFound { id: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Upstream returned {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Stream interrupted: {message}")]
    StreamInterrupted { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::PaperNotFound { .. } => ErrorCode::PaperNotFound,
            AppError::HttpClient(_) => ErrorCode::UpstreamError,
            AppError::UpstreamStatus { .. } => ErrorCode::UpstreamStatus,
            AppError::StreamInterrupted { .. } => ErrorCode::StreamInterrupted,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::Cancelled => ErrorCode::Cancelled,
            AppError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Whether a later retry could plausibly succeed.
    ///
    /// Nothing retries automatically; this only shapes the log level and
    /// the message shown to the user.
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::HttpClient(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            AppError::UpstreamStatus { status, .. } => *status >= 500,
            AppError::StreamInterrupted { .. } => true,
            _ => false,
        }
    }

    /// Build an upstream-status error, mapping 404 on a paper resource
    pub fn from_status(status: u16, body: String, paper_id: Option<&str>) -> Self {
        match (status, paper_id) {
            (404, Some(id)) => AppError::PaperNotFound { id: id.to_string() },
            _ => AppError::UpstreamStatus { status, body },
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration {
            message: err.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let field = err.field_errors().keys().next().map(|k| k.to_string());
        AppError::Validation {
            message: err.to_string(),
            field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let err = AppError::PaperNotFound { id: "test".into() };
        assert_eq!(err.code(), ErrorCode::PaperNotFound);
        assert_eq!(err.code().as_code(), 4002);
    }

    #[test]
    fn test_status_mapping() {
        let err = AppError::from_status(404, "missing".into(), Some("2301.00001"));
        assert!(matches!(err, AppError::PaperNotFound { ref id } if id == "2301.00001"));

        let err = AppError::from_status(404, "missing".into(), None);
        assert_eq!(err.code(), ErrorCode::UpstreamStatus);
    }

    #[test]
    fn test_transient_classification() {
        assert!(AppError::UpstreamStatus { status: 503, body: String::new() }.is_transient());
        assert!(!AppError::UpstreamStatus { status: 400, body: String::new() }.is_transient());
        assert!(AppError::StreamInterrupted { message: "reset".into() }.is_transient());
        assert!(!AppError::Cancelled.is_transient());
    }
}
