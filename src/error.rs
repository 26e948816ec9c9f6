//! Error types for directory operations
//!
//! This module defines the error taxonomy surfaced by the caching layer,
//! the upstream client and the configuration loader.

use thiserror::Error;

/// Main error type for directory operations
///
/// Errors are `Clone` so a single upstream failure can be handed to every
/// caller waiting on the same in-flight fetch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// Transport-level failure reaching the upstream API (connect, timeout, 5xx, 429)
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The requested identifier has no corresponding record upstream
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input that the caller should have rejected
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Upstream answered with a non-success status that is not a transport problem
    #[error("Upstream rejected request ({status}): {message}")]
    UpstreamRejected { status: u16, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

impl DirectoryError {
    /// Whether the error reflects an upstream outage rather than a bad request
    pub fn is_upstream_outage(&self) -> bool {
        matches!(self, DirectoryError::UpstreamUnavailable(_))
    }
}

/// Result type alias for directory operations
pub type Result<T> = std::result::Result<T, DirectoryError>;

impl From<reqwest::Error> for DirectoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DirectoryError::SerializationError(err.to_string())
        } else {
            DirectoryError::UpstreamUnavailable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DirectoryError {
    fn from(err: serde_json::Error) -> Self {
        DirectoryError::SerializationError(err.to_string())
    }
}

impl From<String> for DirectoryError {
    fn from(s: String) -> Self {
        DirectoryError::Other(s)
    }
}

impl From<&str> for DirectoryError {
    fn from(s: &str) -> Self {
        DirectoryError::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = DirectoryError::UpstreamUnavailable("connection refused".to_string());
        assert_eq!(error.to_string(), "Upstream unavailable: connection refused");

        let rejected = DirectoryError::UpstreamRejected {
            status: 400,
            message: "bad payload".to_string(),
        };
        assert!(rejected.to_string().contains("(400)"));

        let not_found = DirectoryError::NotFound("abc".to_string());
        assert_eq!(not_found.to_string(), "Not found: abc");
    }

    #[test]
    fn test_error_conversion() {
        let error: DirectoryError = "test error".into();
        assert!(matches!(error, DirectoryError::Other(_)));

        let error: DirectoryError = "test error".to_string().into();
        assert!(matches!(error, DirectoryError::Other(_)));

        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let error: DirectoryError = json_err.into();
        assert!(matches!(error, DirectoryError::SerializationError(_)));
    }

    #[test]
    fn test_upstream_outage_classification() {
        assert!(DirectoryError::UpstreamUnavailable("x".into()).is_upstream_outage());
        assert!(!DirectoryError::NotFound("x".into()).is_upstream_outage());
    }
}
