//! Error types for the external text services

use std::fmt;
use thiserror::Error;

/// Error type for encoder, translator and embedding operations
#[derive(Debug, Error)]
pub enum MLError {
    /// Error during embedding generation or validation
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Error reported by a translation service
    #[error("Translation error: {0}")]
    Translation(String),

    /// Transport-level failure talking to a remote service
    #[error("Request error: {0}")]
    Request(String),

    /// Remote service answered with something we cannot use
    #[error("Unexpected response: {0}")]
    Response(String),

    /// Error related to service configuration
    #[error("Service configuration error: {0}")]
    Configuration(String),
}

impl MLError {
    /// Create a new embedding error
    pub fn embedding(msg: impl fmt::Display) -> Self {
        Self::Embedding(msg.to_string())
    }

    /// Create a new translation error
    pub fn translation(msg: impl fmt::Display) -> Self {
        Self::Translation(msg.to_string())
    }

    /// Create a new request error
    pub fn request(msg: impl fmt::Display) -> Self {
        Self::Request(msg.to_string())
    }

    /// Create a new response error
    pub fn response(msg: impl fmt::Display) -> Self {
        Self::Response(msg.to_string())
    }

    /// Create a new configuration error
    pub fn configuration(msg: impl fmt::Display) -> Self {
        Self::Configuration(msg.to_string())
    }
}

impl From<reqwest::Error> for MLError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Response(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

/// Result type for ML operations
pub type Result<T> = std::result::Result<T, MLError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = MLError::Embedding("dimension mismatch".to_string());
        assert_eq!(error.to_string(), "Embedding error: dimension mismatch");

        let error = MLError::Translation("quota exceeded".to_string());
        assert_eq!(error.to_string(), "Translation error: quota exceeded");
    }

    #[test]
    fn test_error_factory_methods() {
        assert!(matches!(MLError::embedding("x"), MLError::Embedding(_)));
        assert!(matches!(MLError::translation("x"), MLError::Translation(_)));
        assert!(matches!(MLError::request("x"), MLError::Request(_)));
        assert!(matches!(MLError::response("x"), MLError::Response(_)));
        assert!(matches!(MLError::configuration("x"), MLError::Configuration(_)));
    }
}
