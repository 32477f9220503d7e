//! Error types and handling for Octodash
//!
//! This module defines the error types used throughout the dashboard. Most
//! failures are recoverable: the fetch layer folds them into "no data" and
//! the loop driver decides how long to back off.

use thiserror::Error;

/// Result type alias for Octodash operations
pub type Result<T> = std::result::Result<T, OctodashError>;

/// Main error type for Octodash
#[derive(Debug, Error)]
pub enum OctodashError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Price cache read/write errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Network-related errors
    #[error("Network error: {message}")]
    Network { message: String },

    /// Remote API errors (tariff API, Home Assistant)
    #[error("API error: {message}")]
    Api { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Timeout errors
    #[error("Timeout error: {message}")]
    Timeout { message: String },

    /// Display sink errors (PNG output, framebuffer)
    #[error("Display error: {message}")]
    Display { message: String },
}

impl OctodashError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        OctodashError::Config {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        OctodashError::Cache {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        OctodashError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        OctodashError::Io {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        OctodashError::Network {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        OctodashError::Api {
            message: message.into(),
        }
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        OctodashError::Timeout {
            message: message.into(),
        }
    }

    /// Create a new display sink error
    pub fn display<S: Into<String>>(message: S) -> Self {
        OctodashError::Display {
            message: message.into(),
        }
    }

    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            OctodashError::Network { .. } | OctodashError::Timeout { .. }
        )
    }
}

impl From<std::io::Error> for OctodashError {
    fn from(err: std::io::Error) -> Self {
        OctodashError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for OctodashError {
    fn from(err: serde_yaml::Error) -> Self {
        OctodashError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for OctodashError {
    fn from(err: serde_json::Error) -> Self {
        OctodashError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for OctodashError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            OctodashError::timeout(err.to_string())
        } else if err.is_decode() {
            OctodashError::api(err.to_string())
        } else {
            OctodashError::network(err.to_string())
        }
    }
}

impl From<image::ImageError> for OctodashError {
    fn from(err: image::ImageError) -> Self {
        OctodashError::display(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = OctodashError::config("test config error");
        assert!(matches!(err, OctodashError::Config { .. }));

        let err = OctodashError::cache("test cache error");
        assert!(matches!(err, OctodashError::Cache { .. }));

        let err = OctodashError::validation("field", "test validation error");
        assert!(matches!(err, OctodashError::Validation { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = OctodashError::config("test error");
        assert_eq!(format!("{}", err), "Configuration error: test error");

        let err = OctodashError::validation("test_field", "invalid value");
        assert_eq!(
            format!("{}", err),
            "Validation error: test_field - invalid value"
        );
    }

    #[test]
    fn transient_errors() {
        assert!(OctodashError::network("reset").is_transient());
        assert!(OctodashError::timeout("slow").is_transient());
        assert!(!OctodashError::api("404").is_transient());
        assert!(!OctodashError::config("bad").is_transient());
    }
}
