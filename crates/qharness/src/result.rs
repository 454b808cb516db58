//! Result and error types for qharness.

use crate::qtest::QTestError;
use thiserror::Error;

/// Result type for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Errors that can occur while configuring or running tests
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// HTTP request to the system under test failed
    #[error("Request to {url} failed: {message}")]
    Request {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// One or more expectations did not hold
    #[error("Assertion failed: {message}")]
    Assertion {
        /// Error message
        message: String,
    },

    /// Test exceeded its time budget
    #[error("Test timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Suite definition is malformed
    #[error("Suite error: {message}")]
    Suite {
        /// Error message
        message: String,
    },

    /// qTest reporting bridge error
    #[error("qTest error: {0}")]
    QTest(#[from] QTestError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl HarnessError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an assertion error
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion {
            message: message.into(),
        }
    }

    /// Create a suite error
    #[must_use]
    pub fn suite(message: impl Into<String>) -> Self {
        Self::Suite {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_message() {
        let err = HarnessError::config("environment 'stage' not found");
        assert_eq!(
            err.to_string(),
            "Configuration error: environment 'stage' not found"
        );
    }

    #[test]
    fn test_timeout_message() {
        let err = HarnessError::Timeout { ms: 1500 };
        assert!(err.to_string().contains("1500ms"));
    }

    #[test]
    fn test_qtest_error_wraps() {
        let err: HarnessError = QTestError::CaseNotFound {
            pid: "TC-1".to_string(),
        }
        .into();
        assert!(err.to_string().starts_with("qTest error:"));
        assert!(err.to_string().contains("TC-1"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: HarnessError = io_err.into();
        assert!(err.to_string().contains("I/O"));
    }
}
