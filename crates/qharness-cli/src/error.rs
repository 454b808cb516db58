//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// One or more tests failed
    #[error("{failed} of {total} tests failed")]
    TestFailures {
        /// Failed test count
        failed: usize,
        /// Tests run
        total: usize,
    },

    /// One or more qTest uploads failed
    #[error("{failed} of {total} qTest uploads failed")]
    UploadFailures {
        /// Failed upload count
        failed: usize,
        /// Uploads attempted
        total: usize,
    },

    /// Lookup found nothing
    #[error("Test case {pid} not found")]
    NotFound {
        /// PID that was looked up
        pid: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Harness library error
    #[error("{0}")]
    Harness(#[from] qharness::HarnessError),

    /// qTest bridge error
    #[error("qTest error: {0}")]
    QTest(#[from] qharness::QTestError),

    /// JSON output error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
