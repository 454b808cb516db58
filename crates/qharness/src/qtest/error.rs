//! Errors raised by the qTest bridge.

use std::fmt;
use std::path::PathBuf;

/// Errors from the qTest REST API and the upload pipeline.
#[derive(Debug, thiserror::Error)]
pub enum QTestError {
    /// The request could not be sent or the response could not be read.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("API error {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// A creation response did not carry a numeric `id`.
    #[error("{resource} response is missing a numeric id")]
    MissingId {
        /// Resource kind (test-cycle, test-suite, test-run).
        resource: &'static str,
    },

    /// No test case with this PID exists under the configured module.
    #[error("Test case not found for qTest ID {pid}")]
    CaseNotFound {
        /// Human-readable test case identifier.
        pid: String,
    },

    /// Pagination gave up before the listing ran out.
    #[error("Gave up looking for {pid} after {pages} pages")]
    PageLimitExceeded {
        /// Identifier being resolved.
        pid: String,
        /// Number of pages fetched.
        pages: u32,
    },

    /// The report attachment could not be read.
    #[error("Cannot read attachment {}: {source}", path.display())]
    Attachment {
        /// Path of the report file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The API token cannot be sent as an HTTP header.
    #[error("API token contains characters not allowed in an HTTP header")]
    InvalidToken,

    /// A response body was not the JSON shape we expected.
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Where in `RESOLVE -> REGISTER -> UPLOAD` an upload stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    /// Looking up the numeric test case id.
    Resolve,
    /// Creating the test run under the session suite.
    Register,
    /// Posting the auto-test-log with the report attachment.
    Upload,
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Resolve => "resolve",
            Self::Register => "register",
            Self::Upload => "upload",
        };
        f.write_str(name)
    }
}

/// A failed single-identifier upload.
#[derive(Debug, thiserror::Error)]
#[error("Failed to upload results for qTest ID {pid} during {stage}: {source}")]
pub struct UploadError {
    /// Identifier whose upload failed.
    pub pid: String,
    /// Stage that failed.
    pub stage: UploadStage,
    /// Cause.
    #[source]
    pub source: QTestError,
}

impl UploadError {
    pub(crate) fn new(pid: &str, stage: UploadStage, source: QTestError) -> Self {
        Self {
            pid: pid.to_string(),
            stage,
            source,
        }
    }
}
