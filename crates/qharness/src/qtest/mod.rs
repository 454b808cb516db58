//! qTest reporting bridge.
//!
//! Pushes per-test results into qTest: one cycle and one suite per
//! session, then for every qTest ID a test run plus an auto-test-log with
//! the HTML report attached.
//!
//! - **Transport**: authenticated JSON calls against the project API
//! - **Reporter**: session bootstrap, test case lookup, run registration, upload
//! - **Attachment**: base64 encoding of report files

pub mod attachment;
pub mod error;
#[cfg(test)]
pub(crate) mod mock;
pub mod models;
pub mod reporter;
pub mod transport;

pub use attachment::{encode_file_to_base64, html_report};
pub use error::{QTestError, UploadError, UploadStage};
pub use models::{Attachment, AutoTestLog, RunStatus, TestCaseRef};
pub use reporter::{
    create_test_cycle, create_test_suite, BatchReport, CaseLookup, QTestReporter, UploadOutcome,
};
pub use transport::{HttpTransport, Transport, TransportResponse};
