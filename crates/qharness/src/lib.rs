//! qharness: HTTP API test harness with qTest reporting
//!
//! Runs suites of API checks, keeps an HTML report current after every
//! test, and pushes each mapped test's status plus that report to qTest.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐    ┌────────────┐    ┌────────────────┐
//! │ Suite YAML │───►│ TestHarness│───►│ TestReport.html│
//! │ (suite)    │    │ (harness)  │    └───────┬────────┘
//! └────────────┘    └─────┬──────┘            │ attached
//!                         │ on_test_complete  ▼
//!                   ┌─────▼──────┐    ┌────────────────┐
//!                   │ observers  │───►│ QTestReporter  │──► qTest REST
//!                   └────────────┘    └────────────────┘
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

#[allow(clippy::missing_errors_doc)]
pub mod api;
#[allow(clippy::missing_errors_doc)]
pub mod config;
pub mod harness;
pub mod observer;
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn
)]
pub mod qtest;
pub mod report;
pub mod result;
pub mod suite;

pub use api::{ApiCheck, ApiContext, ApiRequest, ApiResponse, CheckResult, Expectation, HttpMethod};
pub use config::{redact, HarnessConfig, QTestConfig, RunNaming, TOKEN_ENV_VAR};
pub use harness::{SuiteResults, TestCase, TestHarness, TestOutcome, TestResult, TestSuite};
pub use observer::{CompletedTest, QTestObserver, RecordedTest, ResultCollector, TestObserver};
pub use qtest::{
    BatchReport, CaseLookup, HttpTransport, QTestError, QTestReporter, RunStatus, Transport,
    UploadError, UploadOutcome, UploadStage,
};
pub use report::ReportWriter;
pub use result::{HarnessError, HarnessResult};
pub use suite::{SuiteFile, TestEntry};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::api::*;
    pub use super::harness::*;
    pub use super::observer::*;
    pub use super::qtest::{QTestReporter, RunStatus, Transport};
    pub use super::report::ReportWriter;
    pub use super::result::*;
}
