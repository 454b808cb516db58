//! Hooks notified after every test.
//!
//! The harness calls each [`TestObserver`] once per finished test, after the
//! HTML report has been rewritten. [`QTestObserver`] turns those events into
//! qTest uploads; [`ResultCollector`] keeps them for the end-of-run summary.

use crate::harness::TestOutcome;
use crate::qtest::{BatchReport, HttpTransport, QTestReporter, RunStatus, Transport, UploadError};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// A finished test, as seen by observers.
#[derive(Debug, Clone, Copy)]
pub struct CompletedTest<'a> {
    /// Test name
    pub test_id: &'a str,
    /// How it ended
    pub outcome: TestOutcome,
    /// qTest IDs the test is mapped to; may be empty
    pub qtest_ids: &'a [String],
    /// Failure message or skip reason
    pub error: Option<&'a str>,
    /// Time spent in the test
    pub duration: Duration,
}

/// Receives per-test completion events.
#[async_trait]
pub trait TestObserver: Send {
    /// Called once per test, in execution order.
    async fn on_test_complete(&mut self, event: &CompletedTest<'_>);
}

/// Owned copy of a [`CompletedTest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedTest {
    /// Test name
    pub test_id: String,
    /// How it ended
    pub outcome: TestOutcome,
    /// qTest IDs of the test
    pub qtest_ids: Vec<String>,
}

/// Collects every event it sees.
#[derive(Debug, Default)]
pub struct ResultCollector {
    results: Vec<RecordedTest>,
}

impl ResultCollector {
    /// Create an empty collector
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded so far
    #[must_use]
    pub fn results(&self) -> &[RecordedTest] {
        &self.results
    }

    /// Tests that were mapped to at least one qTest ID
    #[must_use]
    pub fn mapped_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| !r.qtest_ids.is_empty())
            .count()
    }
}

#[async_trait]
impl TestObserver for ResultCollector {
    async fn on_test_complete(&mut self, event: &CompletedTest<'_>) {
        self.results.push(RecordedTest {
            test_id: event.test_id.to_string(),
            outcome: event.outcome,
            qtest_ids: event.qtest_ids.to_vec(),
        });
    }
}

/// Uploads each mapped test's result to qTest.
///
/// Upload failures are logged and kept; they never change the test outcome.
#[derive(Debug)]
pub struct QTestObserver<T: Transport = HttpTransport> {
    reporter: QTestReporter<T>,
    report_path: PathBuf,
    uploads: Vec<(String, BatchReport)>,
}

impl<T: Transport> QTestObserver<T> {
    /// Upload through `reporter`, attaching the file at `report_path`.
    pub fn new(reporter: QTestReporter<T>, report_path: impl Into<PathBuf>) -> Self {
        Self {
            reporter,
            report_path: report_path.into(),
            uploads: Vec::new(),
        }
    }

    /// The underlying reporter
    pub const fn reporter(&self) -> &QTestReporter<T> {
        &self.reporter
    }

    /// Batch results per test, in execution order
    pub fn uploads(&self) -> &[(String, BatchReport)] {
        &self.uploads
    }

    /// Number of qTest IDs uploaded successfully
    pub fn succeeded(&self) -> usize {
        self.uploads.iter().map(|(_, b)| b.succeeded()).sum()
    }

    /// Every failed upload across the session
    pub fn failures(&self) -> Vec<&UploadError> {
        self.uploads.iter().flat_map(|(_, b)| b.failures()).collect()
    }
}

#[async_trait]
impl<T: Transport> TestObserver for QTestObserver<T> {
    async fn on_test_complete(&mut self, event: &CompletedTest<'_>) {
        if event.qtest_ids.is_empty() {
            return;
        }
        let status = RunStatus::from(event.outcome);
        let batch = self
            .reporter
            .upload_multi_test_results(event.qtest_ids, status, &self.report_path)
            .await;

        if batch.all_succeeded() {
            info!(test = event.test_id, %status, uploaded = batch.succeeded(), "Reported to qTest");
        } else {
            warn!(
                test = event.test_id,
                failed = batch.failures().len(),
                total = batch.len(),
                "Some qTest uploads failed"
            );
        }
        self.uploads.push((event.test_id.to_string(), batch));
    }
}
