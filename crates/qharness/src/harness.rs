//! Test harness for running test suites.

use crate::api::{ApiCheck, ApiContext};
use crate::observer::{CompletedTest, TestObserver};
use crate::qtest::RunStatus;
use crate::report::ReportWriter;
use crate::result::HarnessError;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// How a test ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestOutcome {
    /// Test passed
    Passed,
    /// Test failed
    Failed,
    /// Test was skipped
    Skipped,
}

impl TestOutcome {
    /// Lower-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

impl From<TestOutcome> for RunStatus {
    fn from(outcome: TestOutcome) -> Self {
        match outcome {
            TestOutcome::Passed => Self::Pass,
            TestOutcome::Failed => Self::Fail,
            TestOutcome::Skipped => Self::Skip,
        }
    }
}

/// A test suite containing multiple tests
#[derive(Debug, Clone)]
pub struct TestSuite {
    /// Suite name
    pub name: String,
    /// Tests in this suite
    pub tests: Vec<TestCase>,
}

impl TestSuite {
    /// Create a new test suite
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tests: Vec::new(),
        }
    }

    /// Add a test case
    pub fn add_test(&mut self, test: TestCase) {
        self.tests.push(test);
    }

    /// Get the number of tests
    #[must_use]
    pub fn test_count(&self) -> usize {
        self.tests.len()
    }
}

/// A single test case with its markers
#[derive(Debug, Clone)]
pub struct TestCase {
    /// Test name
    pub name: String,
    /// Free-form tags, e.g. `smoke`
    pub tags: Vec<String>,
    /// qTest IDs this test reports to
    pub qtest_ids: Vec<String>,
    /// Skip without running
    pub skip: bool,
    /// Test timeout in milliseconds; `None` uses the harness default
    pub timeout_ms: Option<u64>,
    /// The check to execute
    pub check: ApiCheck,
}

impl TestCase {
    /// Create a new test case
    #[must_use]
    pub fn new(name: impl Into<String>, check: ApiCheck) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
            qtest_ids: Vec::new(),
            skip: false,
            timeout_ms: None,
            check,
        }
    }

    /// Set timeout
    #[must_use]
    pub const fn with_timeout(mut self, ms: u64) -> Self {
        self.timeout_ms = Some(ms);
        self
    }

    /// Add a tag
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Map to qTest IDs
    #[must_use]
    pub fn with_qtest_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.qtest_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Mark as skipped
    #[must_use]
    pub const fn skipped(mut self) -> Self {
        self.skip = true;
        self
    }

    /// Whether the test carries `tag`
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Result of running a single test
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    /// Test name
    pub name: String,
    /// How it ended
    pub outcome: TestOutcome,
    /// Error message if failed, reason if skipped
    pub error: Option<String>,
    /// Test duration
    pub duration: Duration,
    /// qTest IDs of the test
    pub qtest_ids: Vec<String>,
}

impl TestResult {
    /// Create a passing test result
    #[must_use]
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: TestOutcome::Passed,
            error: None,
            duration: Duration::ZERO,
            qtest_ids: Vec::new(),
        }
    }

    /// Create a failing test result
    #[must_use]
    pub fn fail(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: TestOutcome::Failed,
            error: Some(error.into()),
            duration: Duration::ZERO,
            qtest_ids: Vec::new(),
        }
    }

    /// Create a skipped test result
    #[must_use]
    pub fn skip(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: TestOutcome::Skipped,
            error: Some(reason.into()),
            duration: Duration::ZERO,
            qtest_ids: Vec::new(),
        }
    }

    /// Set duration
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set qTest IDs
    #[must_use]
    pub fn with_qtest_ids(mut self, ids: Vec<String>) -> Self {
        self.qtest_ids = ids;
        self
    }

    /// Whether test passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcome == TestOutcome::Passed
    }
}

/// Results from running a test suite
#[derive(Debug, Clone, Serialize)]
pub struct SuiteResults {
    /// Suite name
    pub suite_name: String,
    /// Individual test results
    pub results: Vec<TestResult>,
    /// Total duration
    pub duration: Duration,
}

impl SuiteResults {
    /// Check if no test failed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }

    /// Count passed tests
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.count(TestOutcome::Passed)
    }

    /// Count failed tests
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(TestOutcome::Failed)
    }

    /// Count skipped tests
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(TestOutcome::Skipped)
    }

    /// Get total test count
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Get failed tests
    #[must_use]
    pub fn failures(&self) -> Vec<&TestResult> {
        self.results
            .iter()
            .filter(|r| r.outcome == TestOutcome::Failed)
            .collect()
    }

    fn count(&self, outcome: TestOutcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }
}

/// Test harness for running suites
#[derive(Debug)]
pub struct TestHarness {
    /// Whether to stop on first failure
    pub fail_fast: bool,
    /// Only run tests carrying this tag
    pub tag_filter: Option<String>,
    /// Default per-test timeout
    pub default_timeout: Duration,
    /// Report refreshed after every test
    pub report: Option<ReportWriter>,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self {
            fail_fast: false,
            tag_filter: None,
            default_timeout: Duration::from_secs(30),
            report: None,
        }
    }
}

impl TestHarness {
    /// Create a new test harness
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable fail-fast mode
    #[must_use]
    pub const fn with_fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    /// Only run tests tagged `tag`
    #[must_use]
    pub fn with_tag_filter(mut self, tag: impl Into<String>) -> Self {
        self.tag_filter = Some(tag.into());
        self
    }

    /// Set the default per-test timeout
    #[must_use]
    pub const fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Write an HTML report after every test
    #[must_use]
    pub fn with_report(mut self, report: ReportWriter) -> Self {
        self.report = Some(report);
        self
    }

    /// Run a test suite.
    ///
    /// Tests run one at a time in suite order. After each test the report
    /// is rewritten and then every observer is told about the result, so an
    /// observer that uploads the report sees the test it is handling.
    pub async fn run(
        &self,
        suite: &TestSuite,
        ctx: &ApiContext,
        observers: &mut [&mut dyn TestObserver],
    ) -> SuiteResults {
        let start = Instant::now();
        let mut results: Vec<TestResult> = Vec::new();
        let mut stopped = false;

        let selected = suite.tests.iter().filter(|t| {
            self.tag_filter
                .as_deref()
                .map_or(true, |tag| t.has_tag(tag))
        });

        for test in selected {
            let result = if stopped {
                TestResult::skip(&test.name, "skipped after earlier failure (fail-fast)")
            } else if test.skip {
                TestResult::skip(&test.name, "marked skip")
            } else {
                self.run_one(test, ctx).await
            }
            .with_qtest_ids(test.qtest_ids.clone());

            match result.outcome {
                TestOutcome::Passed => info!(test = %result.name, "PASSED"),
                TestOutcome::Failed => warn!(
                    test = %result.name,
                    error = result.error.as_deref().unwrap_or_default(),
                    "FAILED"
                ),
                TestOutcome::Skipped => info!(test = %result.name, "SKIPPED"),
            }
            if self.fail_fast && result.outcome == TestOutcome::Failed {
                stopped = true;
            }

            results.push(result);
            if let Some(report) = &self.report {
                if let Err(e) = report.write_html(&suite.name, &results) {
                    warn!(path = %report.path().display(), error = %e, "Could not write report");
                }
            }

            if let Some(last) = results.last() {
                let event = CompletedTest {
                    test_id: &last.name,
                    outcome: last.outcome,
                    qtest_ids: &last.qtest_ids,
                    error: last.error.as_deref(),
                    duration: last.duration,
                };
                for observer in observers.iter_mut() {
                    observer.on_test_complete(&event).await;
                }
            }
        }

        SuiteResults {
            suite_name: suite.name.clone(),
            results,
            duration: start.elapsed(),
        }
    }

    async fn run_one(&self, test: &TestCase, ctx: &ApiContext) -> TestResult {
        let timeout = test
            .timeout_ms
            .map_or(self.default_timeout, Duration::from_millis);
        let started = Instant::now();
        let result = match tokio::time::timeout(timeout, test.check.run(ctx)).await {
            Ok(Ok(_)) => TestResult::pass(&test.name),
            Ok(Err(e)) => TestResult::fail(&test.name, e.to_string()),
            Err(_) => TestResult::fail(
                &test.name,
                HarnessError::Timeout {
                    ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                }
                .to_string(),
            ),
        };
        result.with_duration(started.elapsed())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::api::ApiRequest;
    use crate::observer::ResultCollector;

    fn unreachable_check() -> ApiCheck {
        ApiCheck {
            request: ApiRequest {
                url: "http://127.0.0.1:9/unreachable".to_string(),
                ..ApiRequest::default()
            },
            ..ApiCheck::default()
        }
    }

    mod outcome_tests {
        use super::*;

        #[test]
        fn test_status_mapping() {
            assert_eq!(RunStatus::from(TestOutcome::Passed), RunStatus::Pass);
            assert_eq!(RunStatus::from(TestOutcome::Failed), RunStatus::Fail);
            assert_eq!(RunStatus::from(TestOutcome::Skipped), RunStatus::Skip);
        }

        #[test]
        fn test_outcome_names_are_closed() {
            for outcome in [TestOutcome::Passed, TestOutcome::Failed, TestOutcome::Skipped] {
                let json = serde_json::to_string(&outcome).unwrap();
                assert_eq!(json, format!("\"{}\"", outcome.as_str()));
                assert_eq!(serde_json::from_str::<TestOutcome>(&json).unwrap(), outcome);
            }
            assert!(serde_json::from_str::<TestOutcome>("\"xfail\"").is_err());
        }
    }

    mod suite_tests {
        use super::*;

        #[test]
        fn test_suite_creation() {
            let mut suite = TestSuite::new("api");
            assert_eq!(suite.test_count(), 0);
            suite.add_test(TestCase::new("get", ApiCheck::default()));
            assert_eq!(suite.test_count(), 1);
        }

        #[test]
        fn test_case_markers() {
            let case = TestCase::new("t", ApiCheck::default())
                .with_tag("smoke")
                .with_qtest_ids(["TC-9984", "TC-9985"])
                .with_timeout(500);
            assert!(case.has_tag("smoke"));
            assert!(!case.has_tag("regression"));
            assert_eq!(case.qtest_ids, vec!["TC-9984", "TC-9985"]);
            assert_eq!(case.timeout_ms, Some(500));
        }

        #[test]
        fn test_suite_results_counts() {
            let results = SuiteResults {
                suite_name: "s".to_string(),
                results: vec![
                    TestResult::pass("a"),
                    TestResult::fail("b", "boom"),
                    TestResult::skip("c", "marked skip"),
                ],
                duration: Duration::ZERO,
            };
            assert_eq!(results.total(), 3);
            assert_eq!(results.passed_count(), 1);
            assert_eq!(results.failed_count(), 1);
            assert_eq!(results.skipped_count(), 1);
            assert!(!results.all_passed());
            assert_eq!(results.failures()[0].name, "b");
        }
    }

    mod run_tests {
        use super::*;

        fn ctx() -> ApiContext {
            ApiContext::new(None, Duration::from_secs(2)).unwrap()
        }

        #[tokio::test]
        async fn test_skip_and_tag_filter() {
            let mut suite = TestSuite::new("s");
            suite.add_test(
                TestCase::new("skipped", unreachable_check())
                    .with_tag("smoke")
                    .with_qtest_ids(["TC-1"])
                    .skipped(),
            );
            suite.add_test(TestCase::new("untagged", unreachable_check()));

            let mut collector = ResultCollector::new();
            let harness = TestHarness::new().with_tag_filter("smoke");
            let mut observers: [&mut dyn TestObserver; 1] = [&mut collector];
            let results = harness.run(&suite, &ctx(), &mut observers).await;

            assert_eq!(results.total(), 1);
            assert_eq!(results.results[0].outcome, TestOutcome::Skipped);
            let seen = collector.results();
            assert_eq!(seen.len(), 1);
            assert_eq!(seen[0].test_id, "skipped");
            assert_eq!(seen[0].qtest_ids, vec!["TC-1"]);
        }

        #[tokio::test]
        async fn test_failure_and_fail_fast() {
            let mut suite = TestSuite::new("s");
            suite.add_test(TestCase::new("first", unreachable_check()));
            suite.add_test(TestCase::new("second", unreachable_check()));

            let mut collector = ResultCollector::new();
            let harness = TestHarness::new().with_fail_fast();
            let mut observers: [&mut dyn TestObserver; 1] = [&mut collector];
            let results = harness.run(&suite, &ctx(), &mut observers).await;

            assert_eq!(results.failed_count(), 1);
            assert_eq!(results.skipped_count(), 1);
            assert!(results.results[1]
                .error
                .as_deref()
                .unwrap()
                .contains("fail-fast"));
            assert_eq!(collector.results().len(), 2);
        }

        /// Accepts connections and never answers.
        async fn silent_server() -> String {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                let mut held = Vec::new();
                while let Ok((socket, _)) = listener.accept().await {
                    held.push(socket);
                }
            });
            format!("http://{addr}/slow")
        }

        fn check_at(url: String) -> ApiCheck {
            ApiCheck {
                request: ApiRequest {
                    url,
                    ..ApiRequest::default()
                },
                ..ApiCheck::default()
            }
        }

        #[tokio::test]
        async fn test_slow_endpoint_times_out() {
            let url = silent_server().await;
            let mut suite = TestSuite::new("slow");
            suite.add_test(TestCase::new("per_test", check_at(url.clone())).with_timeout(50));
            suite.add_test(TestCase::new("harness_default", check_at(url)));

            let slow_ctx = ApiContext::new(None, Duration::from_secs(10)).unwrap();
            let harness = TestHarness::new().with_default_timeout(Duration::from_millis(80));
            let mut collector = ResultCollector::new();
            let mut observers: [&mut dyn TestObserver; 1] = [&mut collector];
            let started = Instant::now();
            let results = harness.run(&suite, &slow_ctx, &mut observers).await;

            assert!(started.elapsed() < Duration::from_secs(5));
            assert_eq!(results.failed_count(), 2);
            let first = &results.results[0];
            assert_eq!(first.outcome, TestOutcome::Failed);
            assert!(first.error.as_deref().unwrap().contains("timed out after 50ms"));
            let second = &results.results[1];
            assert!(second.error.as_deref().unwrap().contains("timed out after 80ms"));
            assert_eq!(collector.results()[0].outcome, TestOutcome::Failed);
        }

        #[tokio::test]
        async fn test_report_written_after_each_test() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("reports").join("TestReport.html");
            let mut suite = TestSuite::new("report suite");
            suite.add_test(TestCase::new("only", unreachable_check()).skipped());

            let harness = TestHarness::new().with_report(ReportWriter::new(&path));
            let mut observers: [&mut dyn TestObserver; 0] = [];
            harness.run(&suite, &ctx(), &mut observers).await;

            let html = std::fs::read_to_string(&path).unwrap();
            assert!(html.contains("report suite"));
            assert!(html.contains("only"));
        }
    }
}
