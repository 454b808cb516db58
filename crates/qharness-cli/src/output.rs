//! Terminal output for test progress and summaries

use async_trait::async_trait;
use console::{style, Term};
use qharness::{BatchReport, CompletedTest, SuiteResults, TestObserver, TestOutcome};

/// Prints one line per finished test and the closing summary.
#[derive(Debug)]
pub struct ConsoleReporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl ConsoleReporter {
    /// Create a reporter writing to stdout
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stdout(),
            use_color,
            quiet,
        }
    }

    fn prefix(&self, outcome: TestOutcome) -> String {
        let (plain, styled) = match outcome {
            TestOutcome::Passed => ("PASS", style("✓").green().bold()),
            TestOutcome::Failed => ("FAIL", style("✗").red().bold()),
            TestOutcome::Skipped => ("SKIP", style("-").yellow().bold()),
        };
        if self.use_color {
            styled.to_string()
        } else {
            plain.to_string()
        }
    }

    /// Line printed for a finished test
    #[must_use]
    pub fn test_line(&self, event: &CompletedTest<'_>) -> String {
        let mut line = format!(
            "{} {} ({:.0}ms)",
            self.prefix(event.outcome),
            event.test_id,
            event.duration.as_secs_f64() * 1000.0
        );
        if !event.qtest_ids.is_empty() {
            line.push_str(&format!(" [{}]", event.qtest_ids.join(", ")));
        }
        if event.outcome == TestOutcome::Failed {
            if let Some(error) = event.error {
                line.push_str(&format!("\n    {error}"));
            }
        }
        line
    }

    /// Print a failure message, even in quiet mode
    pub fn failure(&self, message: &str) {
        let _ = self
            .term
            .write_line(&format!("{} {message}", self.prefix(TestOutcome::Failed)));
    }

    /// Print an informational message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        let _ = self.term.write_line(message);
    }

    /// Summary line for a finished suite
    #[must_use]
    pub fn summary_line(results: &SuiteResults) -> String {
        format!(
            "{}: {} passed, {} failed, {} skipped ({} total) in {:.2}s",
            results.suite_name,
            results.passed_count(),
            results.failed_count(),
            results.skipped_count(),
            results.total(),
            results.duration.as_secs_f64()
        )
    }

    /// Print the suite summary
    pub fn summary(&self, results: &SuiteResults) {
        let line = Self::summary_line(results);
        if results.all_passed() {
            self.info(&line);
        } else {
            self.failure(&line);
        }
    }

    /// Print one line per uploaded PID
    pub fn upload_report(&self, batch: &BatchReport) {
        for outcome in &batch.outcomes {
            match &outcome.result {
                Ok(run_id) => self.info(&format!(
                    "{} {} -> test run {run_id}",
                    self.prefix(TestOutcome::Passed),
                    outcome.pid
                )),
                Err(e) => self.failure(&e.to_string()),
            }
        }
    }
}

#[async_trait]
impl TestObserver for ConsoleReporter {
    async fn on_test_complete(&mut self, event: &CompletedTest<'_>) {
        let line = self.test_line(event);
        match event.outcome {
            TestOutcome::Failed => {
                let _ = self.term.write_line(&line);
            }
            TestOutcome::Passed | TestOutcome::Skipped => self.info(&line),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use qharness::TestResult;
    use std::time::Duration;

    fn event<'a>(outcome: TestOutcome, ids: &'a [String], error: Option<&'a str>) -> CompletedTest<'a> {
        CompletedTest {
            test_id: "get_post",
            outcome,
            qtest_ids: ids,
            error,
            duration: Duration::from_millis(12),
        }
    }

    #[test]
    fn test_plain_line() {
        let reporter = ConsoleReporter::new(false, false);
        let ids = vec!["TC-9984".to_string(), "TC-9985".to_string()];
        let line = reporter.test_line(&event(TestOutcome::Passed, &ids, None));
        assert_eq!(line, "PASS get_post (12ms) [TC-9984, TC-9985]");
    }

    #[test]
    fn test_failure_line_includes_error() {
        let reporter = ConsoleReporter::new(false, false);
        let line = reporter.test_line(&event(TestOutcome::Failed, &[], Some("status 404")));
        assert!(line.starts_with("FAIL get_post"));
        assert!(line.ends_with("\n    status 404"));
    }

    #[test]
    fn test_skip_reason_not_shown() {
        let reporter = ConsoleReporter::new(false, false);
        let line = reporter.test_line(&event(TestOutcome::Skipped, &[], Some("marked skip")));
        assert_eq!(line, "SKIP get_post (12ms)");
    }

    #[test]
    fn test_summary_line() {
        let results = SuiteResults {
            suite_name: "API".to_string(),
            results: vec![TestResult::pass("a"), TestResult::fail("b", "x")],
            duration: Duration::from_millis(1500),
        };
        assert_eq!(
            ConsoleReporter::summary_line(&results),
            "API: 1 passed, 1 failed, 0 skipped (2 total) in 1.50s"
        );
    }
}
