//! HTML and JUnit test reports.
//!
//! The HTML report is the artifact attached to every qTest auto-test-log,
//! so it is rewritten after each test and always reflects the session so far.

use crate::harness::{TestOutcome, TestResult};
use crate::result::HarnessResult;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Writes session reports to a fixed location.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    path: PathBuf,
}

impl ReportWriter {
    /// Report written to `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the HTML report
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Render and write the HTML report, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be written
    pub fn write_html(&self, suite_name: &str, results: &[TestResult]) -> HarnessResult<()> {
        write_creating_dirs(&self.path, &render_html(suite_name, results))
    }

    /// Render and write a JUnit XML file next to wherever `path` points.
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be written
    pub fn write_junit(
        path: &Path,
        suite_name: &str,
        results: &[TestResult],
    ) -> HarnessResult<()> {
        write_creating_dirs(path, &render_junit(suite_name, results))
    }
}

fn write_creating_dirs(path: &Path, contents: &str) -> HarnessResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, contents)?;
    Ok(())
}

fn total_duration(results: &[TestResult]) -> Duration {
    results.iter().map(|r| r.duration).sum()
}

fn count(results: &[TestResult], outcome: TestOutcome) -> usize {
    results.iter().filter(|r| r.outcome == outcome).count()
}

/// Render HTML report content
#[must_use]
pub fn render_html(suite_name: &str, results: &[TestResult]) -> String {
    let passed = count(results, TestOutcome::Passed);
    let failed = count(results, TestOutcome::Failed);
    let skipped = count(results, TestOutcome::Skipped);
    let rate = if results.is_empty() {
        0.0
    } else {
        passed as f64 / results.len() as f64 * 100.0
    };

    let mut html = String::new();
    html.push_str(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Test Report</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 20px; }
        .summary { background: #f5f5f5; padding: 20px; border-radius: 8px; margin-bottom: 20px; }
        .progress-bar { background: #ddd; height: 20px; border-radius: 10px; overflow: hidden; }
        .passed { background: #4caf50; height: 100%; }
        .test { padding: 10px; margin: 5px 0; border-radius: 4px; }
        .test.pass { background: #e8f5e9; border-left: 4px solid #4caf50; }
        .test.fail { background: #ffebee; border-left: 4px solid #f44336; }
        .test.skip { background: #fff3e0; border-left: 4px solid #ff9800; }
        .error { color: #d32f2f; font-family: monospace; white-space: pre-wrap; }
        .ids { color: #555; font-size: 0.9em; }
    </style>
</head>
<body>
"#,
    );

    html.push_str(&format!(
        r#"<div class="summary">
    <h1>{}</h1>
    <h2>Results: {passed}/{} passed ({rate:.1}%), {failed} failed, {skipped} skipped</h2>
    <div class="progress-bar">
        <div class="passed" style="width: {rate:.1}%"></div>
    </div>
    <p>Duration: {:.2}s</p>
</div>
"#,
        escape_html(suite_name),
        results.len(),
        total_duration(results).as_secs_f64()
    ));

    html.push_str("<h2>Test Results</h2>\n");
    for result in results {
        let class = match result.outcome {
            TestOutcome::Passed => "pass",
            TestOutcome::Failed => "fail",
            TestOutcome::Skipped => "skip",
        };
        html.push_str(&format!(
            r#"<div class="test {class}">
    <strong>{}</strong> - {} ({:.2}ms)
"#,
            escape_html(&result.name),
            result.outcome.as_str(),
            result.duration.as_secs_f64() * 1000.0
        ));
        if !result.qtest_ids.is_empty() {
            html.push_str(&format!(
                "    <div class=\"ids\">qTest: {}</div>\n",
                escape_html(&result.qtest_ids.join(", "))
            ));
        }
        if let Some(error) = &result.error {
            html.push_str(&format!(
                "    <div class=\"error\">{}</div>\n",
                escape_html(error)
            ));
        }
        html.push_str("</div>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

/// Render JUnit XML content
#[must_use]
pub fn render_junit(suite_name: &str, results: &[TestResult]) -> String {
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!(
        "<testsuite name=\"{}\" tests=\"{}\" failures=\"{}\" skipped=\"{}\" time=\"{:.3}\">\n",
        escape_html(suite_name),
        results.len(),
        count(results, TestOutcome::Failed),
        count(results, TestOutcome::Skipped),
        total_duration(results).as_secs_f64()
    ));

    for result in results {
        xml.push_str(&format!(
            "  <testcase name=\"{}\" time=\"{:.3}\">\n",
            escape_html(&result.name),
            result.duration.as_secs_f64()
        ));
        match (result.outcome, &result.error) {
            (TestOutcome::Failed, Some(error)) => {
                let error = escape_html(error);
                xml.push_str(&format!(
                    "    <failure message=\"{error}\">{error}</failure>\n"
                ));
            }
            (TestOutcome::Failed, None) => xml.push_str("    <failure/>\n"),
            (TestOutcome::Skipped, _) => xml.push_str("    <skipped/>\n"),
            (TestOutcome::Passed, _) => {}
        }
        xml.push_str("  </testcase>\n");
    }

    xml.push_str("</testsuite>\n");
    xml
}

/// Escape markup special characters
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
