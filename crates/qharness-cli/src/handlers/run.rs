//! Run command handler

use super::load_settings;
use crate::output::ConsoleReporter;
use crate::{CliError, CliResult, RunArgs};
use qharness::{
    ApiContext, HarnessConfig, HttpTransport, QTestObserver, QTestReporter, ReportWriter,
    SuiteFile, TestHarness, TestObserver,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Execute the run command.
///
/// Reporting problems are logged and never change the exit status; only
/// failing tests do.
pub async fn execute_run(console: &mut ConsoleReporter, args: &RunArgs) -> CliResult<()> {
    let settings = load_settings(&args.env)?;
    let suite = SuiteFile::load(&args.suite)?.into_suite();
    let report_path = report_path(&settings, args.report.as_deref());

    let ctx = ApiContext::new(settings.base_url.as_deref(), settings.test_timeout())?;
    let mut harness = TestHarness::new()
        .with_default_timeout(settings.test_timeout())
        .with_report(ReportWriter::new(&report_path));
    if args.fail_fast {
        harness = harness.with_fail_fast();
    }
    if let Some(tag) = &args.tag {
        harness = harness.with_tag_filter(tag);
    }

    let mut uploader = if args.no_upload {
        None
    } else {
        connect_uploader(&settings, &report_path).await
    };

    console.info(&format!(
        "Running {} ({} tests)",
        suite.name,
        suite.test_count()
    ));
    let mut observers: Vec<&mut dyn TestObserver> = vec![&mut *console];
    if let Some(uploader) = uploader.as_mut() {
        observers.push(uploader);
    }
    let results = harness.run(&suite, &ctx, &mut observers).await;

    if let Some(junit) = &args.junit {
        ReportWriter::write_junit(junit, &suite.name, &results.results)?;
    }
    console.summary(&results);
    console.info(&format!("Report: {}", report_path.display()));

    if let Some(uploader) = &uploader {
        let failures = uploader.failures();
        if failures.is_empty() {
            info!(uploaded = uploader.succeeded(), "qTest reporting complete");
        } else {
            warn!(
                failed = failures.len(),
                uploaded = uploader.succeeded(),
                "qTest reporting finished with failures"
            );
        }
    }

    if results.all_passed() {
        Ok(())
    } else {
        Err(CliError::TestFailures {
            failed: results.failed_count(),
            total: results.total(),
        })
    }
}

/// `--report` if given, else the configured report location
#[must_use]
pub fn report_path(settings: &HarnessConfig, overridden: Option<&Path>) -> PathBuf {
    overridden.map_or_else(|| settings.report_path(), Path::to_path_buf)
}

/// Open the qTest session, or run without uploads if that fails.
async fn connect_uploader(
    settings: &HarnessConfig,
    report_path: &Path,
) -> Option<QTestObserver<HttpTransport>> {
    let qtest = settings.upload_target()?;
    match QTestReporter::from_config(qtest).await {
        Ok(reporter) => Some(QTestObserver::new(reporter, report_path)),
        Err(e) => {
            warn!(error = %e, "qTest session could not be started; results will not be uploaded");
            None
        }
    }
}
