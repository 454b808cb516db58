//! Upload command handler

use super::{load_settings, require_upload_target};
use crate::output::ConsoleReporter;
use crate::{CliError, CliResult, UploadArgs};
use qharness::QTestReporter;

/// Execute the upload command: one session, one status for every PID.
pub async fn execute_upload(console: &ConsoleReporter, args: &UploadArgs) -> CliResult<()> {
    if !args.report.is_file() {
        return Err(CliError::config(format!(
            "report file {} does not exist",
            args.report.display()
        )));
    }
    let settings = load_settings(&args.env)?;
    let qtest = require_upload_target(&settings, &args.env)?;

    let reporter = QTestReporter::from_config(qtest).await?;
    let batch = reporter
        .upload_multi_test_results(&args.ids, args.status, &args.report)
        .await;
    console.upload_report(&batch);

    let failed = batch.failures().len();
    if failed == 0 {
        Ok(())
    } else {
        Err(CliError::UploadFailures {
            failed,
            total: batch.len(),
        })
    }
}
