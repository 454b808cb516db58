//! Resolve command handler

use super::load_settings;
use crate::output::ConsoleReporter;
use crate::{CliError, CliResult, ResolveArgs};
use qharness::{CaseLookup, HttpTransport};

/// Execute the resolve command.
///
/// Only reads the test case listing; no cycle or suite is created.
pub async fn execute_resolve(console: &ConsoleReporter, args: &ResolveArgs) -> CliResult<()> {
    let settings = load_settings(&args.env)?;
    let qtest = settings.qtest.as_ref().ok_or_else(|| {
        CliError::config(format!(
            "no qTest section for environment '{}'",
            args.env.env
        ))
    })?;

    let transport = HttpTransport::new(qtest)?;
    let found = CaseLookup::from_config(qtest)
        .find(&transport, &args.pid)
        .await?;

    match found {
        Some(case) => {
            console.info(&format!(
                "{} -> id {}{}",
                case.pid,
                case.id,
                case.name.map(|n| format!(" ({n})")).unwrap_or_default()
            ));
            Ok(())
        }
        None => Err(CliError::NotFound {
            pid: args.pid.clone(),
        }),
    }
}
