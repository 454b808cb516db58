//! Config command handler

use super::load_settings;
use crate::{CliResult, ConfigArgs};
use qharness::HarnessConfig;

/// Execute the config command
pub fn execute_config(args: &ConfigArgs) -> CliResult<()> {
    let settings = load_settings(&args.env)?.redacted();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
    } else {
        print!("{}", render_config(&args.env.env, &settings));
    }
    Ok(())
}

/// Human-readable view of one environment's settings
#[must_use]
pub fn render_config(env: &str, settings: &HarnessConfig) -> String {
    let mut out = format!("Environment: {env}\n");
    out.push_str(&format!(
        "  Base URL: {}\n",
        settings.base_url.as_deref().unwrap_or("(none)")
    ));
    out.push_str(&format!("  Report: {}\n", settings.report_path().display()));
    out.push_str(&format!("  Test timeout: {}ms\n", settings.test_timeout_ms));
    match &settings.qtest {
        None => out.push_str("  qTest: not configured\n"),
        Some(qtest) => {
            out.push_str(&format!(
                "  qTest: {}\n",
                if qtest.enabled { "enabled" } else { "disabled" }
            ));
            out.push_str(&format!("    Project URL: {}\n", qtest.project_url()));
            out.push_str(&format!("    Module: {}\n", qtest.module_id));
            out.push_str(&format!("    Token: {}\n", qtest.api_token));
            out.push_str(&format!(
                "    Paging: {} per page, at most {} pages\n",
                qtest.page_size, qtest.max_pages
            ));
        }
    }
    out
}
