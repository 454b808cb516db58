//! Command handlers - extracted from main.rs for testability
//!
//! Each handler loads the selected environment, does its work and maps the
//! outcome onto a [`CliResult`](crate::CliResult).

pub mod config;
pub mod resolve;
pub mod run;
pub mod upload;

pub use config::execute_config;
pub use resolve::execute_resolve;
pub use run::execute_run;
pub use upload::execute_upload;

use crate::{CliError, CliResult, EnvArgs};
use qharness::{HarnessConfig, QTestConfig};

/// Load the settings selected by `--config` and `--env`.
pub fn load_settings(args: &EnvArgs) -> CliResult<HarnessConfig> {
    Ok(HarnessConfig::load(&args.config, &args.env)?)
}

/// The enabled qTest section, or a configuration error naming the environment.
pub fn require_upload_target<'a>(
    settings: &'a HarnessConfig,
    args: &EnvArgs,
) -> CliResult<&'a QTestConfig> {
    settings.upload_target().ok_or_else(|| {
        CliError::config(format!(
            "qTest reporting is not configured or disabled for environment '{}'",
            args.env
        ))
    })
}
