//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use qharness::RunStatus;
use std::path::PathBuf;

/// qharness: run HTTP API suites and report results to qTest
#[derive(Parser, Debug)]
#[command(name = "qharness")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a test suite and report results
    Run(RunArgs),

    /// Upload one status for qTest IDs with a report attached
    Upload(UploadArgs),

    /// Look up a qTest test case by its PID
    Resolve(ResolveArgs),

    /// Show the resolved configuration (token redacted)
    Config(ConfigArgs),
}

/// Which configuration file and environment to use
#[derive(Args, Debug, Clone)]
pub struct EnvArgs {
    /// Environment-keyed JSON configuration file
    #[arg(long, default_value = "config/test_config.json")]
    pub config: PathBuf,

    /// Environment to select from the configuration file
    #[arg(long, env = "QHARNESS_ENV", default_value = "qa")]
    pub env: String,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// YAML suite file
    #[arg(short, long)]
    pub suite: PathBuf,

    /// Configuration selection
    #[command(flatten)]
    pub env: EnvArgs,

    /// Only run tests with this tag
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Stop running tests after the first failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Do not push results to qTest
    #[arg(long)]
    pub no_upload: bool,

    /// HTML report path (overrides the configured one)
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Also write a JUnit XML report here
    #[arg(long)]
    pub junit: Option<PathBuf>,
}

/// Arguments for the upload command
#[derive(Parser, Debug)]
pub struct UploadArgs {
    /// qTest IDs (PIDs) to report, e.g. TC-9984
    #[arg(long = "id", required = true, num_args = 1..)]
    pub ids: Vec<String>,

    /// Status to record: PASS, FAIL or SKIP
    #[arg(long, default_value = "PASS")]
    pub status: RunStatus,

    /// Report file to attach
    #[arg(long)]
    pub report: PathBuf,

    /// Configuration selection
    #[command(flatten)]
    pub env: EnvArgs,
}

/// Arguments for the resolve command
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// Test case PID, e.g. TC-9984
    pub pid: String,

    /// Configuration selection
    #[command(flatten)]
    pub env: EnvArgs,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Configuration selection
    #[command(flatten)]
    pub env: EnvArgs,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

/// Color argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Auto-detect
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}
