//! qharness CLI: run API suites and report results to qTest
//!
//! ## Usage
//!
//! ```bash
//! qharness run --suite suites/api_smoke.yaml          # Run and upload
//! qharness run --suite suites/api_smoke.yaml --no-upload --tag smoke
//! qharness upload --id TC-9984 TC-9985 --status FAIL --report reports/TestReport.html
//! qharness resolve TC-9984                            # Look up a test case
//! qharness config --env qa                            # Show resolved settings
//! ```

use clap::Parser;
use qharness_cli::{handlers, Cli, CliConfig, CliResult, Commands, ConsoleReporter, Verbosity};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(config.verbosity);

    match run(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, config: &CliConfig) -> CliResult<()> {
    let mut console = ConsoleReporter::new(config.color.should_color(), config.verbosity.is_quiet());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        match cli.command {
            Commands::Run(args) => handlers::execute_run(&mut console, &args).await,
            Commands::Upload(args) => handlers::execute_upload(&console, &args).await,
            Commands::Resolve(args) => handlers::execute_resolve(&console, &args).await,
            Commands::Config(args) => handlers::execute_config(&args),
        }
    })
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.clone().into())
}

fn init_tracing(verbosity: Verbosity) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(verbosity.log_filter())),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
