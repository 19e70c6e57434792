//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and installs the log subscriber
//! - parses CLI arguments
//! - runs the fit pipeline
//! - prints text or JSON reports

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{BootstrapArgs, Command, FitArgs};
use crate::domain::{BootstrapConfig, RunConfig};
use crate::error::AppError;

pub mod pipeline;

/// Environment variable holding the `tracing` filter directive.
pub const LOG_ENV_VAR: &str = "ULENS_LOG";

/// Entry point for the `ulens` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Fit(args) => {
            let config = run_config_from_args(&args, None);
            handle_run(&config)
        }
        Command::Bootstrap(args) => {
            let boot = bootstrap_config_from_args(&args)?;
            let config = run_config_from_args(&args.fit, Some(boot));
            handle_run(&config)
        }
    }
}

/// Logs go to stderr so that stdout carries only the report.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_run(config: &RunConfig) -> Result<(), AppError> {
    let run = pipeline::run_fit(config)?;

    if config.json {
        let json = serde_json::to_string_pretty(&run.report)
            .map_err(|e| AppError::new(4, format!("Failed to serialize report: {e}")))?;
        println!("{json}");
    } else {
        println!("{}", crate::report::format_run_summary(&run.report, &run.residuals));
    }

    Ok(())
}

pub fn run_config_from_args(args: &FitArgs, bootstrap: Option<BootstrapConfig>) -> RunConfig {
    RunConfig {
        simulation: args.sim.to_config(),
        window_before: args.before,
        window_after: args.after,
        bootstrap,
        json: args.json,
    }
}

/// `--trials` wins over `ULENS_BOOTSTRAP_TRIALS`, which wins over the default.
pub fn bootstrap_config_from_args(args: &BootstrapArgs) -> Result<BootstrapConfig, AppError> {
    let mut config = match args.trials {
        Some(trials) => BootstrapConfig {
            trials,
            ..BootstrapConfig::default()
        },
        None => BootstrapConfig::from_env()?,
    };
    config.seed = args.boot_seed;
    config.validate()?;
    Ok(config)
}
