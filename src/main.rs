// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! QubitOS Backend Feature Collector
//!
//! Runs one collection pass and writes the feature snapshot.
//!
//! # Usage
//!
//! ```bash
//! # Collect from IBM Quantum (IBM_QUANTUM_TOKEN must be set)
//! qubit-os-features --output /var/lib/qubitos/backend_features.json
//!
//! # Collect from a fixture file
//! qubit-os-features --fixture backends.yaml --concurrency 8 --timeout 5s
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use qubit_os_features::{
    config::{parse_duration, CliOverrides, Config, LoggingConfig},
    Pipeline, Result, RunReport, VERSION,
};

/// QubitOS Backend Feature Collector
#[derive(Parser)]
#[command(name = "qubit-os-features")]
#[command(author = "QubitOS Contributors")]
#[command(version = VERSION)]
#[command(about = "Collect per-backend features into a JSON snapshot")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file for the snapshot
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Per-query timeout (e.g. 500ms, 30s, 2m)
    #[arg(short, long, value_parser = parse_duration)]
    timeout: Option<Duration>,

    /// Maximum number of backends queried at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Read backends from a YAML fixture instead of IBM Quantum
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.logging);

    match run(&config).await {
        Ok(report) => {
            print_failures(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Collection run failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Load configuration and apply CLI overrides.
fn load_config(cli: Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_cli_overrides(CliOverrides {
        output: cli.output,
        timeout: cli.timeout,
        concurrency: cli.concurrency,
        fixture: cli.fixture,
        log_level: cli.log_level,
    })?;
    config.validate()?;
    Ok(config)
}

/// Initialize logging with tracing.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

/// Build the configured provider and run one collection pass.
async fn run(config: &Config) -> Result<RunReport> {
    info!(
        version = VERSION,
        provider = ?config.provider.kind,
        output = %config.output.path.display(),
        concurrency = config.collector.concurrency,
        timeout_ms = config.collector.query_timeout_ms,
        "Starting feature collection"
    );

    Pipeline::from_config(config)?.run().await
}

/// Report skipped backends on stderr.
fn print_failures(report: &RunReport) {
    if report.failures.is_empty() {
        return;
    }
    warn!(
        skipped = report.failures.len(),
        discovered = report.discovered,
        "Some backends were left out of the snapshot"
    );
    eprintln!(
        "{} of {} backends skipped:",
        report.failures.len(),
        report.discovered
    );
    for failure in &report.failures {
        eprintln!("  {} [{}]: {}", failure.handle, failure.kind, failure.message);
    }
}
