mod cli;
mod report;

use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use serde::Serialize;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use drivetube_core::{
    load_config, validate_config, Config, JsonLedgerStore, OrchestratorError, RunOutcome,
    SanitizedConfig, UploadOrchestrator,
};

use cli::{Cli, Commands};
use report::StatusSummary;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();

    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if args.log_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            if let Some(failure) = e.downcast_ref::<OrchestratorError>() {
                error!("Run failed after stage {}", failure.stage());
            }
            error!("Fatal error: {}", failure_report(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> Result<ExitCode> {
    info!("drivetube {} starting at {}", VERSION, Local::now().format("%Y-%m-%d %H:%M:%S"));

    info!("Loading configuration from {:?}", args.config);
    let config = load_config(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;
    validate_config(&config).context("Configuration validation failed")?;
    tracing::debug!("Effective configuration: {:?}", SanitizedConfig::from(&config));

    match args.command() {
        Commands::Run => upload(&config, args.json).await,
        Commands::Pending => pending(&config, args.json).await,
        Commands::Status => status(&config, args.json),
    }
}

/// One orchestrated upload. "No candidates" exits non-zero.
async fn upload(config: &Config, json: bool) -> Result<ExitCode> {
    let orchestrator = UploadOrchestrator::from_config(config)?;
    let outcome = orchestrator.run().await?;

    if json {
        print_json(&outcome)?;
    }

    match &outcome {
        RunOutcome::Uploaded(report) => {
            for line in report::upload_lines(report) {
                info!("{}", line);
            }
            Ok(ExitCode::SUCCESS)
        }
        RunOutcome::NoCandidates {
            total_candidates,
            processed_count,
            ..
        } => {
            warn!(
                "Nothing uploaded: {} candidate(s), {} already processed",
                total_candidates, processed_count
            );
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn pending(config: &Config, json: bool) -> Result<ExitCode> {
    let orchestrator = UploadOrchestrator::from_config(config)?;
    let pending = orchestrator.pending().await?;

    if json {
        print_json(&pending)?;
    } else {
        for line in report::pending_lines(&pending) {
            println!("{}", line);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn status(config: &Config, json: bool) -> Result<ExitCode> {
    let ledger = JsonLedgerStore::new(config.ledger.clone());
    let summary = StatusSummary::load(&ledger, Local::now().date_naive())
        .context("Failed to read upload records")?;

    if json {
        print_json(&summary)?;
    } else {
        for line in report::status_lines(&summary) {
            println!("{}", line);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", out);
    Ok(())
}

/// Error with its full cause list, one per line, plus a backtrace if captured.
fn failure_report(e: &anyhow::Error) -> String {
    format!("{:?}", e)
}
