//! Regression-gate binary: runs the QA harness over the default catalog
//! and exits non-zero on any failure.

use clap::Parser;
use compass_builtins::default_registry;
use compass_qa::{QaHarness, QaSettings};
use compass_store::MemoryStore;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "compass-qa", about = "Compass — agent integration QA gate")]
struct Cli {
    /// Path to a QA settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only exercise this agent key
    #[arg(long)]
    agent: Option<String>,

    /// Emit the report as JSON instead of the summary table
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => match QaSettings::from_toml_file(path) {
            Ok(settings) => settings,
            Err(e) => {
                error!(error = %e, "Failed to load QA settings");
                return ExitCode::FAILURE;
            }
        },
        None => QaSettings::default(),
    };

    let registry = default_registry();
    if let Err(e) = registry.validate() {
        error!(error = %e, "Agent catalog failed shape validation");
        return ExitCode::FAILURE;
    }

    let harness = QaHarness::new(
        Arc::new(registry),
        Arc::new(MemoryStore::new()),
        settings,
    );
    let report = harness.run_filtered(cli.agent.as_deref()).await;

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!(error = %e, "Failed to serialize report");
                return ExitCode::FAILURE;
            }
        }
    } else {
        for check in &report.results {
            let status = if check.test_passed { "PASS" } else { "FAIL" };
            println!("{status}  {:<24} {:>6}ms", check.agent, check.latency_ms);
            for warning in &check.warnings {
                println!("      warning: {warning}");
            }
            for err in &check.errors {
                println!("      error: {err}");
            }
        }
        println!(
            "overall: {}  ({} agents, {}ms)",
            if report.passed() { "PASS" } else { "FAIL" },
            report.results.len(),
            report.total_ms
        );
    }

    if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
