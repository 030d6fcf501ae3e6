use std::path::PathBuf;

use anyhow::{Context, Result};
use careflow_core::config::AppConfig;
use careflow_core::pipeline::{self, RunOutcome};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Careflow patient-data batch ETL", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full extract-transform-load batch once
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "careflow.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => {
            let config = AppConfig::load(&args.config)
                .with_context(|| format!("failed to load config from {}", args.config.display()))?;

            match pipeline::run(&config).await? {
                RunOutcome::Halted => {
                    warn!("ETL run halted: extraction produced no data");
                }
                RunOutcome::Completed(summary) => {
                    info!(
                        raw_rows = summary.raw_rows,
                        clean_rows = summary.clean_rows,
                        departments = summary.summary_rows,
                        "ETL run finished successfully"
                    );
                }
            }
            Ok(())
        }
    }
}
