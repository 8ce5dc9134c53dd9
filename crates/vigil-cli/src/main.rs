use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use eyre::Result;
use vigil_api::{Api, DetailCache};
use vigil_syncer::{SyncOptions, Syncer};

mod config;
mod definitions;

use crate::config::Config;

/// Reconcile declared monitors, dashboards and SLOs with Datadog.
#[derive(Debug, Parser)]
#[command(name = "vigil", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show what would change.
    Plan(RunArgs),
    /// Show what would change, then change it.
    Apply {
        #[command(flatten)]
        run: RunArgs,
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Debug, Args)]
struct RunArgs {
    /// JSON file with the declared projects and resources.
    #[arg(long, env = "VIGIL_DEFINITIONS")]
    definitions: PathBuf,

    /// Only touch resources of this project.
    #[arg(long, env = "PROJECT")]
    project: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Command::Plan(run) => execute(&config, run, Mode::Plan).await,
        Command::Apply { run, yes } => execute(&config, run, Mode::Apply { yes }).await,
    }
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Plan,
    Apply { yes: bool },
}

async fn execute(config: &Config, run: RunArgs, mode: Mode) -> Result<()> {
    let desired = definitions::load(&run.definitions)?;
    let api = Api::new(config.api_config())?;
    let cache = DetailCache::open(&config.cache_file, env!("CARGO_PKG_VERSION"));
    let options = SyncOptions {
        project: run.project,
    };

    let mut syncer = Syncer::new(Arc::new(api), &cache, desired, options, std::io::stdout()).await?;
    syncer.plan()?;
    cache.persist().await?;

    if let Mode::Apply { yes } = mode {
        if yes || syncer.confirm()? {
            syncer.update().await?;
        } else {
            tracing::info!("plan not applied");
        }
    }
    Ok(())
}
