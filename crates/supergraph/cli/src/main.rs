//! Supergraph admin CLI
//!
//! Management commands for a supergraph store: schema installation,
//! default-root bootstrap, container listing and content export/import.

use anyhow::Context;
use clap::{Parser, Subcommand};
use supergraph_engine::{EngineConfig, Manager};
use supergraph_types::ContainerKind;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// Supergraph CLI
#[derive(Parser)]
#[command(name = "supergraph")]
#[command(about = "Supergraph - flow-graph store administration", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "SUPERGRAPH_CONFIG", global = true)]
    config: Option<String>,

    /// Log level, overrides the configured one
    #[arg(long, env = "SUPERGRAPH_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create tables, constraints and indexes (idempotent)
    InstallSchema,

    /// Create the default root unless it exists
    CreateDefaultRoot,

    /// List containers
    List {
        /// Only containers of this kind (root or fragment)
        #[arg(short, long)]
        kind: Option<ContainerKind>,
    },

    /// Print a container's content as JSON
    Export {
        /// Container ID
        container_id: String,
    },

    /// Replace a container's content with the JSON in a file
    Import {
        /// Container ID
        container_id: String,

        /// Path to the content file
        file: String,
    },

    /// Show node and relationship counts
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config =
        EngineConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.into());

    if cli.json_logs || config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let manager = Manager::open(config).await.context("failed to open store")?;

    match cli.command {
        Commands::InstallSchema => commands::install_schema(&manager).await,
        Commands::CreateDefaultRoot => commands::create_default_root(&manager).await,
        Commands::List { kind } => commands::list(&manager, kind).await,
        Commands::Export { container_id } => commands::export(&manager, &container_id).await,
        Commands::Import { container_id, file } => {
            commands::import(&manager, &container_id, &file).await
        }
        Commands::Stats => commands::stats(&manager).await,
    }
}
