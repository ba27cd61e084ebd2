// CLI tool for launching SPL tokens
//
// Mints a fungible token, uploads its image and metadata document, and binds
// the metadata on-chain. Devnet by default; `--mainnet` switches clusters.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use token_launch::{Cluster, LaunchConfig};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "token-launch")]
#[command(about = "Mint an SPL token and bind Metaplex metadata", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<String>,

    /// Target mainnet-beta instead of devnet
    #[arg(long)]
    mainnet: bool,

    /// RPC URL override
    #[arg(long)]
    rpc_url: Option<String>,

    /// Upload gateway endpoint (receives POST {endpoint}/upload)
    #[arg(long)]
    storage_endpoint: Option<String>,

    /// Base URL uploaded content is served from
    #[arg(long)]
    gateway_url: Option<String>,

    /// Path to keypair file
    #[arg(long)]
    keypair: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload assets, create the token, and bind its metadata
    Launch(commands::launch::LaunchCmd),

    /// Print the metadata and holding account addresses of a mint
    Derive(commands::derive::DeriveCmd),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[ERROR] {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config) {
        eprintln!("[ERROR] {:#}", e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Launch(cmd) => commands::launch::execute(cmd, config).await,
        Commands::Derive(cmd) => commands::derive::execute(cmd),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

/// Config file first, then command line overrides
fn build_config(cli: &Cli) -> Result<LaunchConfig> {
    let mut config = match &cli.config {
        Some(path) => LaunchConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => LaunchConfig::default(),
    };

    if cli.mainnet {
        config.network.cluster = Cluster::MainnetBeta;
    }
    if let Some(url) = &cli.rpc_url {
        config = config.with_rpc_url(url.clone());
    }
    if let Some(url) = &cli.storage_endpoint {
        config = config.with_storage_endpoint(url.clone());
    }
    if let Some(url) = &cli.gateway_url {
        config = config.with_gateway_url(url.clone());
    }
    if let Some(path) = &cli.keypair {
        config = config.with_keypair_path(path.clone());
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if cli.json_logs {
        config.logging.json = true;
    }

    config.validate_values().context("Invalid configuration")?;
    Ok(config)
}

fn init_logging(config: &LaunchConfig) -> Result<()> {
    let log_level: tracing::Level = config
        .logging
        .level
        .parse()
        .unwrap_or(tracing::Level::INFO);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("token_launch={}", log_level).into());

    if config.logging.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()?;
    }

    Ok(())
}
