// Token launch command

use anyhow::{Context, Result};
use clap::Args;
use std::{path::PathBuf, sync::Arc};
use token_launch::{
    issuer::RpcTokenIssuer,
    storage::GatewayUploader,
    FreezeAuthority, LaunchConfig, LaunchReport, LaunchRequest, LaunchWorkflow, TokenMetadata,
    TracingSink,
};

use super::utils::{info, parse_pubkey, success, warn};

#[derive(Args)]
pub struct LaunchCmd {
    /// Token name
    #[arg(long)]
    name: String,

    /// Token symbol
    #[arg(long)]
    symbol: String,

    /// Token description
    #[arg(long)]
    description: String,

    /// Path to the token image
    #[arg(long)]
    image: PathBuf,

    /// Decimal places
    #[arg(long, default_value = "9")]
    decimals: u8,

    /// Initial supply in whole tokens
    #[arg(long, default_value = "10000000000")]
    supply: u64,

    /// Wallet receiving the initial supply (defaults to the keypair)
    #[arg(long)]
    owner: Option<String>,

    /// Freeze authority (defaults to the keypair)
    #[arg(long, conflicts_with = "no_freeze_authority")]
    freeze_authority: Option<String>,

    /// Create the mint without a freeze authority
    #[arg(long)]
    no_freeze_authority: bool,

    /// Write the launch report as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Validate inputs without uploading or sending transactions
    #[arg(long)]
    dry_run: bool,
}

pub async fn execute(cmd: LaunchCmd, config: LaunchConfig) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    let metadata = TokenMetadata::new(cmd.name, cmd.symbol, cmd.description);
    let mut request = LaunchRequest::new(metadata, cmd.image)
        .with_decimals(cmd.decimals)
        .with_supply(cmd.supply);

    if let Some(owner) = cmd.owner {
        request = request.with_owner(parse_pubkey(&owner)?);
    }
    if cmd.no_freeze_authority {
        request = request.with_freeze_authority(FreezeAuthority::Disabled);
    } else if let Some(key) = cmd.freeze_authority {
        request = request.with_freeze_authority(FreezeAuthority::Key(parse_pubkey(&key)?));
    }
    if cmd.dry_run {
        request = request.dry_run();
    }

    info(&format!("Cluster: {}", config.cluster()));
    info(&format!("RPC: {}", config.rpc_url()));

    let uploader = GatewayUploader::from_config(&config).context("Failed to build uploader")?;
    let issuer = RpcTokenIssuer::from_config(&config).context("Failed to build RPC client")?;
    let workflow = LaunchWorkflow::new(config, Arc::new(uploader), Arc::new(issuer))
        .with_sink(Arc::new(TracingSink));

    let report = match workflow.run(&request).await {
        Ok(report) => report,
        Err(e) => {
            if let Some(mint) = e.orphaned_mint() {
                warn(&format!(
                    "Token {} exists without metadata; a rerun creates a new mint",
                    mint
                ));
            }
            return Err(e).context("Launch failed");
        }
    };

    print_summary(&report);

    if let Some(path) = cmd.report {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info(&format!("Report written to {}", path.display()));
    }

    Ok(())
}

fn print_summary(report: &LaunchReport) {
    if report.dry_run {
        success(&format!(
            "Dry run passed: {} ({}) with {} raw units for {}",
            report.name, report.symbol, report.raw_amount, report.owner
        ));
        return;
    }

    if let Some(mint) = &report.mint {
        success(&format!("Token mint: {}", mint.mint));
        info(&format!("Holding account: {}", mint.holding_account));
        info(&format!("Mint transaction: {}", mint.signature));
    }
    if let Some(assets) = &report.assets {
        info(&format!("Image URI: {}", assets.image_uri));
        info(&format!("Metadata URI: {}", assets.metadata_uri));
    }
    if let Some(metadata) = &report.metadata {
        success(&format!("Metadata account: {}", metadata.metadata_account));
        info(&format!("Metadata transaction: {}", metadata.signature));
    }
    if let Some(explorer) = &report.explorer {
        info(&format!("Explorer: {}", explorer.mint));
        info(&format!("Mint transaction: {}", explorer.mint_transaction));
        info(&format!("Metadata transaction: {}", explorer.metadata_transaction));
    }
}
