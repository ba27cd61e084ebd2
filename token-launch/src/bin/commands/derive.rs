// Address derivation for an existing mint

use anyhow::Result;
use clap::Args;
use token_launch::protocol::pda;

use super::utils::{info, parse_pubkey};

#[derive(Args)]
pub struct DeriveCmd {
    /// Mint address
    #[arg(long)]
    mint: String,

    /// Wallet whose associated token account to derive
    #[arg(long)]
    owner: Option<String>,
}

pub fn execute(cmd: DeriveCmd) -> Result<()> {
    let mint = parse_pubkey(&cmd.mint)?;
    let builder = pda::shared();

    let (metadata, bump) = builder.metadata(&mint);
    info(&format!("Metadata account: {} (bump {})", metadata, bump));

    if let Some(owner) = cmd.owner {
        let owner = parse_pubkey(&owner)?;
        info(&format!(
            "Associated token account of {}: {}",
            owner,
            builder.associated_token(&owner, &mint)
        ));
    }

    Ok(())
}
