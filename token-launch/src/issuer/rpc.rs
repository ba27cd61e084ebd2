use async_trait::async_trait;
use tracing::{debug, info};

use super::{MetadataReceipt, MintReceipt, TokenIssuer};
use crate::{
    client::BaseClient,
    config::LaunchConfig,
    core::{ChainError, ConfigError},
    instructions::{
        create_metadata_instruction, create_token_instructions, mint_account_size,
        BindMetadataParams, CreateTokenParams,
    },
    prelude::*,
    protocol::PdaBuilder,
};

/// Issues tokens against a live cluster over JSON-RPC
pub struct RpcTokenIssuer {
    base: BaseClient,
    pda: PdaBuilder,
}

impl RpcTokenIssuer {
    pub fn new(base: BaseClient) -> Self {
        Self {
            base,
            pda: PdaBuilder::new(),
        }
    }

    pub fn from_config(config: &LaunchConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(BaseClient::from_config(config)?))
    }

    pub fn base(&self) -> &BaseClient {
        &self.base
    }
}

#[async_trait]
impl TokenIssuer for RpcTokenIssuer {
    async fn create_token(
        &self,
        payer: &Keypair,
        params: &CreateTokenParams,
    ) -> Result<MintReceipt, ChainError> {
        let mint = Keypair::new();
        let mint_pubkey = mint.pubkey();
        let raw_amount = params
            .raw_amount()
            .map_err(|e| ChainError::InstructionBuild(e.to_string()))?;

        let rent = self
            .base
            .minimum_balance_for_rent_exemption(mint_account_size())
            .await?;
        debug!("Mint account rent: {} lamports", rent);

        let instructions =
            create_token_instructions(&payer.pubkey(), &mint_pubkey, params, rent, &self.pda)?;
        let signature = self
            .base
            .send_transaction(&instructions, payer, &[&mint])
            .await?;

        let holding_account = self.pda.associated_token(&params.owner, &mint_pubkey);
        info!("Created mint {} ({})", mint_pubkey, signature);

        Ok(MintReceipt {
            mint: mint_pubkey,
            holding_account,
            raw_amount,
            signature,
        })
    }

    async fn bind_metadata(
        &self,
        payer: &Keypair,
        params: &BindMetadataParams,
    ) -> Result<MetadataReceipt, ChainError> {
        let (metadata_account, instruction) = create_metadata_instruction(params, &self.pda)?;

        if self.base.account_exists(&metadata_account).await? {
            return Err(ChainError::AccountAlreadyExists(metadata_account.to_string()));
        }

        let signature = self
            .base
            .send_transaction(&[instruction], payer, &[])
            .await?;
        info!("Created metadata account {} ({})", metadata_account, signature);

        Ok(MetadataReceipt {
            metadata_account,
            signature,
        })
    }
}
