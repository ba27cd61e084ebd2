use std::{sync::Arc, time::Duration};

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig, instruction::Instruction, transaction::Transaction,
};
use tracing::debug;

use crate::{
    config::LaunchConfig,
    core::{ChainError, ConfigError},
    prelude::*,
};

/// Base RPC client wrapper for common operations
pub struct BaseClient {
    rpc: Arc<RpcClient>,
}

impl BaseClient {
    pub fn new(rpc_url: String, timeout: Duration, commitment: CommitmentConfig) -> Self {
        Self {
            rpc: Arc::new(RpcClient::new_with_timeout_and_commitment(
                rpc_url, timeout, commitment,
            )),
        }
    }

    pub fn from_config(config: &LaunchConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.rpc_url(),
            config.rpc_timeout(),
            config.commitment()?,
        ))
    }

    pub fn with_rpc(rpc: Arc<RpcClient>) -> Self {
        Self { rpc }
    }

    /// Get the RPC client
    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    /// Get the RPC endpoint URL
    pub fn rpc_url(&self) -> String {
        self.rpc.url()
    }

    /// Lamports an account of `data_len` bytes needs to be rent exempt
    pub async fn minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, ChainError> {
        Ok(self
            .rpc
            .get_minimum_balance_for_rent_exemption(data_len)
            .await?)
    }

    /// Get account balance
    pub async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, ChainError> {
        Ok(self.rpc.get_balance(pubkey).await?)
    }

    pub async fn account_exists(&self, address: &Pubkey) -> Result<bool, ChainError> {
        let response = self
            .rpc
            .get_account_with_commitment(address, self.rpc.commitment())
            .await?;
        Ok(response.value.is_some())
    }

    /// Raw token balance of a token account
    pub async fn get_token_balance(&self, token_account: &Pubkey) -> Result<u64, ChainError> {
        let balance = self.rpc.get_token_account_balance(token_account).await?;
        balance
            .amount
            .parse()
            .map_err(|e| ChainError::Rpc(format!("invalid token amount '{}': {}", balance.amount, e)))
    }

    /// Sign with the payer plus any extra signers, send, and wait for confirmation
    pub async fn send_transaction(
        &self,
        instructions: &[Instruction],
        payer: &Keypair,
        extra_signers: &[&Keypair],
    ) -> Result<Signature, ChainError> {
        let recent_blockhash = self.rpc.get_latest_blockhash().await?;

        let mut signers = vec![payer];
        signers.extend_from_slice(extra_signers);

        let tx = Transaction::new_signed_with_payer(
            instructions,
            Some(&payer.pubkey()),
            signers.as_slice(),
            recent_blockhash,
        );

        debug!(
            "Sending transaction with {} instructions and {} signers",
            instructions.len(),
            signers.len()
        );

        Ok(self.rpc.send_and_confirm_transaction(&tx).await?)
    }
}
