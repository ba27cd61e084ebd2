//! On-chain token issuance

pub mod rpc;

use async_trait::async_trait;
use serde::Serialize;

use crate::{core::ChainError, prelude::*};

pub use crate::instructions::{BindMetadataParams, CreateTokenParams};
pub use rpc::RpcTokenIssuer;

/// Result of a confirmed create-token transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MintReceipt {
    #[serde(with = "display_string")]
    pub mint: Pubkey,
    #[serde(with = "display_string")]
    pub holding_account: Pubkey,
    pub raw_amount: u64,
    #[serde(with = "display_string")]
    pub signature: Signature,
}

/// Result of a confirmed metadata binding transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataReceipt {
    #[serde(with = "display_string")]
    pub metadata_account: Pubkey,
    #[serde(with = "display_string")]
    pub signature: Signature,
}

/// Cluster-facing operations of a launch
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    /// Create a fresh mint, its holding account, and mint the initial supply
    async fn create_token(
        &self,
        payer: &Keypair,
        params: &CreateTokenParams,
    ) -> Result<MintReceipt, ChainError>;

    /// Create the metadata account for an existing mint
    async fn bind_metadata(
        &self,
        payer: &Keypair,
        params: &BindMetadataParams,
    ) -> Result<MetadataReceipt, ChainError>;
}

pub(crate) mod display_string {
    use serde::Serializer;
    use std::fmt::Display;

    pub fn serialize<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }
}
