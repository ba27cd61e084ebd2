/// Token launch toolkit
///
/// Mints a fungible SPL token and binds Metaplex metadata to it:
/// - Identity loading from Solana CLI keypair files
/// - Image and metadata upload to a content-addressed gateway
/// - Mint, holding account and initial supply in one transaction
/// - Metadata account creation at the derived metadata address
pub mod client;
pub mod config;
pub mod core;
pub mod events;
pub mod identity;
pub mod instructions;
pub mod issuer;
pub mod metadata;
pub mod prelude;
pub mod protocol;
pub mod storage;
pub mod testing;
pub mod workflow;

pub use config::{Cluster, LaunchConfig};
pub use crate::core::{ChainError, ConfigError, LaunchError, UploadError};
pub use events::{EventSink, Step, TracingSink, WorkflowEvent};
pub use identity::load_keypair;
pub use issuer::{BindMetadataParams, CreateTokenParams, MetadataReceipt, MintReceipt, TokenIssuer};
pub use metadata::TokenMetadata;
pub use storage::{AssetUploader, UploadFile, UploadedAssets};
pub use workflow::{FreezeAuthority, LaunchReport, LaunchRequest, LaunchWorkflow};

// Re-export the metadata program ID
pub const METADATA_PROGRAM_ID: solana_sdk::pubkey::Pubkey = mpl_token_metadata::ID;
