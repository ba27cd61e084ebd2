use solana_program::system_instruction::SystemError;
use solana_sdk::{instruction::InstructionError, pubkey::Pubkey, transaction::TransactionError};
use thiserror::Error;

/// Local input problems: keypair, image, config file, token parameters
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read keypair file {path}: {source}")]
    KeypairRead {
        path: String,
        source: std::io::Error,
    },

    #[error("Malformed keypair file {path}: {reason}")]
    KeypairMalformed { path: String, reason: String },

    #[error("Failed to read image file {path}: {source}")]
    ImageRead {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {reason}")]
    FileParse { path: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidValue(String),

    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("Invalid supply: {0}")]
    InvalidSupply(String),
}

/// Storage gateway failures
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Upload transport error: {0}")]
    Transport(String),

    #[error("Upload timed out: {0}")]
    Timeout(String),

    #[error("Upload rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid gateway response: {0}")]
    InvalidResponse(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for UploadError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UploadError::Timeout(err.to_string())
        } else if err.is_decode() {
            UploadError::InvalidResponse(err.to_string())
        } else {
            UploadError::Transport(err.to_string())
        }
    }
}

/// Cluster-side failures
#[derive(Error, Debug)]
pub enum ChainError {
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Transaction rejected: {0}")]
    TransactionRejected(String),

    #[error("Account already exists: {0}")]
    AccountAlreadyExists(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Failed to build instruction: {0}")]
    InstructionBuild(String),
}

impl From<solana_client::client_error::ClientError> for ChainError {
    fn from(err: solana_client::client_error::ClientError) -> Self {
        let message = err.to_string();
        match err.get_transaction_error() {
            Some(TransactionError::InstructionError(_, InstructionError::Custom(code)))
                if code == SystemError::AccountAlreadyInUse as u32 =>
            {
                ChainError::AccountAlreadyExists(message)
            }
            Some(TransactionError::InstructionError(_, InstructionError::AccountAlreadyInitialized)) => {
                ChainError::AccountAlreadyExists(message)
            }
            Some(_) => ChainError::TransactionRejected(message),
            None => ChainError::Rpc(message),
        }
    }
}

impl From<solana_program::program_error::ProgramError> for ChainError {
    fn from(err: solana_program::program_error::ProgramError) -> Self {
        ChainError::InstructionBuild(err.to_string())
    }
}

/// Error surfaced by a launch run
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    /// The mint exists on-chain but has no metadata account
    #[error("Token {mint} was minted but metadata binding failed: {source}")]
    MetadataUnbound { mint: Pubkey, source: ChainError },
}

impl LaunchError {
    /// Mint left behind by a partially completed run, if any
    pub fn orphaned_mint(&self) -> Option<Pubkey> {
        match self {
            LaunchError::MetadataUnbound { mint, .. } => Some(*mint),
            _ => None,
        }
    }
}

pub type LaunchResult<T> = Result<T, LaunchError>;
