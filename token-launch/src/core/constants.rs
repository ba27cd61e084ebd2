/// Public RPC endpoints per cluster
pub const DEVNET_RPC_URL: &str = "https://api.devnet.solana.com";
pub const MAINNET_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

pub const EXPLORER_URL: &str = "https://explorer.solana.com";

pub const DEFAULT_KEYPAIR_PATH: &str = "~/.config/solana/id.json";

pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 60;

/// Seeds for derived addresses
pub mod seeds {
    pub const METADATA: &[u8] = b"metadata";
}

/// Token defaults
pub const DEFAULT_DECIMALS: u8 = 9;
pub const DEFAULT_SUPPLY: u64 = 10_000_000_000;
pub const MAX_DECIMALS: u8 = 9;

/// Metaplex token metadata field limits, in bytes
pub const MAX_NAME_LENGTH: usize = 32;
pub const MAX_SYMBOL_LENGTH: usize = 10;
pub const MAX_URI_LENGTH: usize = 200;
