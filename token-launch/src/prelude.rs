//! Prelude module for common imports
//!
//! Every module that talks about keys and signatures pulls them from here so
//! the whole crate agrees on the solana-sdk types.

pub use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
};
