use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::core::constants::seeds;
use crate::prelude::*;

/// PDA cache to avoid recomputing addresses
pub struct PdaCache {
    cache: RwLock<HashMap<String, (Pubkey, u8)>>,
}

impl PdaCache {
    pub fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn get_or_compute<F>(&self, key: &str, compute: F) -> (Pubkey, u8)
    where
        F: FnOnce() -> (Pubkey, u8),
    {
        let cached = self
            .cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .copied();
        if let Some(cached) = cached {
            return cached;
        }

        let result = compute();
        self.cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), result);
        result
    }

    pub fn contains(&self, key: &str) -> bool {
        self.cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(key)
    }
}

impl Default for PdaCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Address derivation for everything a launch touches
pub struct PdaBuilder {
    cache: PdaCache,
    pub metadata_program_id: Pubkey,
}

impl PdaBuilder {
    pub fn new() -> Self {
        Self::with_program_id(mpl_token_metadata::ID)
    }

    pub fn with_program_id(metadata_program_id: Pubkey) -> Self {
        Self {
            cache: PdaCache::new(),
            metadata_program_id,
        }
    }

    /// Metadata account: seeds are ["metadata", program id, mint], in that order
    pub fn metadata(&self, mint: &Pubkey) -> (Pubkey, u8) {
        let key = format!("metadata:{}", mint);
        self.cache.get_or_compute(&key, || {
            Pubkey::find_program_address(
                &[
                    seeds::METADATA,
                    self.metadata_program_id.as_ref(),
                    mint.as_ref(),
                ],
                &self.metadata_program_id,
            )
        })
    }

    /// Associated token account holding `mint` for `owner`
    pub fn associated_token(&self, owner: &Pubkey, mint: &Pubkey) -> Pubkey {
        let key = format!("associated_token:{}:{}", owner, mint);
        self.cache
            .get_or_compute(&key, || {
                (
                    spl_associated_token_account::get_associated_token_address(owner, mint),
                    0,
                )
            })
            .0
    }
}

impl Default for PdaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide builder for the metadata program
static SHARED: Lazy<PdaBuilder> = Lazy::new(PdaBuilder::new);

pub fn shared() -> &'static PdaBuilder {
    &SHARED
}

pub fn find_metadata_address(mint: &Pubkey) -> (Pubkey, u8) {
    shared().metadata(mint)
}

pub fn find_associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    shared().associated_token(owner, mint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_address_is_deterministic() {
        let mint = Pubkey::new_unique();
        let first = find_metadata_address(&mint);
        let second = find_metadata_address(&mint);
        assert_eq!(first, second);

        // A fresh builder has no cache to lean on
        let other_builder = PdaBuilder::new();
        assert_eq!(other_builder.metadata(&mint), first);
    }

    #[test]
    fn test_free_functions_share_one_cache() {
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let metadata_key = format!("metadata:{}", mint);
        let token_key = format!("associated_token:{}:{}", owner, mint);
        assert!(!shared().cache.contains(&metadata_key));

        find_metadata_address(&mint);
        find_associated_token_address(&owner, &mint);

        assert!(shared().cache.contains(&metadata_key));
        assert!(shared().cache.contains(&token_key));
    }

    #[test]
    fn test_metadata_address_matches_metaplex() {
        for _ in 0..16 {
            let mint = Pubkey::new_unique();
            let expected = mpl_token_metadata::accounts::Metadata::find_pda(&mint);
            assert_eq!(find_metadata_address(&mint), expected);
        }
    }

    #[test]
    fn test_metadata_address_depends_on_mint() {
        let a = find_metadata_address(&Pubkey::new_unique()).0;
        let b = find_metadata_address(&Pubkey::new_unique()).0;
        assert_ne!(a, b);
    }

    #[test]
    fn test_associated_token_matches_spl() {
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        assert_eq!(
            find_associated_token_address(&owner, &mint),
            spl_associated_token_account::get_associated_token_address(&owner, &mint)
        );
    }
}
