//! Signing identity loaded from a Solana CLI keypair file

use solana_sdk::signature::{keypair_from_seed, read_keypair, Keypair, Signer};
use std::fs::File;
use tracing::debug;

use crate::core::ConfigError;

/// Expand a leading `~` to `$HOME`
pub fn expand_path(path: &str) -> Result<String, ConfigError> {
    if path.starts_with('~') {
        let home = std::env::var("HOME").map_err(|_| {
            ConfigError::InvalidValue("HOME environment variable not set".to_string())
        })?;
        Ok(path.replacen('~', &home, 1))
    } else {
        Ok(path.to_string())
    }
}

/// Load a keypair from a file path, expanding ~ if needed
///
/// The file holds a JSON array of 64 bytes: the secret key followed by the
/// public key it derives.
pub fn load_keypair(path: &str) -> Result<Keypair, ConfigError> {
    let expanded_path = expand_path(path)?;
    let malformed = |reason: String| ConfigError::KeypairMalformed {
        path: expanded_path.clone(),
        reason,
    };

    let mut file = File::open(&expanded_path).map_err(|source| ConfigError::KeypairRead {
        path: expanded_path.clone(),
        source,
    })?;
    let keypair = read_keypair(&mut file).map_err(|e| malformed(e.to_string()))?;

    // The stored public half must be the one the secret derives
    let derived = keypair_from_seed(&keypair.to_bytes()[..32]).map_err(|e| malformed(e.to_string()))?;
    if derived.pubkey() != keypair.pubkey() {
        return Err(malformed("public key does not match secret key".to_string()));
    }

    debug!("Loaded identity {} from {}", keypair.pubkey(), expanded_path);
    Ok(keypair)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_keypair_file(dir: &TempDir, keypair: &Keypair) -> String {
        let path = dir.path().join("id.json");
        let json = serde_json::to_string(&keypair.to_bytes().to_vec()).unwrap();
        std::fs::write(&path, json).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_round_trip_preserves_public_key() {
        let temp_dir = TempDir::new().unwrap();
        for _ in 0..8 {
            let original = Keypair::new();
            let path = write_keypair_file(&temp_dir, &original);

            let loaded = load_keypair(&path).unwrap();
            assert_eq!(loaded.pubkey(), original.pubkey());
            assert_eq!(loaded.to_bytes(), original.to_bytes());
        }
    }

    #[test]
    fn test_missing_file() {
        let result = load_keypair("/nonexistent/keypair.json");
        assert!(matches!(result, Err(ConfigError::KeypairRead { .. })));
    }

    #[test]
    fn test_not_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("id.json");
        std::fs::write(&path, "definitely not json").unwrap();

        let result = load_keypair(path.to_str().unwrap());
        assert!(matches!(result, Err(ConfigError::KeypairMalformed { .. })));
    }

    #[test]
    fn test_wrong_length() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("id.json");
        std::fs::write(&path, "[1,2,3]").unwrap();

        match load_keypair(path.to_str().unwrap()) {
            Err(ConfigError::KeypairMalformed { path: reported, .. }) => {
                assert_eq!(reported, path.to_str().unwrap());
            }
            other => panic!("expected KeypairMalformed, got {:?}", other.map(|k| k.pubkey())),
        }
    }

    #[test]
    fn test_mismatched_public_half() {
        let temp_dir = TempDir::new().unwrap();
        let mut bytes = Keypair::new().to_bytes().to_vec();
        bytes[32..].copy_from_slice(&Keypair::new().pubkey().to_bytes());
        let path = temp_dir.path().join("id.json");
        std::fs::write(&path, serde_json::to_string(&bytes).unwrap()).unwrap();

        let result = load_keypair(path.to_str().unwrap());
        assert!(matches!(result, Err(ConfigError::KeypairMalformed { .. })));
    }

    #[test]
    fn test_expand_path_leaves_plain_paths() {
        assert_eq!(expand_path("./id.json").unwrap(), "./id.json");
    }
}
