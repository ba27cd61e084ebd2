//! Token metadata: the off-chain JSON document and the on-chain record

use mpl_token_metadata::types::DataV2;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::{ConfigError, MAX_NAME_LENGTH, MAX_SYMBOL_LENGTH, MAX_URI_LENGTH};

/// Descriptive fields supplied by the operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub description: String,
}

/// JSON document uploaded to storage and referenced by the on-chain URI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffChainMetadata {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub image: String,
}

impl TokenMetadata {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            description: description.into(),
        }
    }

    /// Check the fields fit the metadata program's limits
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::InvalidMetadata("name cannot be empty".to_string()));
        }
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::InvalidMetadata("symbol cannot be empty".to_string()));
        }
        if self.name.len() > MAX_NAME_LENGTH {
            return Err(ConfigError::InvalidMetadata(format!(
                "name is {} bytes, limit is {}",
                self.name.len(),
                MAX_NAME_LENGTH
            )));
        }
        if self.symbol.len() > MAX_SYMBOL_LENGTH {
            return Err(ConfigError::InvalidMetadata(format!(
                "symbol is {} bytes, limit is {}",
                self.symbol.len(),
                MAX_SYMBOL_LENGTH
            )));
        }
        Ok(())
    }

    pub fn to_off_chain(&self, image_uri: &str) -> OffChainMetadata {
        OffChainMetadata {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            description: self.description.clone(),
            image: image_uri.to_string(),
        }
    }

    /// On-chain record: no royalty, no creators, no collection, no uses
    pub fn to_data_v2(&self, uri: &str) -> Result<DataV2, ConfigError> {
        validate_uri(uri)?;
        Ok(DataV2 {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            uri: uri.to_string(),
            seller_fee_basis_points: 0,
            creators: None,
            collection: None,
            uses: None,
        })
    }
}

pub fn validate_uri(uri: &str) -> Result<(), ConfigError> {
    if uri.len() > MAX_URI_LENGTH {
        return Err(ConfigError::InvalidMetadata(format!(
            "uri is {} bytes, limit is {}",
            uri.len(),
            MAX_URI_LENGTH
        )));
    }
    Ok(())
}

/// MIME type for an image, from its file extension
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn club_coin() -> TokenMetadata {
        TokenMetadata::new(
            "Club Coin",
            "$CLUB",
            "$CLUB Coin is the official currency of the Kurabu ecosystem.",
        )
    }

    #[test]
    fn test_valid_metadata() {
        assert!(club_coin().validate().is_ok());
    }

    #[test]
    fn test_limits() {
        let mut metadata = club_coin();
        metadata.name = "x".repeat(MAX_NAME_LENGTH + 1);
        assert!(matches!(metadata.validate(), Err(ConfigError::InvalidMetadata(_))));

        let mut metadata = club_coin();
        metadata.symbol = "TOOLONGSYMBOL".to_string();
        assert!(matches!(metadata.validate(), Err(ConfigError::InvalidMetadata(_))));

        let mut metadata = club_coin();
        metadata.name = "   ".to_string();
        assert!(metadata.validate().is_err());
    }

    #[test]
    fn test_off_chain_document_shape() {
        let document = club_coin().to_off_chain("https://gateway.example/abc");
        let json = serde_json::to_value(&document).unwrap();
        assert_eq!(json["name"], "Club Coin");
        assert_eq!(json["symbol"], "$CLUB");
        assert_eq!(json["image"], "https://gateway.example/abc");
        assert_eq!(json.as_object().unwrap().len(), 4);
    }

    #[test]
    fn test_data_v2_fields() {
        let data = club_coin().to_data_v2("https://gateway.example/meta").unwrap();
        assert_eq!(data.name, "Club Coin");
        assert_eq!(data.symbol, "$CLUB");
        assert_eq!(data.uri, "https://gateway.example/meta");
        assert_eq!(data.seller_fee_basis_points, 0);
        assert!(data.creators.is_none());
        assert!(data.collection.is_none());
        assert!(data.uses.is_none());
    }

    #[test]
    fn test_data_v2_rejects_long_uri() {
        let uri = format!("https://gateway.example/{}", "a".repeat(MAX_URI_LENGTH));
        assert!(club_coin().to_data_v2(&uri).is_err());
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for(Path::new("assets/logo.png")), "image/png");
        assert_eq!(content_type_for(Path::new("logo.JPEG")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("logo.svg")), "image/svg+xml");
        assert_eq!(content_type_for(Path::new("logo")), "application/octet-stream");
    }
}
