//! Asset upload to content-addressed storage

pub mod gateway;

use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::{
    core::{ConfigError, UploadError},
    metadata::{content_type_for, validate_uri, OffChainMetadata, TokenMetadata},
};

pub use gateway::GatewayUploader;

/// A file ready for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a local file verbatim
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let bytes = std::fs::read(path).map_err(|source| ConfigError::ImageRead {
            path: path.display().to_string(),
            source,
        })?;
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("image")
            .to_string();

        Ok(Self::new(name, content_type_for(path), bytes))
    }

    pub fn json<T: Serialize>(name: impl Into<String>, value: &T) -> Result<Self, UploadError> {
        let bytes =
            serde_json::to_vec(value).map_err(|e| UploadError::Serialization(e.to_string()))?;
        Ok(Self::new(name, "application/json", bytes))
    }
}

/// Storage backend that publishes one file and returns its URI
#[async_trait]
pub trait AssetUploader: Send + Sync {
    async fn upload(&self, file: &UploadFile) -> Result<String, UploadError>;
}

/// URIs produced by a successful asset upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedAssets {
    pub image_uri: String,
    pub metadata_uri: String,
    pub document: OffChainMetadata,
}

/// Upload the image, then the metadata document that points at it.
/// The document is never uploaded if the image upload fails, and the
/// document URI must fit the on-chain metadata record.
pub async fn upload_assets(
    uploader: &dyn AssetUploader,
    image: &UploadFile,
    metadata: &TokenMetadata,
) -> Result<UploadedAssets, UploadError> {
    let image_uri = uploader.upload(image).await?;
    info!("Uploaded image URI: {}", image_uri);

    let document = metadata.to_off_chain(&image_uri);
    let document_file = UploadFile::json("metadata.json", &document)?;
    let metadata_uri = uploader.upload(&document_file).await?;
    validate_uri(&metadata_uri)
        .map_err(|e| UploadError::InvalidResponse(format!("metadata URI {}: {}", metadata_uri, e)))?;
    info!("Uploaded metadata URI: {}", metadata_uri);

    Ok(UploadedAssets {
        image_uri,
        metadata_uri,
        document,
    })
}
