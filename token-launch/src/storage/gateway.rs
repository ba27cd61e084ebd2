//! HTTP upload gateway backend
//!
//! The gateway accepts raw bytes at `POST {endpoint}/upload`, with the file's
//! `Content-Type`, and answers with `{"id": "<content id>"}`. Content is then
//! served at `{gateway_url}/{id}`. Funding and signing for the storage network
//! behind the gateway are the gateway's concern; both URLs must be configured.

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{AssetUploader, UploadFile};
use crate::{
    config::LaunchConfig,
    core::{LaunchError, UploadError},
};

#[derive(Debug, Deserialize)]
struct UploadResponse {
    id: String,
}

pub struct GatewayUploader {
    client: Client,
    endpoint: String,
    gateway_url: String,
}

impl GatewayUploader {
    pub fn new(endpoint: &str, gateway_url: &str, timeout: Duration) -> Result<Self, UploadError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            gateway_url: gateway_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &LaunchConfig) -> Result<Self, LaunchError> {
        Ok(Self::new(
            config.storage_endpoint()?,
            config.gateway_url()?,
            config.upload_timeout(),
        )?)
    }

    pub fn upload_url(&self) -> String {
        format!("{}/upload", self.endpoint)
    }

    pub fn content_uri(&self, id: &str) -> String {
        format!("{}/{}", self.gateway_url, id)
    }
}

#[async_trait]
impl AssetUploader for GatewayUploader {
    async fn upload(&self, file: &UploadFile) -> Result<String, UploadError> {
        debug!(
            "Uploading {} ({} bytes, {}) to {}",
            file.name,
            file.bytes.len(),
            file.content_type,
            self.endpoint
        );

        let response = self
            .client
            .post(self.upload_url())
            .header(CONTENT_TYPE, file.content_type.as_str())
            .body(file.bytes.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;
        if parsed.id.trim().is_empty() {
            return Err(UploadError::InvalidResponse(
                "gateway returned an empty content id".to_string(),
            ));
        }

        Ok(self.content_uri(&parsed.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        sync::oneshot,
    };

    /// Captured request: content type header and body
    type Captured = (Option<String>, Vec<u8>);

    /// One-shot HTTP server answering a single request with `status` and `body`
    async fn serve_once(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buffer = Vec::new();
            let mut chunk = [0u8; 1024];

            let header_end = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    return;
                }
                buffer.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };

            let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
            let header = |name: &str| {
                head.lines().find_map(|line| {
                    let (key, value) = line.split_once(':')?;
                    key.eq_ignore_ascii_case(name).then(|| value.trim().to_string())
                })
            };
            let content_length: usize = header("content-length")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);

            while buffer.len() < header_end + content_length {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buffer.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = tx.send((header("content-type"), buffer[header_end..].to_vec()));
        });

        (format!("http://{}", address), rx)
    }

    fn uploader(endpoint: &str) -> GatewayUploader {
        GatewayUploader::new(endpoint, "https://gateway.example/", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_from_config_requires_storage_settings() {
        let result = GatewayUploader::from_config(&LaunchConfig::default());
        assert!(matches!(
            result,
            Err(LaunchError::Config(crate::core::ConfigError::InvalidValue(_)))
        ));

        let config = LaunchConfig::default()
            .with_storage_endpoint("https://node.example/".to_string())
            .with_gateway_url("https://gateway.example".to_string());
        let uploader = GatewayUploader::from_config(&config).unwrap();
        assert_eq!(uploader.upload_url(), "https://node.example/upload");
    }

    #[test]
    fn test_urls_are_normalised() {
        let uploader = uploader("https://node.example/");
        assert_eq!(uploader.upload_url(), "https://node.example/upload");
        assert_eq!(uploader.content_uri("abc"), "https://gateway.example/abc");
    }

    #[tokio::test]
    async fn test_upload_returns_gateway_uri() {
        let (endpoint, captured) = serve_once("200 OK", r#"{"id":"content123"}"#).await;
        let file = UploadFile::new("logo.png", "image/png", vec![1, 2, 3, 4]);

        let uri = uploader(&endpoint).upload(&file).await.unwrap();
        assert_eq!(uri, "https://gateway.example/content123");

        let (content_type, body) = captured.await.unwrap();
        assert_eq!(content_type.as_deref(), Some("image/png"));
        assert_eq!(body, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_quota_rejection() {
        let (endpoint, _captured) = serve_once("402 Payment Required", r#"{"error":"quota"}"#).await;
        let file = UploadFile::new("logo.png", "image/png", vec![0; 16]);

        match uploader(&endpoint).upload(&file).await {
            Err(UploadError::Rejected { status, body }) => {
                assert_eq!(status, 402);
                assert!(body.contains("quota"));
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let (endpoint, _captured) = serve_once("200 OK", r#"{"unexpected":true}"#).await;
        let file = UploadFile::new("metadata.json", "application/json", b"{}".to_vec());

        let result = uploader(&endpoint).upload(&file).await;
        assert!(matches!(result, Err(UploadError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        // Bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);

        let file = UploadFile::new("logo.png", "image/png", vec![0; 4]);
        let result = uploader(&format!("http://{}", address)).upload(&file).await;
        assert!(matches!(result, Err(UploadError::Transport(_))));
    }
}
