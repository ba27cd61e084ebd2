//! Launch configuration: cluster selection, endpoints, identity and logging

use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use std::{fmt, str::FromStr, time::Duration};

use crate::core::{
    ConfigError, DEFAULT_KEYPAIR_PATH, DEFAULT_RPC_TIMEOUT_SECS, DEFAULT_UPLOAD_TIMEOUT_SECS,
    DEVNET_RPC_URL, EXPLORER_URL, MAINNET_RPC_URL,
};

/// Ledger environment a launch targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cluster {
    #[default]
    #[serde(rename = "devnet")]
    Devnet,
    #[serde(rename = "mainnet-beta")]
    MainnetBeta,
}

impl Cluster {
    /// The single test/production switch
    pub fn from_mainnet_flag(mainnet: bool) -> Self {
        if mainnet {
            Cluster::MainnetBeta
        } else {
            Cluster::Devnet
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Cluster::Devnet => "devnet",
            Cluster::MainnetBeta => "mainnet-beta",
        }
    }

    pub fn rpc_url(&self) -> &'static str {
        match self {
            Cluster::Devnet => DEVNET_RPC_URL,
            Cluster::MainnetBeta => MAINNET_RPC_URL,
        }
    }

    /// Explorer query string; mainnet is the explorer default
    fn explorer_suffix(&self) -> String {
        match self {
            Cluster::Devnet => format!("?cluster={}", self.as_str()),
            Cluster::MainnetBeta => String::new(),
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cluster {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "devnet" => Ok(Cluster::Devnet),
            "mainnet" | "mainnet-beta" => Ok(Cluster::MainnetBeta),
            other => Err(ConfigError::InvalidValue(format!("unknown cluster '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LaunchConfig {
    pub network: NetworkConfig,
    pub storage: StorageConfig,
    pub identity: IdentityConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub cluster: Cluster,
    /// Overrides the cluster's public endpoint
    pub rpc_url: Option<String>,
    pub commitment: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Upload gateway base URL; receives `POST {endpoint}/upload`
    pub endpoint: Option<String>,
    /// Base URL uploaded content is served from, as `{gateway_url}/{id}`
    pub gateway_url: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub keypair_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            cluster: Cluster::Devnet,
            rpc_url: None,
            commitment: "confirmed".to_string(),
            timeout_secs: DEFAULT_RPC_TIMEOUT_SECS,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            gateway_url: None,
            timeout_secs: DEFAULT_UPLOAD_TIMEOUT_SECS,
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            keypair_path: DEFAULT_KEYPAIR_PATH.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl LaunchConfig {
    pub fn for_cluster(cluster: Cluster) -> Self {
        let mut config = Self::default();
        config.network.cluster = cluster;
        config
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::FileParse {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        config.validate_values()?;

        Ok(config)
    }

    pub fn with_rpc_url(mut self, url: String) -> Self {
        self.network.rpc_url = Some(url);
        self
    }

    pub fn with_storage_endpoint(mut self, url: String) -> Self {
        self.storage.endpoint = Some(url);
        self
    }

    pub fn with_gateway_url(mut self, url: String) -> Self {
        self.storage.gateway_url = Some(url);
        self
    }

    pub fn with_keypair_path(mut self, path: String) -> Self {
        self.identity.keypair_path = path;
        self
    }

    pub fn cluster(&self) -> Cluster {
        self.network.cluster
    }

    pub fn rpc_url(&self) -> String {
        self.network
            .rpc_url
            .clone()
            .unwrap_or_else(|| self.network.cluster.rpc_url().to_string())
    }

    /// Upload endpoint; there is no default
    pub fn storage_endpoint(&self) -> Result<&str, ConfigError> {
        self.storage.endpoint.as_deref().ok_or_else(|| {
            ConfigError::InvalidValue(
                "storage.endpoint is required (config file or --storage-endpoint)".to_string(),
            )
        })
    }

    /// Content gateway; there is no default
    pub fn gateway_url(&self) -> Result<&str, ConfigError> {
        self.storage.gateway_url.as_deref().ok_or_else(|| {
            ConfigError::InvalidValue(
                "storage.gateway_url is required (config file or --gateway-url)".to_string(),
            )
        })
    }

    pub fn commitment(&self) -> Result<CommitmentConfig, ConfigError> {
        let commitment = CommitmentLevel::from_str(&self.network.commitment).map_err(|_| {
            ConfigError::InvalidValue(format!("unknown commitment '{}'", self.network.commitment))
        })?;
        Ok(CommitmentConfig { commitment })
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.network.timeout_secs)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.storage.timeout_secs)
    }

    pub fn explorer_tx_url(&self, signature: &str) -> String {
        format!(
            "{}/tx/{}{}",
            EXPLORER_URL,
            signature,
            self.network.cluster.explorer_suffix()
        )
    }

    pub fn explorer_address_url(&self, address: &str) -> String {
        format!(
            "{}/address/{}{}",
            EXPLORER_URL,
            address,
            self.network.cluster.explorer_suffix()
        )
    }

    /// Validate every value that is set; storage settings may still be missing
    pub fn validate_values(&self) -> Result<(), ConfigError> {
        let mut urls = vec![("network.rpc_url", self.rpc_url())];
        if let Some(endpoint) = &self.storage.endpoint {
            urls.push(("storage.endpoint", endpoint.clone()));
        }
        if let Some(gateway_url) = &self.storage.gateway_url {
            urls.push(("storage.gateway_url", gateway_url.clone()));
        }
        for (label, url) in urls {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidValue(format!(
                    "{} must be an http(s) URL, got '{}'",
                    label, url
                )));
            }
        }
        if self.network.timeout_secs == 0 || self.storage.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        if self.identity.keypair_path.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "identity.keypair_path cannot be empty".to_string(),
            ));
        }
        self.commitment()?;
        Ok(())
    }

    /// Validate configuration for a launch
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_values()?;
        self.storage_endpoint()?;
        self.gateway_url()?;
        Ok(())
    }
}
