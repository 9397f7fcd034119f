//! Configuration for sui-exact-facilitator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Facilitator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilitatorConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Gas station endpoint advertised to clients, if sponsorship is offered.
    #[serde(default)]
    pub gas_station_url: Option<String>,

    /// Addresses the facilitator can sign with (sponsorship only).
    #[serde(default)]
    pub signer_addresses: Vec<String>,

    /// JSON-RPC endpoint per CAIP-2 network identifier.
    #[serde(default = "default_networks")]
    pub networks: BTreeMap<String, String>,

    /// RPC client configuration.
    #[serde(default)]
    pub rpc: RpcConfig,

    /// Finality wait configuration.
    #[serde(default)]
    pub finality: FinalityConfig,
}

/// RPC client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Timeout for a single JSON-RPC request in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// How long and how often to poll for a broadcast transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalityConfig {
    /// Give up after this many seconds.
    #[serde(default = "default_finality_timeout")]
    pub timeout_secs: u64,

    /// Delay between polls in milliseconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_millis: u64,
}

impl Default for FacilitatorConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            gas_station_url: None,
            signer_addresses: Vec::new(),
            networks: default_networks(),
            rpc: RpcConfig::default(),
            finality: FinalityConfig::default(),
        }
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for FinalityConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_finality_timeout(),
            poll_interval_millis: default_poll_interval(),
        }
    }
}

impl RpcConfig {
    /// Request timeout as a `Duration`.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl FinalityConfig {
    /// Overall finality timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Delay between polls.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_millis)
    }
}

fn default_networks() -> BTreeMap<String, String> {
    [
        ("sui:mainnet", "https://fullnode.mainnet.sui.io:443"),
        ("sui:testnet", "https://fullnode.testnet.sui.io:443"),
        ("sui:devnet", "https://fullnode.devnet.sui.io:443"),
        ("sui:localnet", "http://127.0.0.1:9000"),
    ]
    .into_iter()
    .map(|(network, url)| (network.to_string(), url.to_string()))
    .collect()
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_request_timeout() -> u64 {
    30
}

const fn default_finality_timeout() -> u64 {
    60
}

const fn default_poll_interval() -> u64 {
    2_000
}

impl FacilitatorConfig {
    /// RPC endpoint configured for `network`.
    #[must_use]
    pub fn endpoint(&self, network: &str) -> Option<&str> {
        self.networks.get(network).map(String::as_str)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn to_file(&self, path: &std::path::Path) -> crate::Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
