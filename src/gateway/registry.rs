//! Keyed registry of per-network JSON-RPC clients.
//!
//! Clients are created on first use from the configured endpoints and reused
//! for every later call on the same network. The registry is owned by the
//! gateway that built it and goes away with it.

use super::rpc::RpcClient;
use super::GatewayError;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Registry statistics for monitoring.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RegistryStats {
    /// Lookups served by an existing client.
    pub reused: u64,
    /// Clients created.
    pub created: u64,
    /// Lookups for networks with no endpoint.
    pub unknown: u64,
}

/// Network identifier to RPC client map.
pub struct ClientRegistry {
    endpoints: BTreeMap<String, String>,
    http: reqwest::Client,
    clients: RwLock<HashMap<String, Arc<RpcClient>>>,
    stats: Mutex<RegistryStats>,
}

impl ClientRegistry {
    /// Create a registry over the given endpoints, sharing one HTTP client.
    #[must_use]
    pub fn new(endpoints: BTreeMap<String, String>, http: reqwest::Client) -> Self {
        Self {
            endpoints,
            http,
            clients: RwLock::new(HashMap::new()),
            stats: Mutex::new(RegistryStats::default()),
        }
    }

    /// Client for `network`, created on first use.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnknownNetwork`] if no endpoint is configured.
    pub fn client(&self, network: &str) -> Result<Arc<RpcClient>, GatewayError> {
        if let Some(client) = self.clients.read().get(network) {
            self.stats.lock().reused += 1;
            return Ok(Arc::clone(client));
        }

        let Some(url) = self.endpoints.get(network) else {
            self.stats.lock().unknown += 1;
            return Err(GatewayError::UnknownNetwork(network.to_string()));
        };

        let mut clients = self.clients.write();
        // Another caller may have raced us between the read and write locks.
        if let Some(client) = clients.get(network) {
            self.stats.lock().reused += 1;
            return Ok(Arc::clone(client));
        }

        debug!("Creating RPC client for {network} at {url}");
        let client = Arc::new(RpcClient::new(self.http.clone(), url.clone()));
        clients.insert(network.to_string(), Arc::clone(&client));
        self.stats.lock().created += 1;
        Ok(client)
    }

    /// Whether an endpoint is configured for `network`.
    #[must_use]
    pub fn supports(&self, network: &str) -> bool {
        self.endpoints.contains_key(network)
    }

    /// Configured network identifiers.
    pub fn networks(&self) -> impl Iterator<Item = &str> {
        self.endpoints.keys().map(String::as_str)
    }

    /// Number of clients created so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.read().len()
    }

    /// Check if no client has been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.read().is_empty()
    }

    /// Get current registry statistics.
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        self.stats.lock().clone()
    }
}
