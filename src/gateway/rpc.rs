//! [`ChainGateway`] over the Sui JSON-RPC API.
//!
//! - simulation: `sui_dryRunTransactionBlock`
//! - broadcast: `sui_executeTransactionBlock`
//! - finality: poll `sui_getTransactionBlock` until the digest is known
//!
//! Signature recovery runs locally (see [`super::signature`]); the node is
//! only needed for chain state.

use super::registry::ClientRegistry;
use super::signature::recover_signer;
use super::{ChainGateway, GatewayError};
use crate::config::{FacilitatorConfig, FinalityConfig};
use crate::error::{Error, Result};
use crate::types::{BalanceChange, EffectStatus, SimulationOutcome, TransactionSignatures};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// JSON-RPC client bound to one node endpoint.
#[derive(Debug)]
pub struct RpcClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

#[derive(Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

impl RpcClient {
    /// Create a client for `url`.
    #[must_use]
    pub fn new(http: reqwest::Client, url: String) -> Self {
        Self {
            http,
            url,
            next_id: AtomicU64::new(1),
        }
    }

    /// Endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Call `method` and decode its result.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Transport`] if no response arrives,
    /// [`GatewayError::Rpc`] for JSON-RPC errors and [`GatewayError::Decode`]
    /// if the result has an unexpected shape.
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> std::result::Result<T, GatewayError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!("RPC {method} -> {}", self.url);
        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let text = response.text().await?;

        let envelope: RpcEnvelope =
            serde_json::from_str(&text).map_err(|e| GatewayError::Decode(e.to_string()))?;
        if let Some(error) = envelope.error {
            return Err(GatewayError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        let result = envelope
            .result
            .ok_or_else(|| GatewayError::Decode(format!("{method}: response has no result")))?;
        serde_json::from_value(result).map_err(|e| GatewayError::Decode(format!("{method}: {e}")))
    }
}

/// Sui JSON-RPC gateway for every configured network.
pub struct JsonRpcGateway {
    registry: ClientRegistry,
    finality: FinalityConfig,
    signers: Vec<String>,
}

impl JsonRpcGateway {
    /// Build a gateway from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &FacilitatorConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.rpc.request_timeout())
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        let registry = ClientRegistry::new(config.networks.clone(), http);
        info!(
            "JSON-RPC gateway initialized for {}",
            registry.networks().collect::<Vec<_>>().join(", ")
        );

        Ok(Self {
            registry,
            finality: config.finality.clone(),
            signers: config.signer_addresses.clone(),
        })
    }

    /// The per-network client registry.
    #[must_use]
    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }
}

#[async_trait]
impl ChainGateway for JsonRpcGateway {
    async fn verify_signature(
        &self,
        transaction: &[u8],
        signature: &str,
        network: &str,
    ) -> std::result::Result<String, GatewayError> {
        if !self.registry.supports(network) {
            return Err(GatewayError::UnknownNetwork(network.to_string()));
        }
        Ok(recover_signer(transaction, signature)?)
    }

    async fn simulate_transaction(
        &self,
        transaction: &[u8],
        network: &str,
    ) -> std::result::Result<SimulationOutcome, GatewayError> {
        let client = self.registry.client(network)?;
        let response: Value = client
            .call("sui_dryRunTransactionBlock", json!([BASE64.encode(transaction)]))
            .await?;
        parse_dry_run(response)
    }

    async fn broadcast(
        &self,
        transaction: &[u8],
        signatures: &TransactionSignatures,
        network: &str,
    ) -> std::result::Result<String, GatewayError> {
        let client = self.registry.client(network)?;
        let response: Value = client
            .call(
                "sui_executeTransactionBlock",
                json!([
                    BASE64.encode(transaction),
                    signatures.to_vec(),
                    { "showEffects": true },
                    "WaitForLocalExecution",
                ]),
            )
            .await?;
        parse_executed(response)
    }

    async fn wait_for_finality(&self, digest: &str, network: &str) -> std::result::Result<(), GatewayError> {
        let client = self.registry.client(network)?;
        let started = Instant::now();
        // A timeout too large to represent means no deadline.
        let deadline = started.checked_add(self.finality.timeout());

        loop {
            let lookup: std::result::Result<Value, GatewayError> = client
                .call(
                    "sui_getTransactionBlock",
                    json!([digest, { "showEffects": true }]),
                )
                .await;

            match lookup {
                Ok(block) => {
                    let executed = parse_executed(block)?;
                    debug!("Transaction {executed} final after {:?}", started.elapsed());
                    return Ok(());
                }
                Err(e) => debug!("Transaction {digest} not yet visible: {e}"),
            }

            if deadline_passed(Instant::now(), self.finality.poll_interval(), deadline) {
                warn!("Gave up waiting for {digest} on {network}");
                return Err(GatewayError::FinalityTimeout {
                    digest: digest.to_string(),
                    waited: started.elapsed(),
                });
            }
            tokio::time::sleep(self.finality.poll_interval()).await;
        }
    }

    fn signing_addresses(&self) -> Vec<String> {
        self.signers.clone()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DryRunResponse {
    effects: EffectsWire,
    #[serde(default)]
    balance_changes: Vec<BalanceChange>,
}

#[derive(Deserialize)]
struct EffectsWire {
    status: StatusWire,
}

#[derive(Deserialize)]
struct StatusWire {
    status: String,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ExecutedResponse {
    digest: String,
    #[serde(default)]
    effects: Option<EffectsWire>,
}

impl From<StatusWire> for EffectStatus {
    fn from(wire: StatusWire) -> Self {
        if wire.status == "success" {
            Self::Success
        } else {
            Self::Failure(wire.error.unwrap_or(wire.status))
        }
    }
}

/// Whether the poll after `now` would land past `deadline`.
fn deadline_passed(now: Instant, poll_interval: Duration, deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|deadline| {
        !now
            .checked_add(poll_interval)
            .is_some_and(|next_poll| next_poll <= deadline)
    })
}

/// Decode a `sui_dryRunTransactionBlock` result.
fn parse_dry_run(response: Value) -> std::result::Result<SimulationOutcome, GatewayError> {
    let dry_run: DryRunResponse = serde_json::from_value(response)
        .map_err(|e| GatewayError::Decode(format!("dry run: {e}")))?;
    Ok(SimulationOutcome {
        status: dry_run.effects.status.into(),
        balance_changes: dry_run.balance_changes,
    })
}

/// Decode an executed transaction block, failing if its effects aborted.
fn parse_executed(response: Value) -> std::result::Result<String, GatewayError> {
    let executed: ExecutedResponse = serde_json::from_value(response)
        .map_err(|e| GatewayError::Decode(format!("transaction block: {e}")))?;
    if let Some(effects) = executed.effects {
        if let EffectStatus::Failure(message) = EffectStatus::from(effects.status) {
            return Err(GatewayError::Execution(message));
        }
    }
    Ok(executed.digest)
}
