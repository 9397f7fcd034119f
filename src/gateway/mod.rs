//! Chain capability consumed by the facilitator.
//!
//! The facilitator never talks to a node directly. Everything it needs from the
//! chain goes through [`ChainGateway`]:
//!
//! - signature recovery over unexecuted transaction bytes
//! - dry-run simulation returning effects status and balance changes
//! - broadcast of a pre-signed transaction and a finality wait
//! - the addresses the gateway could sign with (sponsorship advertising)
//!
//! Which signature algorithm a payer used is a gateway concern; the
//! verification engine only sees a recovered address or a
//! [`GatewayError::Signature`].

mod registry;
pub mod rpc;
pub mod signature;

pub use registry::{ClientRegistry, RegistryStats};
pub use rpc::JsonRpcGateway;
pub use signature::{recover_signer, SignatureError, SignatureScheme};

use crate::types::{SimulationOutcome, TransactionSignatures};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a [`ChainGateway`].
#[derive(Error, Debug, Clone)]
pub enum GatewayError {
    /// The signature could not be decoded or does not match the transaction.
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// No RPC endpoint is configured for the network.
    #[error("No endpoint configured for network {0}")]
    UnknownNetwork(String),

    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The node answered with a JSON-RPC error.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message from the node.
        message: String,
    },

    /// The node's answer could not be decoded.
    #[error("Malformed RPC response: {0}")]
    Decode(String),

    /// The transaction was executed and aborted.
    #[error("Transaction execution failed: {0}")]
    Execution(String),

    /// The digest did not become final in time.
    #[error("Transaction {digest} not final after {waited:?}")]
    FinalityTimeout {
        /// Digest being waited on.
        digest: String,
        /// How long the gateway waited.
        waited: Duration,
    },
}

impl GatewayError {
    /// Returns true if the failure originates in signature handling.
    #[must_use]
    pub const fn is_signature_failure(&self) -> bool {
        matches!(self, Self::Signature(_))
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

/// Chain operations the facilitator depends on.
///
/// Implementations must be safe to call concurrently: the verification engine
/// runs `verify_signature` and `simulate_transaction` for the same payload at
/// the same time.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Recover the signer address of `transaction` from a serialized signature.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Signature`] if the signature is malformed, uses an
    /// unsupported scheme or does not verify.
    async fn verify_signature(
        &self,
        transaction: &[u8],
        signature: &str,
        network: &str,
    ) -> Result<String, GatewayError>;

    /// Dry-run `transaction` against current chain state.
    ///
    /// # Errors
    ///
    /// Returns an error if the simulation could not be performed. An aborted
    /// execution is not an error; it is reported in the outcome's status.
    async fn simulate_transaction(
        &self,
        transaction: &[u8],
        network: &str,
    ) -> Result<SimulationOutcome, GatewayError>;

    /// Submit a pre-signed transaction and return its digest.
    ///
    /// # Errors
    ///
    /// Returns an error if the node rejects or fails to execute the transaction.
    async fn broadcast(
        &self,
        transaction: &[u8],
        signatures: &TransactionSignatures,
        network: &str,
    ) -> Result<String, GatewayError>;

    /// Block until `digest` is durably included.
    ///
    /// # Errors
    ///
    /// Returns an error if finality cannot be confirmed.
    async fn wait_for_finality(&self, digest: &str, network: &str) -> Result<(), GatewayError>;

    /// Addresses this gateway can sign with.
    fn signing_addresses(&self) -> Vec<String>;
}
