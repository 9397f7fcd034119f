//! Error types for sui-exact-facilitator.
//!
//! Verification and settlement never return these: every failure on those paths
//! is folded into a [`crate::VerifyResult`] or [`crate::SettleResult`]. `Error`
//! covers construction, configuration and I/O around the facilitator.

use crate::gateway::GatewayError;
use thiserror::Error;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur outside the verify/settle boundary.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Chain gateway error.
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}
