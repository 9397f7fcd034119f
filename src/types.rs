//! Data exchanged between payer, resource server and facilitator.
//!
//! JSON field names follow the x402 wire format (camelCase). Amounts are decimal
//! strings on the wire and arbitrary-precision integers in memory.

use num_bigint::{BigInt, BigUint};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a resource server requires to be paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirements {
    /// Mechanism tag, `exact` for this crate.
    pub scheme: String,
    /// CAIP-2 network identifier, e.g. `sui:mainnet`.
    pub network: String,
    /// Coin type of the required asset, e.g. `0x2::sui::SUI`.
    pub asset: String,
    /// Minimum amount in the asset's smallest unit.
    #[serde(with = "decimal_string")]
    pub amount: BigUint,
    /// Recipient address.
    pub pay_to: String,
    /// Advisory expiry hint.
    ///
    /// Not enforced: Sui transactions expire by epoch rather than wall-clock
    /// time, so hosts that rely on this value must enforce it themselves.
    pub max_timeout_seconds: u64,
    /// Scheme-specific extra data, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

/// The `{scheme, network}` pair a payer committed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedKind {
    /// Mechanism tag.
    pub scheme: String,
    /// CAIP-2 network identifier.
    pub network: String,
}

/// Scheme body of an `exact` Sui payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactSuiPayload {
    /// Base64 serialized signature (`flag || signature || public key`).
    #[serde(default)]
    pub signature: String,
    /// Base64 BCS transaction bytes, signed but not executed.
    #[serde(default)]
    pub transaction: String,
}

/// A signed, unbroadcast payment produced by the payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    /// Protocol version.
    #[serde(default = "default_x402_version")]
    pub x402_version: u8,
    /// What the payer committed to.
    pub accepted: AcceptedKind,
    /// Signed transaction.
    pub payload: ExactSuiPayload,
}

const fn default_x402_version() -> u8 {
    2
}

/// Closed taxonomy of verification and settlement failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    /// Payload or requirements name a different scheme.
    UnsupportedScheme,
    /// Payload and requirements disagree on the network.
    NetworkMismatch,
    /// Transaction or signature missing or undecodable.
    MalformedPayload,
    /// Signer could not be recovered from the signature.
    SignatureVerificationFailed,
    /// The dry-run could not be performed.
    SimulationFailed,
    /// The dry-run ran and the transaction aborted.
    DryRunFailed,
    /// No address-owned balance change for the recipient.
    RecipientMismatch,
    /// The recipient received a different coin type.
    AssetMismatch,
    /// The recipient received less than required.
    AmountInsufficient,
    /// Settlement re-verification failed without a specific reason.
    VerificationFailed,
    /// Broadcast or finality wait failed.
    TransactionFailed,
}

impl InvalidReason {
    /// Wire name of the reason.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UnsupportedScheme => "unsupported_scheme",
            Self::NetworkMismatch => "network_mismatch",
            Self::MalformedPayload => "malformed_payload",
            Self::SignatureVerificationFailed => "signature_verification_failed",
            Self::SimulationFailed => "simulation_failed",
            Self::DryRunFailed => "dry_run_failed",
            Self::RecipientMismatch => "recipient_mismatch",
            Self::AssetMismatch => "asset_mismatch",
            Self::AmountInsufficient => "amount_insufficient",
            Self::VerificationFailed => "verification_failed",
            Self::TransactionFailed => "transaction_failed",
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a verification call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResult {
    /// Whether the payload satisfies the requirements.
    pub is_valid: bool,
    /// Why the payload was rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_reason: Option<InvalidReason>,
    /// Free-text diagnostic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_message: Option<String>,
    /// Recovered signer, present whenever signature recovery succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
}

impl VerifyResult {
    /// A passing verdict. A valid result always names its payer.
    #[must_use]
    pub fn valid(payer: impl Into<String>) -> Self {
        Self {
            is_valid: true,
            invalid_reason: None,
            invalid_message: None,
            payer: Some(payer.into()),
        }
    }

    /// A failing verdict with no payer.
    #[must_use]
    pub fn invalid(reason: InvalidReason) -> Self {
        Self {
            is_valid: false,
            invalid_reason: Some(reason),
            invalid_message: None,
            payer: None,
        }
    }

    /// Attach a diagnostic message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.invalid_message = Some(message.into());
        self
    }

    /// Attach the recovered payer.
    #[must_use]
    pub fn with_payer(mut self, payer: impl Into<String>) -> Self {
        self.payer = Some(payer.into());
        self
    }
}

/// Terminal outcome of a settlement attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleResult {
    /// Whether the transaction was broadcast and reached finality.
    pub success: bool,
    /// Transaction digest, empty on failure.
    pub transaction: String,
    /// Network the payment was settled on.
    pub network: String,
    /// Payer recovered during re-verification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
    /// Why settlement failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<InvalidReason>,
    /// Free-text diagnostic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl SettleResult {
    /// A settled payment. Callers must pass a non-empty digest.
    #[must_use]
    pub fn success(digest: impl Into<String>, network: impl Into<String>, payer: Option<String>) -> Self {
        Self {
            success: true,
            transaction: digest.into(),
            network: network.into(),
            payer,
            error_reason: None,
            error_message: None,
        }
    }

    /// A failed settlement.
    #[must_use]
    pub fn failure(reason: InvalidReason, network: impl Into<String>, payer: Option<String>) -> Self {
        Self {
            success: false,
            transaction: String::new(),
            network: network.into(),
            payer,
            error_reason: Some(reason),
            error_message: None,
        }
    }

    /// Attach a diagnostic message.
    #[must_use]
    pub fn with_message(mut self, message: Option<String>) -> Self {
        self.error_message = message;
        self
    }
}

/// Ownership of an object or balance after execution.
///
/// Only [`Owner::AddressOwner`] can be the destination of a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OwnerWire")]
pub enum Owner {
    /// Owned by a plain account address.
    AddressOwner(String),
    /// Owned by another object.
    ObjectOwner(String),
    /// Shared object.
    Shared {
        /// Version at which the object became shared.
        initial_shared_version: u64,
    },
    /// Frozen object.
    Immutable,
    /// An ownership kind the node reports that is not modeled here, by tag.
    Unknown(String),
}

impl Owner {
    /// The owning address, for address-owned entries only.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        match self {
            Self::AddressOwner(address) => Some(address),
            Self::ObjectOwner(_) | Self::Shared { .. } | Self::Immutable | Self::Unknown(_) => None,
        }
    }
}

/// Owner as found in node responses; new owner kinds must not fail the decode.
#[derive(Deserialize)]
#[serde(untagged)]
enum OwnerWire {
    Known(KnownOwner),
    Unknown(serde_json::Value),
}

#[derive(Deserialize)]
enum KnownOwner {
    AddressOwner(String),
    ObjectOwner(String),
    Shared { initial_shared_version: u64 },
    Immutable,
}

impl From<OwnerWire> for Owner {
    fn from(wire: OwnerWire) -> Self {
        match wire {
            OwnerWire::Known(KnownOwner::AddressOwner(address)) => Self::AddressOwner(address),
            OwnerWire::Known(KnownOwner::ObjectOwner(id)) => Self::ObjectOwner(id),
            OwnerWire::Known(KnownOwner::Shared {
                initial_shared_version,
            }) => Self::Shared {
                initial_shared_version,
            },
            OwnerWire::Known(KnownOwner::Immutable) => Self::Immutable,
            OwnerWire::Unknown(value) => Self::Unknown(match value {
                serde_json::Value::String(tag) => tag,
                serde_json::Value::Object(map) => map.keys().next().cloned().unwrap_or_default(),
                other => other.to_string(),
            }),
        }
    }
}

/// Net change of one owner's balance of one coin type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceChange {
    /// Who holds the balance.
    pub owner: Owner,
    /// Coin type.
    pub coin_type: String,
    /// Signed delta; positive means received.
    #[serde(with = "signed_decimal_string")]
    pub amount: BigInt,
}

/// Effects status of a dry-run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectStatus {
    /// Execution succeeded.
    Success,
    /// Execution aborted with the chain's error text.
    Failure(String),
}

impl EffectStatus {
    /// Returns true if execution succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Result of dry-running a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationOutcome {
    /// Effects status.
    pub status: EffectStatus,
    /// Every balance change the transaction would cause.
    pub balance_changes: Vec<BalanceChange>,
}

/// Signatures submitted with a broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionSignatures {
    /// The payer's signature alone.
    Single(String),
    /// Ordered list, reserved for sponsored or multi-signer transactions.
    Multiple(Vec<String>),
}

impl TransactionSignatures {
    /// Signatures in submission order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::Single(signature) => vec![signature.clone()],
            Self::Multiple(signatures) => signatures.clone(),
        }
    }
}

/// Serde adapter for unsigned decimal strings.
mod decimal_string {
    use num_bigint::BigUint;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.trim()
            .parse()
            .map_err(|e| de::Error::custom(format!("invalid amount {raw:?}: {e}")))
    }
}

/// Serde adapter for signed decimal strings.
mod signed_decimal_string {
    use num_bigint::BigInt;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigInt, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.trim()
            .parse()
            .map_err(|e| de::Error::custom(format!("invalid amount {raw:?}: {e}")))
    }
}
