//! # sui-exact-facilitator
//!
//! Verify-then-settle facilitator for the sign-first `exact` payment scheme on Sui.
//!
//! A payer signs a transfer transaction without broadcasting it. The facilitator
//! checks, without mutating chain state, that the signed transaction pays at least
//! the required amount of the required coin type to the required recipient, and
//! only then broadcasts it and waits for finality.
//!
//! ## Flow
//!
//! ```text
//! PaymentPayload + PaymentRequirements
//!        │
//!        ▼
//! ┌──────────────────────────────┐
//! │ scheme / network / shape     │
//! └──────────────┬───────────────┘
//!                │
//!       ┌────────┴────────┐
//!       ▼                 ▼
//!  recover signer     dry-run tx       (joined, not raced)
//!       └────────┬────────┘
//!                ▼
//!     effects status + balance-change match
//!                │
//!                ▼
//!          VerifyResult ──► settle: re-verify, broadcast, await finality
//! ```
//!
//! ## Modules
//!
//! - [`facilitator`]: verification engine, balance-change matcher and settlement
//! - [`gateway`]: the chain capability (signature recovery, dry-run, broadcast)
//! - [`types`]: requirements, payloads and results exchanged with hosts
//! - [`normalize`]: canonical Sui addresses and Move type tags
//! - [`config`]: TOML configuration

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod facilitator;
pub mod gateway;
pub mod normalize;
pub mod types;

pub use config::FacilitatorConfig;
pub use error::{Error, Result};
pub use facilitator::{ExactSuiFacilitator, FacilitatorOptions};
pub use gateway::{ChainGateway, GatewayError, JsonRpcGateway, SignatureError};
pub use types::{
    BalanceChange, EffectStatus, ExactSuiPayload, InvalidReason, Owner, PaymentPayload,
    PaymentRequirements, SettleResult, SimulationOutcome, TransactionSignatures, VerifyResult,
};

/// Payment scheme tag handled by this crate.
pub const SCHEME_EXACT: &str = "exact";

/// CAIP-2 namespace pattern for the networks this crate can verify.
pub const SUI_CAIP_FAMILY: &str = "sui:*";
