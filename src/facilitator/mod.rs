//! Facilitator for the `exact` scheme on Sui.
//!
//! This module implements the two-phase protocol a facilitator runs on behalf
//! of a resource server:
//! 1. `verify`: decide, without mutating chain state, whether a signed
//!    transaction pays the requirements
//! 2. `settle`: verify again, then broadcast and wait for finality
//!
//! # Architecture
//!
//! ```text
//! verify(payload, requirements)
//!        │
//!        ▼
//! ┌─────────────────────┐
//! │ scheme/network/shape│──fail──► unsupported_scheme | network_mismatch | malformed_payload
//! └─────────┬───────────┘
//!           │
//!    ┌──────┴──────┐   joined
//!    │             │
//!  recover       dry-run
//!  signer          │
//!    └──────┬──────┘
//!           │ either failed ──► signature_verification_failed | simulation_failed
//!           ▼
//!    effects status ──failure──► dry_run_failed (+payer)
//!           │
//!           ▼
//!    balance-change match ──► recipient_mismatch | asset_mismatch | amount_insufficient
//!           │
//!           ▼
//!         valid
//! ```

mod matcher;
mod settlement;
mod verifier;

pub use matcher::{match_balance_change, MatchOutcome};

use crate::config::FacilitatorConfig;
use crate::error::Result;
use crate::gateway::{ChainGateway, JsonRpcGateway};
use crate::{SCHEME_EXACT, SUI_CAIP_FAMILY};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// Options that shape what the facilitator advertises.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacilitatorOptions {
    /// Gas station endpoint advertised in the supported-kind extra.
    pub gas_station_url: Option<String>,
}

impl From<&FacilitatorConfig> for FacilitatorOptions {
    fn from(config: &FacilitatorConfig) -> Self {
        Self {
            gas_station_url: config.gas_station_url.clone(),
        }
    }
}

/// Verifies and settles `exact` payments on Sui.
///
/// Stateless between calls: concurrent `verify` and `settle` calls share only
/// the gateway. Concurrent settlements of the same payload are not
/// deduplicated here; the chain rejects the second execution of a transaction.
#[derive(Clone)]
pub struct ExactSuiFacilitator {
    gateway: Arc<dyn ChainGateway>,
    options: FacilitatorOptions,
}

impl ExactSuiFacilitator {
    /// Create a facilitator over an existing gateway.
    #[must_use]
    pub fn new(gateway: Arc<dyn ChainGateway>, options: FacilitatorOptions) -> Self {
        Self { gateway, options }
    }

    /// Create a facilitator backed by Sui JSON-RPC nodes from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway cannot be constructed.
    pub fn from_config(config: &FacilitatorConfig) -> Result<Self> {
        let gateway = JsonRpcGateway::new(config)?;
        info!(
            "Facilitator initialized (scheme={}, gas_station={})",
            SCHEME_EXACT,
            config.gas_station_url.is_some()
        );
        Ok(Self::new(Arc::new(gateway), FacilitatorOptions::from(config)))
    }

    /// Scheme tag this facilitator handles.
    #[must_use]
    pub const fn scheme(&self) -> &'static str {
        SCHEME_EXACT
    }

    /// CAIP-2 family of supported networks.
    #[must_use]
    pub const fn caip_family(&self) -> &'static str {
        SUI_CAIP_FAMILY
    }

    /// Extra data advertised for `network`, such as a gas station endpoint.
    #[must_use]
    pub fn supported_extra(&self, network: &str) -> Option<Map<String, Value>> {
        let url = self.options.gas_station_url.as_ref()?;
        debug!("Advertising gas station {url} for {network}");

        let mut extra = Map::new();
        extra.insert("gasStation".to_string(), Value::String(url.clone()));
        Some(extra)
    }

    /// Addresses the facilitator can sign with on `network`.
    #[must_use]
    pub fn signer_addresses(&self, network: &str) -> Vec<String> {
        let addresses = self.gateway.signing_addresses();
        debug!("{} signer addresses for {network}", addresses.len());
        addresses
    }
}
