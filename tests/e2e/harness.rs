//! Scripted chain gateway for end-to-end facilitator tests.
//!
//! `ScriptedGateway` answers every [`ChainGateway`] call from a fixed script and
//! records what it was asked, so tests can assert both the verdict and the
//! calls that led to it (e.g. that settlement never broadcast).

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use num_bigint::{BigInt, BigUint};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use sui_exact_facilitator::types::AcceptedKind;
use sui_exact_facilitator::{
    BalanceChange, ChainGateway, EffectStatus, ExactSuiFacilitator, ExactSuiPayload,
    FacilitatorOptions, GatewayError, Owner, PaymentPayload, PaymentRequirements,
    SimulationOutcome, TransactionSignatures,
};

/// Network every fixture uses.
pub const NETWORK: &str = "sui:testnet";

/// Address the scripted signer recovers.
pub const PAYER: &str = "0x00000000000000000000000000000000000000000000000000000000000b0b01";

/// Required recipient.
pub const RECIPIENT: &str = "0x00000000000000000000000000000000000000000000000000000000000a11ce";

/// Required asset.
pub const USDC: &str =
    "0xa1ec7fc00a6f40db9693ad1415d0c193ad3906494428cf252621037bd7117e29::usdc::USDC";

/// Gas coin.
pub const SUI: &str = "0x2::sui::SUI";

/// Unexecuted transaction bytes carried by [`payload`].
pub const TX_BYTES: &[u8] = b"programmable transfer of usdc";

/// Serialized signature carried by [`payload`].
pub const SIGNATURE: &str = "AHNpZ25hdHVyZQ==";

/// Digest returned by a successful broadcast.
pub const DIGEST: &str = "8Ko8aXF2cMS1ZPyZ1hs4jP8rbqTc3Vy4GmiWSESHZB3h";

/// What the gateway was asked to do.
#[derive(Debug, Default)]
pub struct CallLog {
    /// `verify_signature` calls.
    pub signature: AtomicUsize,
    /// `simulate_transaction` calls started.
    pub simulation: AtomicUsize,
    /// `simulate_transaction` calls that ran to completion.
    pub simulation_completed: AtomicUsize,
    /// `broadcast` calls.
    pub broadcast: AtomicUsize,
    /// `wait_for_finality` calls.
    pub finality: AtomicUsize,
    /// Gateway calls in flight right now.
    in_flight: AtomicUsize,
    /// Highest number of concurrent gateway calls seen.
    pub max_in_flight: AtomicUsize,
    /// Transaction bytes seen by the gateway.
    pub transactions: Mutex<Vec<Vec<u8>>>,
    /// Networks seen by the gateway.
    pub networks: Mutex<Vec<String>>,
    /// Signatures submitted with broadcasts.
    pub broadcast_signatures: Mutex<Vec<TransactionSignatures>>,
    /// Digests waited on.
    pub awaited_digests: Mutex<Vec<String>>,
}

impl CallLog {
    /// Read a counter.
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn enter(&self, transaction: Option<&[u8]>, network: &str) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(tx) = transaction {
            self.transactions.lock().push(tx.to_vec());
        }
        self.networks.lock().push(network.to_string());
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A gateway that replays scripted answers.
pub struct ScriptedGateway {
    signer: Result<String, GatewayError>,
    simulation: Result<SimulationOutcome, GatewayError>,
    broadcast: Result<String, GatewayError>,
    finality: Result<(), GatewayError>,
    signer_delay: Duration,
    simulation_delay: Duration,
    signers: Vec<String>,
    calls: CallLog,
}

impl ScriptedGateway {
    /// A transaction in which [`PAYER`] sends `amount` of `asset` to `recipient`
    /// and pays gas in SUI; every call succeeds.
    pub fn paying(recipient: &str, asset: &str, amount: i64) -> Self {
        Self {
            signer: Ok(PAYER.to_string()),
            simulation: Ok(SimulationOutcome {
                status: EffectStatus::Success,
                balance_changes: vec![
                    address_change(PAYER, asset, -amount),
                    address_change(PAYER, SUI, -1_997_880),
                    address_change(recipient, asset, amount),
                ],
            }),
            broadcast: Ok(DIGEST.to_string()),
            finality: Ok(()),
            signer_delay: Duration::ZERO,
            simulation_delay: Duration::ZERO,
            signers: Vec::new(),
            calls: CallLog::default(),
        }
    }

    /// Replace the signature recovery answer.
    #[must_use]
    pub fn with_signer(mut self, signer: Result<String, GatewayError>) -> Self {
        self.signer = signer;
        self
    }

    /// Replace the whole simulation answer.
    #[must_use]
    pub fn with_simulation(mut self, simulation: Result<SimulationOutcome, GatewayError>) -> Self {
        self.simulation = simulation;
        self
    }

    /// Successful simulation with these balance changes.
    #[must_use]
    pub fn with_balance_changes(self, balance_changes: Vec<BalanceChange>) -> Self {
        self.with_simulation(Ok(SimulationOutcome {
            status: EffectStatus::Success,
            balance_changes,
        }))
    }

    /// Replace the broadcast answer.
    #[must_use]
    pub fn with_broadcast(mut self, broadcast: Result<String, GatewayError>) -> Self {
        self.broadcast = broadcast;
        self
    }

    /// Replace the finality answer.
    #[must_use]
    pub fn with_finality(mut self, finality: Result<(), GatewayError>) -> Self {
        self.finality = finality;
        self
    }

    /// Delay the signature and simulation answers.
    #[must_use]
    pub fn with_delays(mut self, signer: Duration, simulation: Duration) -> Self {
        self.signer_delay = signer;
        self.simulation_delay = simulation;
        self
    }

    /// Addresses reported by `signing_addresses`.
    #[must_use]
    pub fn with_signers(mut self, signers: Vec<String>) -> Self {
        self.signers = signers;
        self
    }

    /// Recorded calls.
    pub fn calls(&self) -> &CallLog {
        &self.calls
    }
}

#[async_trait]
impl ChainGateway for ScriptedGateway {
    async fn verify_signature(
        &self,
        transaction: &[u8],
        _signature: &str,
        network: &str,
    ) -> Result<String, GatewayError> {
        self.calls.signature.fetch_add(1, Ordering::SeqCst);
        self.calls.enter(Some(transaction), network);
        tokio::time::sleep(self.signer_delay).await;
        self.calls.leave();
        self.signer.clone()
    }

    async fn simulate_transaction(
        &self,
        transaction: &[u8],
        network: &str,
    ) -> Result<SimulationOutcome, GatewayError> {
        self.calls.simulation.fetch_add(1, Ordering::SeqCst);
        self.calls.enter(Some(transaction), network);
        tokio::time::sleep(self.simulation_delay).await;
        self.calls.leave();
        self.calls.simulation_completed.fetch_add(1, Ordering::SeqCst);
        self.simulation.clone()
    }

    async fn broadcast(
        &self,
        transaction: &[u8],
        signatures: &TransactionSignatures,
        network: &str,
    ) -> Result<String, GatewayError> {
        self.calls.broadcast.fetch_add(1, Ordering::SeqCst);
        self.calls.enter(Some(transaction), network);
        self.calls.broadcast_signatures.lock().push(signatures.clone());
        self.calls.leave();
        self.broadcast.clone()
    }

    async fn wait_for_finality(&self, digest: &str, network: &str) -> Result<(), GatewayError> {
        self.calls.finality.fetch_add(1, Ordering::SeqCst);
        self.calls.enter(None, network);
        self.calls.awaited_digests.lock().push(digest.to_string());
        self.calls.leave();
        self.finality.clone()
    }

    fn signing_addresses(&self) -> Vec<String> {
        self.signers.clone()
    }
}

/// Facilitator over `gateway`, keeping a handle for call assertions.
pub fn build_facilitator(gateway: ScriptedGateway) -> (ExactSuiFacilitator, Arc<ScriptedGateway>) {
    let gateway = Arc::new(gateway);
    let facilitator = ExactSuiFacilitator::new(gateway.clone(), FacilitatorOptions::default());
    (facilitator, gateway)
}

/// Address-owned balance change.
pub fn address_change(owner: &str, coin_type: &str, amount: i64) -> BalanceChange {
    BalanceChange {
        owner: Owner::AddressOwner(owner.to_string()),
        coin_type: coin_type.to_string(),
        amount: BigInt::from(amount),
    }
}

/// Requirements for `amount` USDC to [`RECIPIENT`] on [`NETWORK`].
pub fn requirements(amount: u64) -> PaymentRequirements {
    PaymentRequirements {
        scheme: "exact".to_string(),
        network: NETWORK.to_string(),
        asset: USDC.to_string(),
        amount: BigUint::from(amount),
        pay_to: RECIPIENT.to_string(),
        max_timeout_seconds: 60,
        extra: None,
    }
}

/// A well-formed payload on [`NETWORK`].
pub fn payload() -> PaymentPayload {
    PaymentPayload {
        x402_version: 2,
        accepted: AcceptedKind {
            scheme: "exact".to_string(),
            network: NETWORK.to_string(),
        },
        payload: ExactSuiPayload {
            signature: SIGNATURE.to_string(),
            transaction: BASE64.encode(TX_BYTES),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_amounts_balance() {
        let gateway = ScriptedGateway::paying(RECIPIENT, USDC, 100_000);
        let outcome = gateway.simulation.clone().expect("scripted success");
        let usdc_total: BigInt = outcome
            .balance_changes
            .iter()
            .filter(|c| c.coin_type == USDC)
            .map(|c| c.amount.clone())
            .sum();
        assert_eq!(usdc_total, BigInt::from(0));
    }

    #[test]
    fn test_call_log_records_finality_wait() {
        let gateway = ScriptedGateway::paying(RECIPIENT, USDC, 1);
        tokio_test::assert_ok!(tokio_test::block_on(
            gateway.wait_for_finality(DIGEST, NETWORK)
        ));
        assert_eq!(CallLog::count(&gateway.calls().finality), 1);
        assert_eq!(*gateway.calls().networks.lock(), vec![NETWORK.to_string()]);
    }
}
