//! Verification engine.
//!
//! Checks run in order and stop at the first failure. Signature recovery and
//! the dry-run are independent, so they run concurrently and are both awaited
//! before either result is looked at.

use super::matcher::{match_balance_change, MatchOutcome};
use super::ExactSuiFacilitator;
use crate::gateway::GatewayError;
use crate::types::{
    EffectStatus, ExactSuiPayload, InvalidReason, PaymentPayload, PaymentRequirements,
    VerifyResult,
};
use crate::SCHEME_EXACT;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use num_bigint::BigInt;
use tracing::{debug, info, warn};

impl ExactSuiFacilitator {
    /// Verify that `payload` pays `requirements`.
    ///
    /// Never fails: every problem, including gateway errors, is reported as an
    /// invalid [`VerifyResult`]. The payer is present whenever the signature was
    /// recovered, even if a later check failed.
    pub async fn verify(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> VerifyResult {
        let result = self.run_checks(payload, requirements).await;

        match (&result.invalid_reason, &result.payer) {
            (None, Some(payer)) => info!(
                "Payment of {} {} to {} by {payer} verified on {}",
                requirements.amount, requirements.asset, requirements.pay_to, requirements.network
            ),
            (reason, payer) => warn!(
                "Payment rejected on {}: {} (payer={}, detail={})",
                requirements.network,
                reason.unwrap_or(InvalidReason::VerificationFailed),
                payer.as_deref().unwrap_or("-"),
                result.invalid_message.as_deref().unwrap_or("-")
            ),
        }
        result
    }

    async fn run_checks(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> VerifyResult {
        if payload.accepted.scheme != SCHEME_EXACT || requirements.scheme != SCHEME_EXACT {
            return VerifyResult::invalid(InvalidReason::UnsupportedScheme).with_message(format!(
                "expected scheme {SCHEME_EXACT}, got {} (payload) and {} (requirements)",
                payload.accepted.scheme, requirements.scheme
            ));
        }

        if payload.accepted.network != requirements.network {
            return VerifyResult::invalid(InvalidReason::NetworkMismatch).with_message(format!(
                "payload is for {}, requirements are for {}",
                payload.accepted.network, requirements.network
            ));
        }

        let tx_bytes = match decode_transaction(&payload.payload) {
            Ok(bytes) => bytes,
            Err(message) => {
                return VerifyResult::invalid(InvalidReason::MalformedPayload).with_message(message)
            }
        };

        let network = requirements.network.as_str();
        debug!("Recovering signer and dry-running {} bytes on {network}", tx_bytes.len());

        // Join, not race: a fast failure on one side still waits for the other.
        let (signer, simulation) = tokio::join!(
            self.gateway
                .verify_signature(&tx_bytes, &payload.payload.signature, network),
            self.gateway.simulate_transaction(&tx_bytes, network),
        );

        let (payer, simulation) = match (signer, simulation) {
            (Ok(payer), Ok(simulation)) => (payer, simulation),
            (signer, simulation) => return classify_gateway_failure(signer.err(), simulation.err()),
        };

        if payer.trim().is_empty() {
            return VerifyResult::invalid(InvalidReason::SignatureVerificationFailed)
                .with_message("gateway recovered an empty signer");
        }

        if let EffectStatus::Failure(message) = simulation.status {
            return VerifyResult::invalid(InvalidReason::DryRunFailed)
                .with_message(message)
                .with_payer(payer);
        }

        let delta = match match_balance_change(
            &simulation.balance_changes,
            &requirements.pay_to,
            &requirements.asset,
        ) {
            MatchOutcome::Matched(delta) => delta,
            MatchOutcome::RecipientMismatch => {
                return VerifyResult::invalid(InvalidReason::RecipientMismatch)
                    .with_message(format!("no balance change for recipient {}", requirements.pay_to))
                    .with_payer(payer)
            }
            MatchOutcome::AssetMismatch => {
                return VerifyResult::invalid(InvalidReason::AssetMismatch)
                    .with_message(format!(
                        "recipient {} receives no {}",
                        requirements.pay_to, requirements.asset
                    ))
                    .with_payer(payer)
            }
        };

        // Overpayment is fine, the scheme only enforces a minimum.
        if delta < BigInt::from(requirements.amount.clone()) {
            return VerifyResult::invalid(InvalidReason::AmountInsufficient)
                .with_message(format!("received {delta}, required {}", requirements.amount))
                .with_payer(payer);
        }

        VerifyResult::valid(payer)
    }
}

/// Decode the transaction bytes, requiring both transaction and signature.
pub(super) fn decode_transaction(body: &ExactSuiPayload) -> Result<Vec<u8>, String> {
    if body.transaction.trim().is_empty() {
        return Err("missing transaction".to_string());
    }
    if body.signature.trim().is_empty() {
        return Err("missing signature".to_string());
    }

    match BASE64.decode(body.transaction.trim()) {
        Ok(bytes) if bytes.is_empty() => Err("empty transaction".to_string()),
        Ok(bytes) => Ok(bytes),
        Err(e) => Err(format!("transaction is not valid base64: {e}")),
    }
}

/// Classify a failed parallel phase.
///
/// Signature-origin errors win over anything else; every other failure,
/// including a transport error during signature recovery, is a simulation
/// failure.
fn classify_gateway_failure(
    signer: Option<GatewayError>,
    simulation: Option<GatewayError>,
) -> VerifyResult {
    let signature_error = [signer.as_ref(), simulation.as_ref()]
        .into_iter()
        .flatten()
        .find(|e| e.is_signature_failure());

    if let Some(e) = signature_error {
        return VerifyResult::invalid(InvalidReason::SignatureVerificationFailed)
            .with_message(e.to_string());
    }

    let message = simulation
        .or(signer)
        .map_or_else(|| "gateway call failed".to_string(), |e| e.to_string());
    VerifyResult::invalid(InvalidReason::SimulationFailed).with_message(message)
}
