//! Settlement coordinator.

use super::verifier::decode_transaction;
use super::ExactSuiFacilitator;
use crate::types::{
    InvalidReason, PaymentPayload, PaymentRequirements, SettleResult, TransactionSignatures,
};
use tracing::{debug, info, warn};

impl ExactSuiFacilitator {
    /// Settle `payload` against `requirements`.
    ///
    /// The payload is verified again first; nothing is broadcast on the strength
    /// of an earlier, possibly stale, verification. On success the payer's own
    /// signature is submitted and the call returns once the digest is final.
    ///
    /// Never fails: broadcast and finality errors become
    /// `transaction_failed` results.
    pub async fn settle(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> SettleResult {
        let network = payload.accepted.network.as_str();

        let verification = self.verify(payload, requirements).await;
        if !verification.is_valid {
            let reason = verification
                .invalid_reason
                .unwrap_or(InvalidReason::VerificationFailed);
            warn!("Refusing to settle on {network}: {reason}");
            return SettleResult::failure(reason, network, verification.payer)
                .with_message(verification.invalid_message);
        }
        let payer = verification.payer;

        let tx_bytes = match decode_transaction(&payload.payload) {
            Ok(bytes) => bytes,
            Err(message) => {
                return SettleResult::failure(InvalidReason::TransactionFailed, network, payer)
                    .with_message(Some(message))
            }
        };
        let signatures = TransactionSignatures::Single(payload.payload.signature.clone());

        debug!("Broadcasting payment on {network}");
        let digest = match self.gateway.broadcast(&tx_bytes, &signatures, network).await {
            Ok(digest) if digest.trim().is_empty() => {
                warn!("Broadcast on {network} returned an empty digest");
                return SettleResult::failure(InvalidReason::TransactionFailed, network, payer)
                    .with_message(Some("broadcast returned an empty digest".to_string()));
            }
            Ok(digest) => digest,
            Err(e) => {
                warn!("Broadcast failed on {network}: {e}");
                return SettleResult::failure(InvalidReason::TransactionFailed, network, payer)
                    .with_message(Some(e.to_string()));
            }
        };

        if let Err(e) = self.gateway.wait_for_finality(&digest, network).await {
            warn!("Transaction {digest} failed to finalize on {network}: {e}");
            return SettleResult::failure(InvalidReason::TransactionFailed, network, payer)
                .with_message(Some(e.to_string()));
        }

        info!("Payment settled on {network}: {digest}");
        SettleResult::success(digest, network, payer)
    }
}
