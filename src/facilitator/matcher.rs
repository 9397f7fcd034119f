//! Balance-change matching.
//!
//! Finds the one balance change that pays the required recipient in the
//! required coin type. A transaction can touch many balances (the payer's
//! debit, gas, change outputs, object-owned balances), so the recipient and the
//! asset are resolved separately to tell "paid the wrong coin" apart from
//! "never paid this recipient".

use crate::normalize::{normalize_address, normalize_type_tag};
use crate::types::BalanceChange;
use num_bigint::BigInt;

/// Outcome of matching balance changes against a recipient and asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The recipient received this delta of the required asset.
    Matched(BigInt),
    /// No address-owned change for the recipient.
    RecipientMismatch,
    /// The recipient's changes are all in other coin types.
    AssetMismatch,
}

/// Locate the recipient's change in `asset` among `changes`.
///
/// Only address-owned entries qualify; object-owned, shared and immutable
/// owners never count as a payment destination. Whether the matched delta is
/// large enough is left to the caller.
#[must_use]
pub fn match_balance_change(changes: &[BalanceChange], recipient: &str, asset: &str) -> MatchOutcome {
    let recipient = normalize_address(recipient);
    let asset = normalize_type_tag(asset);

    let mut to_recipient = changes
        .iter()
        .filter(|change| {
            change
                .owner
                .address()
                .is_some_and(|owner| normalize_address(owner) == recipient)
        })
        .peekable();

    if to_recipient.peek().is_none() {
        return MatchOutcome::RecipientMismatch;
    }

    to_recipient
        .find(|change| normalize_type_tag(&change.coin_type) == asset)
        .map_or(MatchOutcome::AssetMismatch, |change| {
            MatchOutcome::Matched(change.amount.clone())
        })
}
