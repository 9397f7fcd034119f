//! End-to-end tests for the Sui `exact` facilitator.
//!
//! The facilitator runs against [`harness::ScriptedGateway`], a chain gateway
//! that replays scripted answers and records every call it receives.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod harness;

pub use harness::*;
