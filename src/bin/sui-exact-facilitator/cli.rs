//! Command-line interface definition.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use sui_exact_facilitator::FacilitatorConfig;

/// Verify and settle sign-first `exact` payments on Sui.
#[derive(Parser, Debug)]
#[command(name = "sui-exact-facilitator")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file.
    #[arg(long, short, global = true, env = "SUI_EXACT_CONFIG")]
    pub config: Option<PathBuf>,

    /// RPC endpoint to use for the payload's network, overriding the config.
    #[arg(long, global = true, env = "SUI_EXACT_RPC_URL")]
    pub rpc_url: Option<String>,

    /// Gas station endpoint to advertise.
    #[arg(long, global = true, env = "SUI_EXACT_GAS_STATION")]
    pub gas_station_url: Option<String>,

    /// Log level, overriding the configured one (RUST_LOG takes precedence).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Facilitator operations.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Verify a payment payload against requirements without broadcasting.
    Verify(PaymentArgs),
    /// Verify, broadcast and wait for finality.
    Settle(PaymentArgs),
    /// Show what the facilitator advertises for a network.
    Supported {
        /// CAIP-2 network identifier.
        #[arg(long, default_value = "sui:mainnet")]
        network: String,
    },
}

/// Input files for verify and settle.
#[derive(clap::Args, Debug)]
pub struct PaymentArgs {
    /// JSON file holding the payment payload.
    #[arg(long)]
    pub payload: PathBuf,

    /// JSON file holding the payment requirements.
    #[arg(long)]
    pub requirements: PathBuf,
}

impl Cli {
    /// Build the facilitator configuration for a run on `network`.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file is specified but cannot be loaded.
    pub fn to_config(&self, network: Option<&str>) -> color_eyre::Result<FacilitatorConfig> {
        // Start with default config or load from file
        let mut config = if let Some(ref path) = self.config {
            FacilitatorConfig::from_file(path)?
        } else {
            FacilitatorConfig::default()
        };

        // Override with CLI arguments
        if let (Some(url), Some(network)) = (&self.rpc_url, network) {
            config.networks.insert(network.to_string(), url.clone());
        }
        if self.gas_station_url.is_some() {
            config.gas_station_url.clone_from(&self.gas_station_url);
        }
        if let Some(level) = &self.log_level {
            config.log_level.clone_from(level);
        }

        Ok(config)
    }
}
