//! sui-exact-facilitator CLI entry point.

mod cli;

use clap::Parser;
use cli::{Cli, Command, PaymentArgs};
use color_eyre::eyre::WrapErr;
use serde::de::DeserializeOwned;
use std::path::Path;
use sui_exact_facilitator::{ExactSuiFacilitator, PaymentPayload, PaymentRequirements};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing; stdout carries the JSON result, logs go to stderr
    let log_level = cli.to_config(None)?.log_level;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    info!("sui-exact-facilitator v{}", env!("CARGO_PKG_VERSION"));

    let output = match &cli.command {
        Command::Verify(args) => {
            let (payload, requirements) = load_payment(args)?;
            let facilitator = build(&cli, &payload)?;
            serde_json::to_string_pretty(&facilitator.verify(&payload, &requirements).await)?
        }
        Command::Settle(args) => {
            let (payload, requirements) = load_payment(args)?;
            let facilitator = build(&cli, &payload)?;
            serde_json::to_string_pretty(&facilitator.settle(&payload, &requirements).await)?
        }
        Command::Supported { network } => {
            let config = cli.to_config(Some(network))?;
            let facilitator = ExactSuiFacilitator::from_config(&config)?;
            serde_json::to_string_pretty(&serde_json::json!({
                "scheme": facilitator.scheme(),
                "network": network,
                "family": facilitator.caip_family(),
                "rpcUrl": config.endpoint(network),
                "extra": facilitator.supported_extra(network),
                "signers": facilitator.signer_addresses(network),
            }))?
        }
    };

    println!("{output}");
    Ok(())
}

fn build(cli: &Cli, payload: &PaymentPayload) -> color_eyre::Result<ExactSuiFacilitator> {
    let config = cli.to_config(Some(&payload.accepted.network))?;
    Ok(ExactSuiFacilitator::from_config(&config)?)
}

fn load_payment(args: &PaymentArgs) -> color_eyre::Result<(PaymentPayload, PaymentRequirements)> {
    Ok((read_json(&args.payload)?, read_json(&args.requirements)?))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> color_eyre::Result<T> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).wrap_err_with(|| format!("Failed to parse {}", path.display()))
}
