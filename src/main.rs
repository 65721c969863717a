//! Conditional on-chain relayer.
//!
//! Runs exactly one relay job per process invocation: evaluates whether an
//! on-chain value needs updating, fetches the authoritative replacement value,
//! then builds, signs, submits, and confirms the transaction that writes it.
//! Retry across runs is the responsibility of the external scheduler.

use std::process::ExitCode;
use std::time::Duration;

use dotenvy::dotenv;
use log::{error, info};

mod config;
mod constants;
mod domain;
mod logging;
mod models;
mod services;
mod utils;

use config::{Config, JobConfig};
use domain::relayer::{MaxLtvStrategy, RateSyncStrategy, RelayOrchestrator};
use domain::transaction::{ConfirmationWaiter, TransactionSubmitter};
use models::RelayOutcome;
use services::graph::GraphClient;
use services::provider::EvmProvider;
use services::signer::{LocalSigner, Signer};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    logging::setup_logging();
    color_eyre::install().ok();

    match run().await {
        Ok(RelayOutcome::NoActionNeeded) => {
            info!("No action needed");
            ExitCode::SUCCESS
        }
        Ok(RelayOutcome::Confirmed { tx_hash }) => {
            info!("Relay transaction confirmed: {tx_hash}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Relay run failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> eyre::Result<RelayOutcome> {
    let config = Config::from_env()?;

    let provider = EvmProvider::new(&config.rpc_url, config.rpc_timeout_secs)?;
    let signer = LocalSigner::from_hex_key(&config.private_key)?;
    let sender = signer.address().await?;

    let submitter = TransactionSubmitter::new(provider.clone(), signer);
    let waiter = ConfirmationWaiter::new(
        provider.clone(),
        Duration::from_secs(config.confirmation_timeout_secs),
        Duration::from_millis(config.receipt_poll_interval_ms),
    );

    let outcome = match config.job {
        JobConfig::RateSync(job) => {
            let strategy = RateSyncStrategy::new(provider, job, sender, config.chain_id);
            RelayOrchestrator::new(strategy, submitter, waiter).run().await?
        }
        JobConfig::MaxLtv(job) => {
            let graph = GraphClient::new(&job.graph_api_url, job.graph_api_timeout_secs)?;
            let strategy = MaxLtvStrategy::new(graph, job, sender, config.chain_id);
            RelayOrchestrator::new(strategy, submitter, waiter).run().await?
        }
    };

    Ok(outcome)
}
