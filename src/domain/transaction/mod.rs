//! Transaction assembly, submission, and confirmation.
//!
//! Submission signs through an explicit [`Signer`] capability and broadcasts
//! the raw bytes; nothing is retried within a run. Confirmation polls for the
//! receipt up to a bounded wait.

use std::time::{Duration, Instant};

use alloy::primitives::{Address, Bytes, U256};
use log::debug;

use crate::models::{EvmTransactionData, FeeMode, TransactionError, TransactionReceipt};
use crate::services::provider::EvmProviderTrait;
use crate::services::signer::Signer;

/// Inputs for assembling a relay transaction.
#[derive(Debug, Clone)]
pub struct TransactionParams {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub chain_id: u64,
    pub fee_mode: FeeMode,
}

/// Assembles a transaction request from the gathered values. Pure, no I/O;
/// calldata is encoded from typed arguments upstream, so malformed input
/// cannot reach this point.
pub fn build_transaction(params: TransactionParams) -> EvmTransactionData {
    let (gas_limit, gas_price) = match params.fee_mode {
        FeeMode::AtSubmit => (None, None),
        FeeMode::Fixed {
            gas_limit,
            gas_price,
        } => (Some(gas_limit), Some(gas_price)),
    };

    EvmTransactionData {
        from: params.from,
        to: params.to,
        value: params.value,
        data: params.data,
        chain_id: params.chain_id,
        gas_limit,
        gas_price,
        nonce: None,
    }
}

/// Signs and broadcasts a transaction through an explicit signer.
pub struct TransactionSubmitter<P, S> {
    provider: P,
    signer: S,
}

impl<P, S> TransactionSubmitter<P, S>
where
    P: EvmProviderTrait,
    S: Signer,
{
    pub fn new(provider: P, signer: S) -> Self {
        Self { provider, signer }
    }

    /// Resolves the nonce and any unset fee fields from current chain state,
    /// signs, and broadcasts. Returns the transaction hash. A rejected
    /// broadcast aborts the run; it is never retried here.
    pub async fn submit(&self, mut tx: EvmTransactionData) -> Result<String, TransactionError> {
        if tx.nonce.is_none() {
            tx.nonce = Some(self.provider.get_transaction_count(tx.from).await?);
        }
        if tx.gas_price.is_none() {
            tx.gas_price = Some(self.provider.get_gas_price().await?);
        }
        if tx.gas_limit.is_none() {
            tx.gas_limit = Some(self.provider.estimate_gas(&tx).await?);
        }

        let signed = self.signer.sign_transaction(&tx).await?;
        debug!("Transaction signed, hash: {}", signed.hash);

        self.provider
            .send_raw_transaction(&signed.raw)
            .await
            .map_err(|e| TransactionError::Submission(e.to_string()))
    }
}

/// Polls for a transaction receipt until inclusion or a bounded wait elapses.
pub struct ConfirmationWaiter<P> {
    provider: P,
    max_wait: Duration,
    poll_interval: Duration,
}

impl<P> ConfirmationWaiter<P>
where
    P: EvmProviderTrait,
{
    pub fn new(provider: P, max_wait: Duration, poll_interval: Duration) -> Self {
        Self {
            provider,
            max_wait,
            poll_interval,
        }
    }

    /// Blocks until the transaction is mined or the wait bound is exceeded.
    /// A timeout is inconclusive, the transaction may still confirm later,
    /// but this run does not wait further.
    pub async fn await_confirmation(
        &self,
        tx_hash: &str,
    ) -> Result<TransactionReceipt, TransactionError> {
        let started = Instant::now();

        loop {
            if let Some(receipt) = self.provider.get_transaction_receipt(tx_hash).await? {
                return Ok(receipt);
            }

            if started.elapsed() >= self.max_wait {
                return Err(TransactionError::ConfirmationTimeout {
                    tx_hash: tx_hash.to_string(),
                    waited_secs: self.max_wait.as_secs(),
                });
            }

            debug!("Transaction {tx_hash} not yet mined");
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
