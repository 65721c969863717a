//! The relay workflow: one orchestrator parameterized over a condition-check
//! and value-fetch strategy, with the two concrete jobs as implementations.

use alloy::network::ReceiptResponse;
use async_trait::async_trait;
use log::info;

use crate::domain::transaction::{ConfirmationWaiter, TransactionSubmitter};
use crate::models::{EvmTransactionData, RelayOutcome, RelayerError, TransactionError};
use crate::services::provider::EvmProviderTrait;
use crate::services::signer::Signer;

mod max_ltv;
pub use max_ltv::*;

mod rate_sync;
pub use rate_sync::*;

/// A relay job's decision logic: whether to act, and what to write on-chain.
///
/// The orchestrator owns the shared control flow; implementations decide the
/// two points where the jobs differ.
#[async_trait]
pub trait RelayStrategy: Send + Sync {
    /// Evidence produced by the condition check and consumed by the value
    /// fetch.
    type Condition: Send;

    fn name(&self) -> &'static str;

    /// Decides whether the on-chain value needs relaying. `Ok(None)` means
    /// no action is needed and ends the run before any further I/O.
    async fn check_condition(&self) -> Result<Option<Self::Condition>, RelayerError>;

    /// Fetches the authoritative value and assembles the transaction that
    /// writes it. Called at most once per run, strictly after the condition
    /// check; anything that can drift with chain state is read here, not
    /// earlier.
    async fn fetch_value(
        &self,
        condition: Self::Condition,
    ) -> Result<EvmTransactionData, RelayerError>;
}

/// Coordinates a single relay run: check, fetch, submit, confirm.
pub struct RelayOrchestrator<S, P, SG, W> {
    strategy: S,
    submitter: TransactionSubmitter<P, SG>,
    waiter: ConfirmationWaiter<W>,
}

impl<S, P, SG, W> RelayOrchestrator<S, P, SG, W>
where
    S: RelayStrategy,
    P: EvmProviderTrait,
    SG: Signer,
    W: EvmProviderTrait,
{
    pub fn new(
        strategy: S,
        submitter: TransactionSubmitter<P, SG>,
        waiter: ConfirmationWaiter<W>,
    ) -> Self {
        Self {
            strategy,
            submitter,
            waiter,
        }
    }

    /// Runs the relay once. At most one transaction is submitted; any
    /// failure aborts the run and surfaces to the caller, the scheduler
    /// retries on its next invocation.
    pub async fn run(&self) -> Result<RelayOutcome, RelayerError> {
        let Some(condition) = self.strategy.check_condition().await? else {
            return Ok(RelayOutcome::NoActionNeeded);
        };

        let tx = self.strategy.fetch_value(condition).await?;

        let tx_hash = self.submitter.submit(tx).await?;
        info!("{} transaction sent: {tx_hash}", self.strategy.name());

        let receipt = self.waiter.await_confirmation(&tx_hash).await?;

        // An included-but-reverted transaction produced no state change and
        // must be visible as a failure
        if !receipt.inner.status() {
            return Err(TransactionError::Reverted { tx_hash }.into());
        }

        info!("{} transaction confirmed: {tx_hash}", self.strategy.name());
        Ok(RelayOutcome::Confirmed { tx_hash })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use alloy::primitives::{address, Bytes, U256};

    use crate::domain::transaction::test_receipts::receipt_with_status;
    use crate::services::provider::MockEvmProviderTrait;
    use crate::services::signer::{MockSigner, SignedTransaction};

    const TX_HASH: &str = "0x4242424242424242424242424242424242424242424242424242424242424242";

    struct StubStrategy {
        proceed: bool,
        fetch_calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RelayStrategy for StubStrategy {
        type Condition = ();

        fn name(&self) -> &'static str {
            "stub"
        }

        async fn check_condition(&self) -> Result<Option<()>, RelayerError> {
            Ok(self.proceed.then_some(()))
        }

        async fn fetch_value(&self, _condition: ()) -> Result<EvmTransactionData, RelayerError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            Ok(EvmTransactionData {
                from: address!("742d35Cc6634C0532925a3b844Bc454e4438f44e"),
                to: address!("742d35Cc6634C0532925a3b844Bc454e4438f44f"),
                value: U256::ZERO,
                data: Bytes::new(),
                chain_id: 1,
                gas_limit: Some(100_000),
                gas_price: Some(20_000_000_000),
                nonce: None,
            })
        }
    }

    fn orchestrator(
        strategy: StubStrategy,
        submit_provider: MockEvmProviderTrait,
        signer: MockSigner,
        wait_provider: MockEvmProviderTrait,
    ) -> RelayOrchestrator<StubStrategy, MockEvmProviderTrait, MockSigner, MockEvmProviderTrait>
    {
        RelayOrchestrator::new(
            strategy,
            TransactionSubmitter::new(submit_provider, signer),
            ConfirmationWaiter::new(
                wait_provider,
                Duration::from_secs(1),
                Duration::from_millis(10),
            ),
        )
    }

    fn submission_mocks() -> (MockEvmProviderTrait, MockSigner) {
        let mut provider = MockEvmProviderTrait::new();
        provider
            .expect_get_transaction_count()
            .returning(|_| Ok(0));
        provider
            .expect_send_raw_transaction()
            .times(1)
            .returning(|_| Ok(TX_HASH.to_string()));

        let mut signer = MockSigner::new();
        signer.expect_sign_transaction().returning(|_| {
            Ok(SignedTransaction {
                hash: TX_HASH.to_string(),
                raw: vec![0xf8],
            })
        });

        (provider, signer)
    }

    #[tokio::test]
    async fn test_run_returns_no_action_without_any_submission() {
        let fetch_calls = Arc::new(AtomicUsize::new(0));
        let strategy = StubStrategy {
            proceed: false,
            fetch_calls: fetch_calls.clone(),
        };

        // No expectations mounted: any provider or signer call panics
        let orchestrator = orchestrator(
            strategy,
            MockEvmProviderTrait::new(),
            MockSigner::new(),
            MockEvmProviderTrait::new(),
        );

        let outcome = orchestrator.run().await.unwrap();
        assert_eq!(outcome, RelayOutcome::NoActionNeeded);
        assert_eq!(fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_run_submits_and_confirms() {
        let fetch_calls = Arc::new(AtomicUsize::new(0));
        let strategy = StubStrategy {
            proceed: true,
            fetch_calls: fetch_calls.clone(),
        };

        let (provider, signer) = submission_mocks();

        let mut wait_provider = MockEvmProviderTrait::new();
        wait_provider
            .expect_get_transaction_receipt()
            .times(1)
            .returning(|_| Ok(Some(receipt_with_status(true))));

        let orchestrator = orchestrator(strategy, provider, signer, wait_provider);

        let outcome = orchestrator.run().await.unwrap();
        assert_eq!(
            outcome,
            RelayOutcome::Confirmed {
                tx_hash: TX_HASH.to_string()
            }
        );
        assert_eq!(fetch_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_run_escalates_reverted_receipt() {
        let strategy = StubStrategy {
            proceed: true,
            fetch_calls: Arc::new(AtomicUsize::new(0)),
        };

        let (provider, signer) = submission_mocks();

        let mut wait_provider = MockEvmProviderTrait::new();
        wait_provider
            .expect_get_transaction_receipt()
            .returning(|_| Ok(Some(receipt_with_status(false))));

        let orchestrator = orchestrator(strategy, provider, signer, wait_provider);

        let result = orchestrator.run().await;
        assert!(matches!(
            result,
            Err(RelayerError::Transaction(TransactionError::Reverted { tx_hash })) if tx_hash == TX_HASH
        ));
    }

    #[tokio::test]
    async fn test_run_surfaces_confirmation_timeout() {
        let strategy = StubStrategy {
            proceed: true,
            fetch_calls: Arc::new(AtomicUsize::new(0)),
        };

        let (provider, signer) = submission_mocks();

        let mut wait_provider = MockEvmProviderTrait::new();
        wait_provider
            .expect_get_transaction_receipt()
            .returning(|_| Ok(None));

        let orchestrator = RelayOrchestrator::new(
            strategy,
            TransactionSubmitter::new(provider, signer),
            ConfirmationWaiter::new(
                wait_provider,
                Duration::from_millis(30),
                Duration::from_millis(10),
            ),
        );

        let result = orchestrator.run().await;
        assert!(matches!(
            result,
            Err(RelayerError::Transaction(
                TransactionError::ConfirmationTimeout { .. }
            ))
        ));
    }
}
