use thiserror::Error;

use crate::services::graph::QueryError;
use crate::services::provider::ProviderError;
use crate::services::signer::SignerError;

#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("Transaction broadcast rejected: {0}")]
    Submission(String),

    #[error("No receipt for transaction {tx_hash} within {waited_secs}s")]
    ConfirmationTimeout { tx_hash: String, waited_secs: u64 },

    #[error("Transaction {tx_hash} reverted on-chain")]
    Reverted { tx_hash: String },

    #[error("Underlying provider error: {0}")]
    UnderlyingProvider(#[from] ProviderError),

    #[error("Signer error: {0}")]
    Signer(#[from] SignerError),
}

/// Top-level error for a relay run. Every variant is reported and collapses
/// to the same nonzero process exit; the kind is diagnosable from logs only.
#[derive(Error, Debug)]
pub enum RelayerError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),
}
