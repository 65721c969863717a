//! Explicit signing capability. Signing is always invoked as a visible step
//! by the transaction submitter, never attached transparently to the network
//! client, so a fake signer can be injected in tests.

use alloy::consensus::TxLegacy;
use alloy::primitives::{Address, TxKind};
use async_trait::async_trait;
use thiserror::Error;

use crate::models::EvmTransactionData;

mod local;
pub use local::*;

#[cfg(test)]
use mockall::automock;

#[derive(Error, Debug)]
pub enum SignerError {
    #[error("Invalid signing key: {0}")]
    InvalidKey(String),
    #[error("Failed to sign transaction: {0}")]
    Signing(String),
    #[error("Transaction not signable: {0}")]
    Conversion(String),
}

/// A signed transaction ready for broadcast.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    /// Hex-encoded transaction hash.
    pub hash: String,
    /// RLP-encoded signed transaction bytes.
    pub raw: Vec<u8>,
}

/// A key-bound signing capability.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait Signer: Send + Sync {
    /// Address of the account this signer controls.
    async fn address(&self) -> Result<Address, SignerError>;

    /// Signs a fully resolved transaction. Every fee field and the nonce must
    /// be set by the time this is called.
    async fn sign_transaction(
        &self,
        tx: &EvmTransactionData,
    ) -> Result<SignedTransaction, SignerError>;
}

impl TryFrom<&EvmTransactionData> for TxLegacy {
    type Error = SignerError;

    fn try_from(tx: &EvmTransactionData) -> Result<Self, Self::Error> {
        let nonce = tx
            .nonce
            .ok_or_else(|| SignerError::Conversion("nonce not resolved".to_string()))?;
        let gas_price = tx
            .gas_price
            .ok_or_else(|| SignerError::Conversion("gas price not resolved".to_string()))?;
        let gas_limit = tx
            .gas_limit
            .ok_or_else(|| SignerError::Conversion("gas limit not resolved".to_string()))?;

        Ok(TxLegacy {
            chain_id: Some(tx.chain_id),
            nonce,
            gas_price,
            gas_limit,
            to: TxKind::Call(tx.to),
            value: tx.value,
            input: tx.data.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, Bytes, U256};

    fn transaction_data() -> EvmTransactionData {
        EvmTransactionData {
            from: address!("742d35Cc6634C0532925a3b844Bc454e4438f44e"),
            to: address!("742d35Cc6634C0532925a3b844Bc454e4438f44f"),
            value: U256::from(7u64),
            data: Bytes::from(vec![0x01]),
            chain_id: 1,
            gas_limit: Some(21_000),
            gas_price: Some(20_000_000_000),
            nonce: Some(0),
        }
    }

    #[test]
    fn test_try_from_resolved_transaction() {
        let tx = transaction_data();
        let legacy = TxLegacy::try_from(&tx).unwrap();

        assert_eq!(legacy.chain_id, Some(1));
        assert_eq!(legacy.nonce, 0);
        assert_eq!(legacy.gas_price, 20_000_000_000);
        assert_eq!(legacy.gas_limit, 21_000);
        assert_eq!(legacy.to, TxKind::Call(tx.to));
        assert_eq!(legacy.value, U256::from(7u64));
    }

    #[test]
    fn test_try_from_rejects_unresolved_nonce() {
        let mut tx = transaction_data();
        tx.nonce = None;
        assert!(matches!(
            TxLegacy::try_from(&tx),
            Err(SignerError::Conversion(_))
        ));
    }

    #[test]
    fn test_try_from_rejects_unresolved_gas_price() {
        let mut tx = transaction_data();
        tx.gas_price = None;
        assert!(matches!(
            TxLegacy::try_from(&tx),
            Err(SignerError::Conversion(_))
        ));
    }
}
