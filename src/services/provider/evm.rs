//! EVM provider for the read and broadcast calls a relay run needs.
//!
//! One request attempt per call, no internal retry: a transient RPC failure
//! surfaces to the orchestrator and aborts the run, and the external
//! scheduler retries on its next invocation.

use std::time::Duration;

use alloy::{
    network::AnyNetwork,
    primitives::{Address, Bytes, TxKind},
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    rpc::{
        client::ClientBuilder,
        types::{TransactionInput, TransactionRequest},
    },
    transports::http::Http,
};
use async_trait::async_trait;
use log::debug;
use reqwest::ClientBuilder as ReqwestClientBuilder;

use super::ProviderError;
use crate::models::{EvmTransactionData, TransactionReceipt};

#[cfg(test)]
use mockall::automock;

type EvmProviderInner = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<AnyNetwork>,
    AnyNetwork,
>;

/// Trait defining the chain interactions a relay run performs.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait EvmProviderTrait: Send + Sync {
    /// Executes a read-only contract call and returns the raw return data.
    /// Decoding per the expected return type happens at the call site.
    async fn call_contract(&self, tx: &TransactionRequest) -> Result<Bytes, ProviderError>;

    /// Gets the transaction count (nonce) for an address.
    async fn get_transaction_count(&self, address: Address) -> Result<u64, ProviderError>;

    /// Gets the current gas price from the network.
    async fn get_gas_price(&self) -> Result<u128, ProviderError>;

    /// Estimates the gas required for a transaction.
    async fn estimate_gas(&self, tx: &EvmTransactionData) -> Result<u64, ProviderError>;

    /// Broadcasts a signed raw transaction, returning its hash.
    async fn send_raw_transaction(&self, tx: &[u8]) -> Result<String, ProviderError>;

    /// Gets a transaction receipt by hash; `None` while not yet mined.
    async fn get_transaction_receipt(
        &self,
        tx_hash: &str,
    ) -> Result<Option<TransactionReceipt>, ProviderError>;
}

/// Provider implementation for EVM-compatible networks, wrapping an HTTP RPC
/// client with a bounded per-request timeout.
#[derive(Clone)]
pub struct EvmProvider {
    provider: EvmProviderInner,
}

impl EvmProvider {
    pub fn new(url: &str, timeout_seconds: u64) -> Result<Self, ProviderError> {
        if url.is_empty() {
            return Err(ProviderError::NetworkConfiguration(
                "An RPC URL must be provided".to_string(),
            ));
        }

        let rpc_url = url
            .parse()
            .map_err(|e| ProviderError::NetworkConfiguration(format!("Invalid URL format: {e}")))?;

        // Using use_rustls_tls() forces the use of rustls instead of native-tls to support TLS 1.3
        let client = ReqwestClientBuilder::new()
            .timeout(Duration::from_secs(timeout_seconds))
            .use_rustls_tls()
            .build()
            .map_err(|e| ProviderError::Other(format!("Failed to build HTTP client: {e}")))?;

        let mut transport = Http::new(rpc_url);
        transport.set_client(client);

        let is_local = transport.guess_local();
        let client = ClientBuilder::default().transport(transport, is_local);

        let provider = ProviderBuilder::new()
            .network::<AnyNetwork>()
            .connect_client(client);

        Ok(Self { provider })
    }
}

#[async_trait]
impl EvmProviderTrait for EvmProvider {
    async fn call_contract(&self, tx: &TransactionRequest) -> Result<Bytes, ProviderError> {
        self.provider
            .call(tx.clone().into())
            .await
            .map_err(ProviderError::from)
    }

    async fn get_transaction_count(&self, address: Address) -> Result<u64, ProviderError> {
        self.provider
            .get_transaction_count(address)
            .await
            .map_err(ProviderError::from)
    }

    async fn get_gas_price(&self) -> Result<u128, ProviderError> {
        self.provider.get_gas_price().await.map_err(ProviderError::from)
    }

    async fn estimate_gas(&self, tx: &EvmTransactionData) -> Result<u64, ProviderError> {
        let tx_req = TransactionRequest::from(tx);
        self.provider
            .estimate_gas(tx_req.into())
            .await
            .map_err(ProviderError::from)
    }

    async fn send_raw_transaction(&self, tx: &[u8]) -> Result<String, ProviderError> {
        let pending_tx = self
            .provider
            .send_raw_transaction(tx)
            .await
            .map_err(ProviderError::from)?;

        let tx_hash = pending_tx.tx_hash().to_string();
        debug!("Raw transaction broadcast, hash: {tx_hash}");
        Ok(tx_hash)
    }

    async fn get_transaction_receipt(
        &self,
        tx_hash: &str,
    ) -> Result<Option<TransactionReceipt>, ProviderError> {
        let parsed_tx_hash = tx_hash
            .parse::<alloy::primitives::TxHash>()
            .map_err(|e| ProviderError::Other(format!("Invalid transaction hash: {e}")))?;

        self.provider
            .get_transaction_receipt(parsed_tx_hash)
            .await
            .map_err(ProviderError::from)
    }
}

/// Builds the request for a read-only (view) contract call.
pub fn read_request(to: Address, calldata: Vec<u8>) -> TransactionRequest {
    TransactionRequest {
        to: Some(TxKind::Call(to)),
        input: TransactionInput::from(Bytes::from(calldata)),
        ..Default::default()
    }
}

impl From<&EvmTransactionData> for TransactionRequest {
    fn from(tx: &EvmTransactionData) -> Self {
        TransactionRequest {
            from: Some(tx.from),
            to: Some(TxKind::Call(tx.to)),
            value: Some(tx.value),
            input: TransactionInput::from(tx.data.clone()),
            gas_price: tx.gas_price,
            gas: tx.gas_limit,
            nonce: tx.nonce,
            chain_id: Some(tx.chain_id),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, U256};

    #[test]
    fn test_new_rejects_empty_url() {
        let result = EvmProvider::new("", 30);
        assert!(matches!(
            result,
            Err(ProviderError::NetworkConfiguration(_))
        ));
    }

    #[test]
    fn test_new_rejects_malformed_url() {
        let result = EvmProvider::new("not a url", 30);
        assert!(matches!(
            result,
            Err(ProviderError::NetworkConfiguration(_))
        ));
    }

    #[test]
    fn test_read_request_carries_target_and_calldata() {
        let to = address!("742d35Cc6634C0532925a3b844Bc454e4438f44e");
        let request = read_request(to, vec![0xaa, 0xbb]);

        assert_eq!(request.to, Some(TxKind::Call(to)));
        assert_eq!(
            request.input.input().cloned(),
            Some(Bytes::from(vec![0xaa, 0xbb]))
        );
        assert!(request.from.is_none());
    }

    #[test]
    fn test_transaction_request_from_evm_transaction_data() {
        let tx = EvmTransactionData {
            from: address!("742d35Cc6634C0532925a3b844Bc454e4438f44e"),
            to: address!("742d35Cc6634C0532925a3b844Bc454e4438f44f"),
            value: U256::from(1_000_000_000_000_000_000u64),
            data: Bytes::from(vec![0x01, 0x02]),
            chain_id: 1,
            gas_limit: Some(200_000),
            gas_price: Some(20_000_000_000),
            nonce: Some(3),
        };

        let request = TransactionRequest::from(&tx);
        assert_eq!(request.from, Some(tx.from));
        assert_eq!(request.to, Some(TxKind::Call(tx.to)));
        assert_eq!(request.value, Some(tx.value));
        assert_eq!(request.gas, Some(200_000));
        assert_eq!(request.gas_price, Some(20_000_000_000));
        assert_eq!(request.nonce, Some(3));
        assert_eq!(request.chain_id, Some(1));
    }
}
