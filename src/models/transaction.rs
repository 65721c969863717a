use alloy::network::AnyTransactionReceipt;
use alloy::primitives::{Address, Bytes, U256};

pub type TransactionReceipt = AnyTransactionReceipt;

/// How the network fee fields of a transaction are determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeMode {
    /// Gas limit and gas price are left unset and resolved from the chain
    /// immediately before signing.
    AtSubmit,
    /// Explicit legacy fee parameters, known at build time.
    Fixed { gas_limit: u64, gas_price: u128 },
}

/// A legacy-shape EVM transaction request. Built once per run; the submitter
/// fills the `None` fields from chain state immediately before signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvmTransactionData {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub chain_id: u64,
    pub gas_limit: Option<u64>,
    pub gas_price: Option<u128>,
    pub nonce: Option<u64>,
}
