//! Default tuning values for the relay jobs. Every one of these can be
//! overridden through the environment, see `config`.

/// Maximum permitted age of the last on-chain rate update before a sync is
/// required (twelve hours).
pub const DEFAULT_FRESHNESS_WINDOW_SECS: u64 = 12 * 60 * 60;

/// Timeout for a single JSON-RPC request.
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 30;

/// Timeout for a single subgraph query.
pub const DEFAULT_GRAPH_TIMEOUT_SECS: u64 = 10;

/// Bounded wait for a transaction receipt before the run gives up.
pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 120;

/// Interval between receipt polls while waiting for confirmation.
pub const DEFAULT_RECEIPT_POLL_INTERVAL_MS: u64 = 2_000;

/// Gas limit for the pre-built rate sync transaction.
pub const DEFAULT_GAS_LIMIT: u64 = 200_000;

/// Gas price for the pre-built rate sync transaction, in gwei.
pub const DEFAULT_GAS_PRICE_GWEI: u128 = 20;

pub const WEI_PER_GWEI: u128 = 1_000_000_000;
