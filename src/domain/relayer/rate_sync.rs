//! Cross-chain rate sync job.
//!
//! Reads the feed's last-update timestamp, and when it is older than the
//! freshness window, propagates the rate to the target chain through the
//! sender contract, paying the quoted delivery cost as the attached value.

use alloy::primitives::Address;
use alloy::sol;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use log::info;

use super::RelayStrategy;
use crate::config::RateSyncConfig;
use crate::domain::transaction::{build_transaction, TransactionParams};
use crate::models::{EvmTransactionData, FeeMode, RelayerError};
use crate::services::provider::{read_request, EvmProviderTrait, ProviderError};
use crate::utils::now_unix;

sol! {
    interface IRateFeed {
        function latestTimestamp() external view returns (uint256 timestamp);
        function quoteRateSync(uint16 targetChain) external view returns (uint256 cost);
        function syncRate(uint16 targetChain, address targetAddress) external payable;
    }
}

/// Evidence that the feed is stale, produced by the staleness check.
#[derive(Debug, Clone, Copy)]
pub struct FeedStaleness {
    pub age_secs: u64,
}

pub struct RateSyncStrategy<P> {
    provider: P,
    config: RateSyncConfig,
    sender: Address,
    chain_id: u64,
}

impl<P> RateSyncStrategy<P> {
    pub fn new(provider: P, config: RateSyncConfig, sender: Address, chain_id: u64) -> Self {
        Self {
            provider,
            config,
            sender,
            chain_id,
        }
    }
}

#[async_trait]
impl<P> RelayStrategy for RateSyncStrategy<P>
where
    P: EvmProviderTrait,
{
    type Condition = FeedStaleness;

    fn name(&self) -> &'static str {
        "Rate sync"
    }

    async fn check_condition(&self) -> Result<Option<FeedStaleness>, RelayerError> {
        let calldata = IRateFeed::latestTimestampCall {}.abi_encode();
        let ret = self
            .provider
            .call_contract(&read_request(self.config.rate_feed, calldata))
            .await?;

        let last_update = IRateFeed::latestTimestampCall::abi_decode_returns(&ret, true)
            .map_err(|e| ProviderError::Decode(e.to_string()))?
            .timestamp;
        let last_update = u64::try_from(last_update)
            .map_err(|_| ProviderError::Decode("timestamp exceeds u64 range".to_string()))?;

        let age_secs = now_unix().saturating_sub(last_update);
        if age_secs < self.config.freshness_window_secs {
            info!(
                "Last rate update {age_secs}s ago, within the {}s freshness window; no action needed",
                self.config.freshness_window_secs
            );
            return Ok(None);
        }

        Ok(Some(FeedStaleness { age_secs }))
    }

    async fn fetch_value(
        &self,
        staleness: FeedStaleness,
    ) -> Result<EvmTransactionData, RelayerError> {
        // The delivery cost tracks on-chain state; it is read here, after
        // the staleness decision and immediately before submission
        let calldata = IRateFeed::quoteRateSyncCall {
            targetChain: self.config.target_chain,
        }
        .abi_encode();
        let ret = self
            .provider
            .call_contract(&read_request(self.config.rate_feed_sender, calldata))
            .await?;

        let cost = IRateFeed::quoteRateSyncCall::abi_decode_returns(&ret, true)
            .map_err(|e| ProviderError::Decode(e.to_string()))?
            .cost;

        info!(
            "Rate feed is {}s stale, syncing to chain {} at cost {cost}",
            staleness.age_secs, self.config.target_chain
        );

        let calldata = IRateFeed::syncRateCall {
            targetChain: self.config.target_chain,
            targetAddress: self.config.target_address,
        }
        .abi_encode();

        Ok(build_transaction(TransactionParams {
            from: self.sender,
            to: self.config.rate_feed_sender,
            value: cost,
            data: calldata.into(),
            chain_id: self.chain_id,
            fee_mode: FeeMode::Fixed {
                gas_limit: self.config.gas_limit,
                gas_price: self.config.gas_price_wei,
            },
        }))
    }
}
