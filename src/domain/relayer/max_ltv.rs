//! Vault max-LTV tracker job.
//!
//! Asks the subgraph for the allocator with the highest loan-to-value ratio
//! in the vault and writes it to the tracker contract, passing the vault's
//! current harvest parameters along. Runs unconditionally whenever an
//! eligible allocator exists; there is no staleness window.

use alloy::primitives::{Address, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use log::{info, warn};

use super::RelayStrategy;
use crate::config::MaxLtvConfig;
use crate::domain::transaction::{build_transaction, TransactionParams};
use crate::models::{EvmTransactionData, FeeMode, RelayerError};
use crate::services::graph::GraphClientTrait;

sol! {
    interface IVaultUserLtvTracker {
        struct HarvestParams {
            bytes32 rewardsRoot;
            int160 reward;
            uint160 unlockedMevReward;
            bytes32[] proof;
        }

        function updateVaultMaxLtvUser(
            address vault,
            address user,
            HarvestParams calldata harvestParams
        ) external;
    }
}

pub struct MaxLtvStrategy<G> {
    graph: G,
    config: MaxLtvConfig,
    sender: Address,
    chain_id: u64,
}

impl<G> MaxLtvStrategy<G> {
    pub fn new(graph: G, config: MaxLtvConfig, sender: Address, chain_id: u64) -> Self {
        Self {
            graph,
            config,
            sender,
            chain_id,
        }
    }
}

#[async_trait]
impl<G> RelayStrategy for MaxLtvStrategy<G>
where
    G: GraphClientTrait,
{
    type Condition = Address;

    fn name(&self) -> &'static str {
        "Max LTV update"
    }

    async fn check_condition(&self) -> Result<Option<Address>, RelayerError> {
        let Some(user) = self.graph.max_ltv_allocator(self.config.vault).await? else {
            warn!("No allocators in vault {}", self.config.vault);
            return Ok(None);
        };

        Ok(Some(user))
    }

    async fn fetch_value(&self, user: Address) -> Result<EvmTransactionData, RelayerError> {
        let harvest = self.graph.harvest_params(self.config.vault).await?;

        info!(
            "Updating max LTV user of vault {} to {user}",
            self.config.vault
        );

        let calldata = IVaultUserLtvTracker::updateVaultMaxLtvUserCall {
            vault: self.config.vault,
            user,
            harvestParams: IVaultUserLtvTracker::HarvestParams {
                rewardsRoot: harvest.rewards_root,
                reward: harvest.reward,
                unlockedMevReward: harvest.unlocked_mev_reward,
                proof: harvest.proof,
            },
        }
        .abi_encode();

        Ok(build_transaction(TransactionParams {
            from: self.sender,
            to: self.config.tracker,
            value: U256::ZERO,
            data: calldata.into(),
            chain_id: self.chain_id,
            fee_mode: FeeMode::AtSubmit,
        }))
    }
}
