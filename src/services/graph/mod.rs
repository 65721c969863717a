//! Subgraph query client.
//!
//! Issues the ranked allocator query and the vault harvest-parameter query
//! over HTTP with a bounded timeout. An empty result set is a valid outcome
//! (`Ok(None)`), distinct from transport or query failures.

use std::time::Duration;

use alloy::primitives::{
    aliases::{I160, U160},
    Address, B256,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

const ALLOCATORS_QUERY: &str = r#"
query AllocatorsQuery($vault: String) {
  allocators(
    first: 1
    orderBy: ltv
    orderDirection: desc
    where: { vault: $vault }
  ) {
    address
  }
}"#;

const HARVEST_PARAMS_QUERY: &str = r#"
query HarvestParamsQuery($vault: ID!) {
  vault(id: $vault) {
    rewardsRoot
    proofReward
    proofUnlockedMevReward
    proof
  }
}"#;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Query timeout")]
    Timeout,
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Query rejected (HTTP {status})")]
    Status { status: u16 },
    #[error("Query returned errors: {0}")]
    Graph(String),
    #[error("Response decode error: {0}")]
    Decode(String),
    #[error("Missing data: {0}")]
    MissingData(String),
}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return QueryError::Timeout;
        }
        QueryError::Transport(err.to_string())
    }
}

/// Harvest parameters for a vault, as tracked by the subgraph. Passed along
/// with the allocator address so the tracker contract can settle state before
/// recomputing the LTV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestParams {
    pub rewards_root: B256,
    pub reward: I160,
    pub unlocked_mev_reward: U160,
    pub proof: Vec<B256>,
}

/// Queries the relay jobs issue against the indexing service.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait GraphClientTrait: Send + Sync {
    /// Returns the allocator with the highest LTV in the vault, or `None`
    /// when the vault has no allocators. The subgraph returns lower-cased
    /// addresses; the result is the canonical checksummed address.
    async fn max_ltv_allocator(&self, vault: Address) -> Result<Option<Address>, QueryError>;

    /// Returns the vault's current harvest parameters. A vault without
    /// harvest data is an error, the tracker update cannot be built without
    /// them.
    async fn harvest_params(&self, vault: Address) -> Result<HarvestParams, QueryError>;
}

pub struct GraphClient {
    client: Client,
    url: String,
}

impl GraphClient {
    pub fn new(url: &str, timeout_seconds: u64) -> Result<Self, QueryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| QueryError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    async fn execute(
        &self,
        query: &'static str,
        variables: serde_json::Value,
    ) -> Result<serde_json::Value, QueryError> {
        let body = json!({ "query": query, "variables": variables });

        let response = self.client.post(&self.url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QueryError::Status {
                status: status.as_u16(),
            });
        }

        let graph_response: GraphQlResponse = response
            .json()
            .await
            .map_err(|e| QueryError::Decode(e.to_string()))?;

        if let Some(errors) = graph_response.errors {
            if !errors.is_empty() {
                let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
                return Err(QueryError::Graph(messages.join("; ")));
            }
        }

        graph_response
            .data
            .ok_or_else(|| QueryError::Decode("response carries no data".to_string()))
    }
}

#[async_trait]
impl GraphClientTrait for GraphClient {
    async fn max_ltv_allocator(&self, vault: Address) -> Result<Option<Address>, QueryError> {
        let variables = json!({ "vault": vault.to_string().to_lowercase() });
        let data = self.execute(ALLOCATORS_QUERY, variables).await?;

        let result: AllocatorsData =
            serde_json::from_value(data).map_err(|e| QueryError::Decode(e.to_string()))?;

        let Some(record) = result.allocators.into_iter().next() else {
            return Ok(None);
        };

        let address = record
            .address
            .parse::<Address>()
            .map_err(|e| QueryError::Decode(format!("invalid allocator address: {e}")))?;

        Ok(Some(address))
    }

    async fn harvest_params(&self, vault: Address) -> Result<HarvestParams, QueryError> {
        let variables = json!({ "vault": vault.to_string().to_lowercase() });
        let data = self.execute(HARVEST_PARAMS_QUERY, variables).await?;

        let result: VaultData =
            serde_json::from_value(data).map_err(|e| QueryError::Decode(e.to_string()))?;

        let vault_record = result
            .vault
            .ok_or_else(|| QueryError::MissingData(format!("vault {vault} is not indexed")))?;

        let (Some(rewards_root), Some(reward), Some(unlocked_mev_reward), Some(proof)) = (
            vault_record.rewards_root,
            vault_record.proof_reward,
            vault_record.proof_unlocked_mev_reward,
            vault_record.proof,
        ) else {
            return Err(QueryError::MissingData(format!(
                "vault {vault} has no harvest data yet"
            )));
        };

        Ok(HarvestParams {
            rewards_root: rewards_root
                .parse::<B256>()
                .map_err(|e| QueryError::Decode(format!("invalid rewards root: {e}")))?,
            reward: I160::from_dec_str(&reward)
                .map_err(|e| QueryError::Decode(format!("invalid proof reward: {e}")))?,
            unlocked_mev_reward: U160::from_str_radix(&unlocked_mev_reward, 10)
                .map_err(|e| QueryError::Decode(format!("invalid unlocked MEV reward: {e}")))?,
            proof: proof
                .iter()
                .map(|node| node.parse::<B256>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| QueryError::Decode(format!("invalid proof node: {e}")))?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<serde_json::Value>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct AllocatorsData {
    allocators: Vec<AllocatorRecord>,
}

#[derive(Debug, Deserialize)]
struct AllocatorRecord {
    address: String,
}

#[derive(Debug, Deserialize)]
struct VaultData {
    vault: Option<VaultRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VaultRecord {
    rewards_root: Option<String>,
    proof_reward: Option<String>,
    proof_unlocked_mev_reward: Option<String>,
    proof: Option<Vec<String>>,
}
