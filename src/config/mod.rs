//! Process configuration, read from the environment exactly once at startup.
//!
//! The resulting structs are immutable and passed by ownership into the job
//! wiring; nothing else in the crate touches the environment.

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use alloy::primitives::Address;
use strum_macros::EnumString;
use thiserror::Error;

use crate::constants::{
    DEFAULT_CONFIRMATION_TIMEOUT_SECS, DEFAULT_FRESHNESS_WINDOW_SECS, DEFAULT_GAS_LIMIT,
    DEFAULT_GAS_PRICE_GWEI, DEFAULT_GRAPH_TIMEOUT_SECS, DEFAULT_RECEIPT_POLL_INTERVAL_MS,
    DEFAULT_RPC_TIMEOUT_SECS, WEI_PER_GWEI,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    MissingEnv(&'static str),
    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Which relay job this process invocation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum RelayJobKind {
    RateSync,
    MaxLtv,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub rpc_timeout_secs: u64,
    pub private_key: String,
    pub chain_id: u64,
    pub confirmation_timeout_secs: u64,
    pub receipt_poll_interval_ms: u64,
    pub job: JobConfig,
}

#[derive(Debug, Clone)]
pub enum JobConfig {
    RateSync(RateSyncConfig),
    MaxLtv(MaxLtvConfig),
}

#[derive(Debug, Clone)]
pub struct RateSyncConfig {
    /// Feed contract carrying the last-update timestamp.
    pub rate_feed: Address,
    /// Sender contract quoting the sync cost and carrying the payable sync
    /// entry point.
    pub rate_feed_sender: Address,
    pub target_chain: u16,
    pub target_address: Address,
    pub freshness_window_secs: u64,
    pub gas_limit: u64,
    pub gas_price_wei: u128,
}

#[derive(Debug, Clone)]
pub struct MaxLtvConfig {
    pub tracker: Address,
    pub vault: Address,
    pub graph_api_url: String,
    pub graph_api_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let job_raw = required("RELAY_JOB")?;
        let job_kind = RelayJobKind::from_str(&job_raw).map_err(|_| ConfigError::Invalid {
            name: "RELAY_JOB",
            reason: format!("unknown job '{job_raw}', expected 'rate-sync' or 'max-ltv'"),
        })?;

        let job = match job_kind {
            RelayJobKind::RateSync => JobConfig::RateSync(RateSyncConfig::from_env()?),
            RelayJobKind::MaxLtv => JobConfig::MaxLtv(MaxLtvConfig::from_env()?),
        };

        Ok(Self {
            rpc_url: required("RPC_URL")?,
            rpc_timeout_secs: parsed_or("RPC_TIMEOUT_SECS", DEFAULT_RPC_TIMEOUT_SECS)?,
            private_key: required("PRIVATE_KEY")?,
            chain_id: parsed("CHAIN_ID")?,
            confirmation_timeout_secs: parsed_or(
                "CONFIRMATION_TIMEOUT_SECS",
                DEFAULT_CONFIRMATION_TIMEOUT_SECS,
            )?,
            receipt_poll_interval_ms: parsed_or(
                "RECEIPT_POLL_INTERVAL_MS",
                DEFAULT_RECEIPT_POLL_INTERVAL_MS,
            )?,
            job,
        })
    }
}

impl RateSyncConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            rate_feed: parsed("RATE_FEED")?,
            rate_feed_sender: parsed("RATE_FEED_SENDER")?,
            target_chain: parsed("TARGET_CHAIN")?,
            target_address: parsed("TARGET_ADDRESS")?,
            freshness_window_secs: parsed_or(
                "FRESHNESS_WINDOW_SECS",
                DEFAULT_FRESHNESS_WINDOW_SECS,
            )?,
            gas_limit: parsed_or("GAS_LIMIT", DEFAULT_GAS_LIMIT)?,
            gas_price_wei: parsed_or::<u128>("GAS_PRICE_GWEI", DEFAULT_GAS_PRICE_GWEI)?
                * WEI_PER_GWEI,
        })
    }
}

impl MaxLtvConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            tracker: parsed("LTV_TRACKER_CONTRACT_ADDRESS")?,
            vault: parsed("VAULT")?,
            graph_api_url: required("GRAPH_API_URL")?,
            graph_api_timeout_secs: parsed_or("GRAPH_API_TIMEOUT", DEFAULT_GRAPH_TIMEOUT_SECS)?,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingEnv(name))
}

fn parsed<T>(name: &'static str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    required(name)?.parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

fn parsed_or<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ALL_VARS: &[&str] = &[
        "RELAY_JOB",
        "RPC_URL",
        "RPC_TIMEOUT_SECS",
        "PRIVATE_KEY",
        "CHAIN_ID",
        "CONFIRMATION_TIMEOUT_SECS",
        "RECEIPT_POLL_INTERVAL_MS",
        "RATE_FEED",
        "RATE_FEED_SENDER",
        "TARGET_CHAIN",
        "TARGET_ADDRESS",
        "FRESHNESS_WINDOW_SECS",
        "GAS_LIMIT",
        "GAS_PRICE_GWEI",
        "LTV_TRACKER_CONTRACT_ADDRESS",
        "VAULT",
        "GRAPH_API_URL",
        "GRAPH_API_TIMEOUT",
    ];

    fn clear_env() {
        for var in ALL_VARS {
            env::remove_var(var);
        }
    }

    fn set_shared_env() {
        env::set_var("RPC_URL", "http://localhost:8545");
        env::set_var(
            "PRIVATE_KEY",
            "0101010101010101010101010101010101010101010101010101010101010101",
        );
        env::set_var("CHAIN_ID", "1");
    }

    fn set_rate_sync_env() {
        set_shared_env();
        env::set_var("RELAY_JOB", "rate-sync");
        env::set_var("RATE_FEED", "0x1000000000000000000000000000000000000001");
        env::set_var(
            "RATE_FEED_SENDER",
            "0x1000000000000000000000000000000000000002",
        );
        env::set_var("TARGET_CHAIN", "23");
        env::set_var(
            "TARGET_ADDRESS",
            "0x1000000000000000000000000000000000000003",
        );
    }

    #[test]
    #[serial]
    fn test_rate_sync_config_with_defaults() {
        clear_env();
        set_rate_sync_env();

        let config = Config::from_env().unwrap();
        assert_eq!(config.chain_id, 1);
        assert_eq!(config.rpc_timeout_secs, DEFAULT_RPC_TIMEOUT_SECS);
        assert_eq!(
            config.confirmation_timeout_secs,
            DEFAULT_CONFIRMATION_TIMEOUT_SECS
        );

        let JobConfig::RateSync(job) = config.job else {
            panic!("expected rate sync job config");
        };
        assert_eq!(job.target_chain, 23);
        assert_eq!(job.freshness_window_secs, 43_200);
        assert_eq!(job.gas_limit, 200_000);
        assert_eq!(job.gas_price_wei, 20_000_000_000);
    }

    #[test]
    #[serial]
    fn test_rate_sync_config_with_overrides() {
        clear_env();
        set_rate_sync_env();
        env::set_var("FRESHNESS_WINDOW_SECS", "3600");
        env::set_var("GAS_PRICE_GWEI", "50");

        let config = Config::from_env().unwrap();
        let JobConfig::RateSync(job) = config.job else {
            panic!("expected rate sync job config");
        };
        assert_eq!(job.freshness_window_secs, 3_600);
        assert_eq!(job.gas_price_wei, 50_000_000_000);
    }

    #[test]
    #[serial]
    fn test_max_ltv_config() {
        clear_env();
        set_shared_env();
        env::set_var("RELAY_JOB", "max-ltv");
        env::set_var(
            "LTV_TRACKER_CONTRACT_ADDRESS",
            "0x2000000000000000000000000000000000000001",
        );
        env::set_var("VAULT", "0x2000000000000000000000000000000000000002");
        env::set_var("GRAPH_API_URL", "http://localhost/graph");

        let config = Config::from_env().unwrap();
        let JobConfig::MaxLtv(job) = config.job else {
            panic!("expected max ltv job config");
        };
        assert_eq!(job.graph_api_url, "http://localhost/graph");
        assert_eq!(job.graph_api_timeout_secs, DEFAULT_GRAPH_TIMEOUT_SECS);
    }

    #[test]
    #[serial]
    fn test_missing_private_key_is_reported() {
        clear_env();
        set_rate_sync_env();
        env::remove_var("PRIVATE_KEY");

        let result = Config::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::MissingEnv("PRIVATE_KEY"))
        ));
    }

    #[test]
    #[serial]
    fn test_unknown_job_is_rejected() {
        clear_env();
        set_shared_env();
        env::set_var("RELAY_JOB", "mempool-sweeper");

        let result = Config::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                name: "RELAY_JOB",
                ..
            })
        ));
    }

    #[test]
    #[serial]
    fn test_malformed_address_is_rejected() {
        clear_env();
        set_rate_sync_env();
        env::set_var("RATE_FEED", "not-an-address");

        let result = Config::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                name: "RATE_FEED",
                ..
            })
        ));
    }
}
