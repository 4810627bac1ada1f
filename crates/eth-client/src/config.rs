use std::time::Duration;

use chain_eth::DEFAULT_GAS_LIMIT;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

use crate::error::ClientError;

pub const ENV_RPC_URL: &str = "ETH_RPC_URL";
pub const ENV_CHAIN_ID: &str = "ETH_CHAIN_ID";
pub const ENV_PRIVATE_KEY: &str = "ETH_PRIVATE_KEY";
pub const ENV_GAS_STATION_URL: &str = "ETH_GAS_STATION_URL";
pub const ENV_GAS_LIMIT: &str = "ETH_GAS_LIMIT";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "ETH_REQUEST_TIMEOUT_SECS";

/// Settings for an [`crate::EthClient`].
///
/// The private key is held as a [`SecretString`], so `Debug` output redacts it.
#[derive(Debug, Deserialize)]
pub struct ClientConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    #[serde(deserialize_with = "deserialize_secret")]
    pub private_key: SecretString,
    /// Gas-station endpoint; `None` selects the built-in default.
    #[serde(default)]
    pub gas_station_url: Option<String>,
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl ClientConfig {
    pub fn new(rpc_url: impl Into<String>, chain_id: u64, private_key: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            chain_id,
            private_key: SecretString::from(private_key.into()),
            gas_station_url: None,
            gas_limit: DEFAULT_GAS_LIMIT,
            request_timeout_secs: None,
        }
    }

    /// Reads the configuration from `ETH_*` environment variables.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ClientError::Config(format!("{key} is not set")))
        };

        let mut config = Self::new(
            required(ENV_RPC_URL)?,
            parse_number(ENV_CHAIN_ID, &required(ENV_CHAIN_ID)?)?,
            required(ENV_PRIVATE_KEY)?,
        );

        config.gas_station_url = lookup(ENV_GAS_STATION_URL).filter(|v| !v.trim().is_empty());
        if let Some(limit) = lookup(ENV_GAS_LIMIT) {
            config.gas_limit = parse_number(ENV_GAS_LIMIT, &limit)?;
        }
        if let Some(secs) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
            config.request_timeout_secs = Some(parse_number(ENV_REQUEST_TIMEOUT_SECS, &secs)?);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.rpc_url.trim().is_empty() {
            return Err(ClientError::Config("rpc_url must not be empty".into()));
        }
        if self.gas_limit == 0 {
            return Err(ClientError::Config("gas_limit must be positive".into()));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ClientError::Config("request_timeout_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

fn default_gas_limit() -> u64 {
    DEFAULT_GAS_LIMIT
}

fn deserialize_secret<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

fn parse_number(key: &str, value: &str) -> Result<u64, ClientError> {
    value
        .trim()
        .parse()
        .map_err(|e| ClientError::Config(format!("{key}: {e}")))
}
