//! Fee-estimation client for gas-station style oracles.
//!
//! The oracle answers a single `GET` with three fee tiers in Gwei. Only the
//! `fast` tier and the base-fee estimate feed a [`GasQuote`].

use std::time::Duration;

use chain_eth::chains::{POLYGON_GAS_STATION_URL, POLYGON_TESTNET_GAS_STATION_URL};
use chain_eth::GasQuote;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::context::OperationContext;
use crate::error::GasError;

/// Endpoint used when the caller does not configure one.
pub const DEFAULT_GAS_STATION_URL: &str = POLYGON_GAS_STATION_URL;

/// Public testnet endpoint of the default gas station.
pub const TESTNET_GAS_STATION_URL: &str = POLYGON_TESTNET_GAS_STATION_URL;

/// One fee tier, in Gwei.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeTier {
    pub max_priority_fee: f64,
    pub max_fee: f64,
}

/// The full gas-station response body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasStationResponse {
    #[serde(default)]
    pub safe_low: FeeTier,
    #[serde(default)]
    pub standard: FeeTier,
    pub fast: FeeTier,
    pub estimated_base_fee: f64,
    pub block_time: u64,
    pub block_number: u64,
}

impl GasStationResponse {
    pub fn quote(&self) -> GasQuote {
        GasQuote {
            max_fee_per_gas: self.fast.max_fee,
            max_priority_fee_per_gas: self.fast.max_priority_fee,
            estimated_base_fee: self.estimated_base_fee,
            block_number: self.block_number,
            block_time: self.block_time,
        }
    }
}

/// Decides whether an oracle quote is usable before it is turned into fee
/// caps. Return `Err` with a reason to reject the quote.
pub trait QuoteValidator: Send + Sync {
    fn validate(&self, quote: &GasQuote) -> Result<(), String>;
}

impl<F> QuoteValidator for F
where
    F: Fn(&GasQuote) -> Result<(), String> + Send + Sync,
{
    fn validate(&self, quote: &GasQuote) -> Result<(), String> {
        self(quote)
    }
}

/// Accepts every quote as reported by the oracle.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl QuoteValidator for AcceptAll {
    fn validate(&self, _quote: &GasQuote) -> Result<(), String> {
        Ok(())
    }
}

/// Rejects quotes whose fee cap is below the priority fee.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequireFeeOrdering;

impl QuoteValidator for RequireFeeOrdering {
    fn validate(&self, quote: &GasQuote) -> Result<(), String> {
        if quote.is_ordered() {
            Ok(())
        } else {
            Err(format!(
                "max fee {} gwei is below priority fee {} gwei",
                quote.max_fee_per_gas, quote.max_priority_fee_per_gas
            ))
        }
    }
}

/// HTTP client for a single gas-station endpoint.
#[derive(Debug, Clone)]
pub struct GasOracleClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GasOracleClient {
    /// Creates a client for `endpoint`, falling back to
    /// [`DEFAULT_GAS_STATION_URL`] when it is `None` or empty.
    pub fn new(endpoint: Option<String>) -> Result<Self, GasError> {
        Self::with_timeout(endpoint, None)
    }

    /// Like [`GasOracleClient::new`] with an overall request timeout.
    pub fn with_timeout(
        endpoint: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, GasError> {
        let endpoint = endpoint
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GAS_STATION_URL.to_string());

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| GasError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetches and decodes the full oracle response.
    pub async fn fetch_response(
        &self,
        ctx: &OperationContext,
    ) -> Result<GasStationResponse, GasError> {
        debug!(endpoint = %self.endpoint, "fetching gas quote");

        ctx.run(self.request())
            .await
            .ok_or(GasError::Cancelled)?
    }

    /// Fetches a [`GasQuote`] from the `fast` tier.
    pub async fn fetch_quote(&self, ctx: &OperationContext) -> Result<GasQuote, GasError> {
        let quote = self.fetch_response(ctx).await?.quote();
        debug!(
            max_fee = quote.max_fee_per_gas,
            max_priority_fee = quote.max_priority_fee_per_gas,
            block_number = quote.block_number,
            "gas quote received"
        );
        Ok(quote)
    }

    async fn request(&self) -> Result<GasStationResponse, GasError> {
        let response = self
            .http
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| GasError::Network(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(endpoint = %self.endpoint, status = status.as_u16(), "gas station returned non-200");
            return Err(GasError::UnexpectedStatus(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| GasError::Network(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| GasError::Decode(e.to_string()))
    }
}
