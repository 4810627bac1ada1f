use chain_eth::message;
use chain_eth::{Address, ChainContext, KeyIdentity, SignedMessage, TransactionAuthorization};
use secrecy::ExposeSecret;

use crate::builder;
use crate::config::ClientConfig;
use crate::context::OperationContext;
use crate::error::ClientError;
use crate::gas::{AcceptAll, GasOracleClient, QuoteValidator};
use crate::rpc::{JsonRpcNonceSource, NonceSource};

/// A signing identity bound to one chain, with the collaborators needed to
/// price and number its transactions.
///
/// All fields are fixed at construction; every call works from its own
/// arguments and owns its own requests.
pub struct EthClient {
    identity: KeyIdentity,
    chain: ChainContext,
    nonces: Box<dyn NonceSource>,
    gas_oracle: GasOracleClient,
    gas_limit: u64,
    validator: Box<dyn QuoteValidator>,
}

impl EthClient {
    /// Builds a client from configuration: parses the key, and connects a
    /// JSON-RPC nonce source and gas oracle with the configured timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let identity = KeyIdentity::from_hex(config.private_key.expose_secret())?;
        let timeout = config.request_timeout();
        let nonces = JsonRpcNonceSource::new(config.rpc_url.clone(), timeout)
            .map_err(|e| ClientError::Config(e.to_string()))?;
        let gas_oracle = GasOracleClient::with_timeout(config.gas_station_url.clone(), timeout)
            .map_err(|e| ClientError::Config(e.to_string()))?;

        tracing::debug!(
            address = %identity.address(),
            chain_id = config.chain_id,
            gas_station = gas_oracle.endpoint(),
            "client configured"
        );

        Ok(Self::with_parts(
            identity,
            ChainContext::new(config.chain_id),
            Box::new(nonces),
            gas_oracle,
        )
        .with_gas_limit(config.gas_limit))
    }

    /// Assembles a client from already-built parts.
    pub fn with_parts(
        identity: KeyIdentity,
        chain: ChainContext,
        nonces: Box<dyn NonceSource>,
        gas_oracle: GasOracleClient,
    ) -> Self {
        Self {
            identity,
            chain,
            nonces,
            gas_oracle,
            gas_limit: chain_eth::DEFAULT_GAS_LIMIT,
            validator: Box::new(AcceptAll),
        }
    }

    /// Sets the gas limit used when `prepare` is not given one.
    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    /// Installs a check run on every gas quote before it is used.
    pub fn with_quote_validator(mut self, validator: impl QuoteValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub fn address(&self) -> Address {
        self.identity.address()
    }

    pub fn chain(&self) -> ChainContext {
        self.chain
    }

    pub fn identity(&self) -> &KeyIdentity {
        &self.identity
    }

    pub fn gas_oracle(&self) -> &GasOracleClient {
        &self.gas_oracle
    }

    /// Fetches the nonce and a fresh gas quote and returns a ready-to-sign
    /// authorization. `gas_limit` overrides the client default for this call.
    pub async fn prepare(
        &self,
        ctx: &OperationContext,
        gas_limit: Option<u64>,
    ) -> Result<TransactionAuthorization, ClientError> {
        builder::prepare(
            ctx,
            &self.identity,
            self.chain,
            self.nonces.as_ref(),
            &self.gas_oracle,
            gas_limit.unwrap_or(self.gas_limit),
            self.validator.as_ref(),
        )
        .await
    }

    /// Signs `message` as an EIP-191 personal message; returns bare hex.
    pub fn sign_message(&self, message: &str) -> Result<String, ClientError> {
        Ok(message::sign_message(message, &self.identity)?)
    }

    /// Signs `message` and keeps it alongside the signature.
    pub fn sign(&self, message: &str) -> Result<SignedMessage, ClientError> {
        Ok(message::sign(message, &self.identity)?)
    }
}
