use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chain_eth::Address;
use serde_json::{json, Value};
use tracing::debug;

use crate::context::OperationContext;
use crate::error::RpcError;

/// Block selector for state queries.
///
/// `prepare` always counts at [`BlockTag::Latest`]. The other tags are for
/// callers using a [`NonceSource`] directly, e.g. `Pending` to include their
/// own queued transactions or `Number` to read a historical count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    Latest,
    Pending,
    Earliest,
    Number(u64),
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockTag::Latest => f.write_str("latest"),
            BlockTag::Pending => f.write_str("pending"),
            BlockTag::Earliest => f.write_str("earliest"),
            BlockTag::Number(n) => write!(f, "{n:#x}"),
        }
    }
}

/// Source of account nonces (transaction counts).
#[async_trait]
pub trait NonceSource: Send + Sync {
    /// Returns the number of transactions sent from `address` as of `block`.
    /// Must return [`RpcError::Cancelled`] once `ctx` is cancelled.
    async fn nonce_at(
        &self,
        ctx: &OperationContext,
        address: Address,
        block: BlockTag,
    ) -> Result<u64, RpcError>;
}

/// JSON-RPC 2.0 client over HTTP.
pub struct JsonRpcNonceSource {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcNonceSource {
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, RpcError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| RpcError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });

        let response = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| RpcError::Network(format!("{method}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::UnexpectedStatus(status.as_u16()));
        }

        let mut value: Value = response
            .json()
            .await
            .map_err(|e| RpcError::Decode(format!("{method}: {e}")))?;

        if let Some(err) = value.get("error").filter(|e| !e.is_null()) {
            return Err(RpcError::Rpc {
                code: err.get("code").and_then(Value::as_i64).unwrap_or_default(),
                message: err
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            });
        }

        value
            .get_mut("result")
            .map(Value::take)
            .ok_or_else(|| RpcError::Decode(format!("{method}: missing result field")))
    }
}

#[async_trait]
impl NonceSource for JsonRpcNonceSource {
    async fn nonce_at(
        &self,
        ctx: &OperationContext,
        address: Address,
        block: BlockTag,
    ) -> Result<u64, RpcError> {
        debug!(%address, %block, "querying transaction count");

        let result = ctx
            .run(self.call(
                "eth_getTransactionCount",
                json!([address.to_lowercase_hex(), block.to_string()]),
            ))
            .await
            .ok_or(RpcError::Cancelled)??;

        let quantity = result.as_str().ok_or_else(|| {
            RpcError::Decode(format!("eth_getTransactionCount returned non-string: {result}"))
        })?;
        parse_hex_u64(quantity)
    }
}

/// Parses a `0x`-prefixed hex quantity.
pub fn parse_hex_u64(value: &str) -> Result<u64, RpcError> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| RpcError::Decode(format!("quantity missing 0x prefix: {value}")))?;
    if digits.is_empty() {
        return Err(RpcError::Decode("empty quantity".into()));
    }
    u64::from_str_radix(digits, 16)
        .map_err(|e| RpcError::Decode(format!("invalid quantity {value}: {e}")))
}
