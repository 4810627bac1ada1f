//! Transaction authorization client for EVM chains.
//!
//! Combines a [`chain_eth::KeyIdentity`], the account nonce from a JSON-RPC
//! node and a fee quote from a gas station into a
//! [`chain_eth::TransactionAuthorization`]. Nothing here broadcasts, retries
//! or caches; each call returns its result or the first error it hits.

pub mod builder;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod gas;
pub mod rpc;

pub use client::EthClient;
pub use config::ClientConfig;
pub use context::{CancelHandle, OperationContext};
pub use error::{ClientError, GasError, RpcError};
pub use gas::{GasOracleClient, QuoteValidator, DEFAULT_GAS_STATION_URL};
pub use rpc::{BlockTag, JsonRpcNonceSource, NonceSource};
