use chain_eth::EthError;
use thiserror::Error;

/// Gas-oracle errors.
#[derive(Debug, Error)]
pub enum GasError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected status: {0}")]
    UnexpectedStatus(u16),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("operation cancelled")]
    Cancelled,
}

/// JSON-RPC node errors.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected status: {0}")]
    UnexpectedStatus(u16),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("operation cancelled")]
    Cancelled,
}

/// Errors surfaced by [`crate::EthClient`] and the authorization pipeline.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Identity(#[from] EthError),

    #[error("nonce fetch failed: {0}")]
    NonceFetch(RpcError),

    #[error("gas quote failed: {0}")]
    GasQuote(GasError),

    #[error("gas quote rejected: {0}")]
    QuoteRejected(String),

    #[error("operation cancelled")]
    Cancelled,
}

impl From<RpcError> for ClientError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Cancelled => ClientError::Cancelled,
            other => ClientError::NonceFetch(other),
        }
    }
}

impl From<GasError> for ClientError {
    fn from(err: GasError) -> Self {
        match err {
            GasError::Cancelled => ClientError::Cancelled,
            other => ClientError::GasQuote(other),
        }
    }
}
