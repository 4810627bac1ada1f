use thiserror::Error;

/// Ethereum key, address and signature errors.
#[derive(Debug, Error)]
pub enum EthError {
    #[error("invalid key format: {0}")]
    InvalidKeyFormat(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("recovery error: {0}")]
    Recovery(String),
}
