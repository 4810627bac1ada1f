//! Ethereum/EVM primitives for transaction authorization and message signing.
//!
//! This crate provides:
//! - Address derivation from secp256k1 keys (with EIP-55 checksums)
//! - A `KeyIdentity` holding a signing key and its address
//! - EIP-191 personal message signing, verification and signer recovery
//! - Chain binding (`ChainContext`) and known EVM network definitions
//! - Gas quotes and the `TransactionAuthorization` handed to a signer
//!
//! Everything here is synchronous and free of I/O.

pub mod address;
pub mod authorization;
pub mod chains;
pub mod error;
pub mod identity;
pub mod message;

pub use address::Address;
pub use authorization::{GasQuote, TransactionAuthorization, DEFAULT_GAS_LIMIT};
pub use chains::ChainContext;
pub use error::EthError;
pub use identity::KeyIdentity;
pub use message::SignedMessage;
