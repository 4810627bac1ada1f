use std::fmt;

use k256::ecdsa::{RecoveryId, Signature, SigningKey};
use zeroize::Zeroize;

use crate::address::Address;
use crate::error::EthError;

/// Length of a recoverable signature: r (32) || s (32) || recovery id (1).
pub const SIGNATURE_LEN: usize = 65;

/// A secp256k1 signing key together with its derived Ethereum address.
///
/// The key material never leaves this type: it is not serializable and its
/// `Debug` output only shows the address. `SigningKey` zeroizes itself on drop.
#[derive(Clone)]
pub struct KeyIdentity {
    signing_key: SigningKey,
    address: Address,
}

impl KeyIdentity {
    /// Parses a hex-encoded 32-byte private key, with or without a `0x`
    /// prefix.
    pub fn from_hex(private_key: &str) -> Result<Self, EthError> {
        let trimmed = private_key.trim();
        let hex_str = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if hex_str.len() != 64 {
            return Err(EthError::InvalidKeyFormat(format!(
                "expected 64 hex characters, got {}",
                hex_str.len()
            )));
        }

        let mut key_bytes = [0u8; 32];
        if let Err(e) = hex::decode_to_slice(hex_str, &mut key_bytes) {
            key_bytes.zeroize();
            return Err(EthError::InvalidKeyFormat(format!("invalid hex: {e}")));
        }

        let identity = Self::from_bytes(&key_bytes);
        key_bytes.zeroize();
        identity
    }

    /// Builds an identity from a raw 32-byte scalar. Zero and values at or
    /// above the curve order are rejected.
    pub fn from_bytes(private_key: &[u8; 32]) -> Result<Self, EthError> {
        let signing_key = SigningKey::from_bytes(private_key.into())
            .map_err(|_| EthError::InvalidKeyFormat("scalar is not a valid secp256k1 key".into()))?;
        let address = Address::from_verifying_key(signing_key.verifying_key());

        Ok(Self {
            signing_key,
            address,
        })
    }

    /// The address derived from this identity's public key.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The uncompressed SEC1 public key (0x04 || x || y).
    pub fn public_key_uncompressed(&self) -> [u8; 65] {
        let point = self.signing_key.verifying_key().to_encoded_point(false);
        let mut out = [0u8; 65];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Signs a 32-byte prehash and returns `r || s || recovery_id`.
    ///
    /// Signatures are deterministic (RFC 6979) and low-s normalized. The last
    /// byte is the raw recovery id (0 or 1), not the legacy 27/28 form.
    pub fn sign_hash(&self, hash: &[u8; 32]) -> Result<[u8; SIGNATURE_LEN], EthError> {
        let (signature, recovery_id): (Signature, RecoveryId) = self
            .signing_key
            .sign_prehash_recoverable(hash)
            .map_err(|e| EthError::SigningError(e.to_string()))?;

        let mut out = [0u8; SIGNATURE_LEN];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = recovery_id.to_byte();
        Ok(out)
    }
}

impl fmt::Debug for KeyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyIdentity")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
