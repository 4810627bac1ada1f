use std::fmt;
use std::str::FromStr;

use k256::ecdsa::VerifyingKey;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};

use crate::error::EthError;

/// A 20-byte Ethereum account address.
///
/// `Display` renders the EIP-55 checksummed form; comparisons between
/// addresses are byte-wise, so string case never matters once parsed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    /// Wraps raw address bytes.
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Derives the address of an uncompressed secp256k1 public key (65 bytes,
    /// starting with 0x04).
    ///
    /// The derivation takes the Keccak-256 hash of the 64-byte key (without
    /// the 0x04 tag) and keeps the last 20 bytes.
    pub fn from_public_key(uncompressed_pubkey: &[u8; 65]) -> Result<Self, EthError> {
        if uncompressed_pubkey[0] != 0x04 {
            return Err(EthError::InvalidAddress(
                "uncompressed key must start with 0x04".into(),
            ));
        }

        let hash = Keccak256::digest(&uncompressed_pubkey[1..]);

        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash[12..]);
        Ok(Self(bytes))
    }

    /// Derives the address of a k256 verifying key.
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(false);
        // An uncompressed SEC1 point is always 0x04 || x || y.
        let hash = Keccak256::digest(&point.as_bytes()[1..]);

        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash[12..]);
        Self(bytes)
    }

    /// Returns the raw address bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns the all-lowercase `0x`-prefixed hex form.
    pub fn to_lowercase_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Returns the EIP-55 mixed-case checksummed form.
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = Keccak256::digest(lower.as_bytes());

        let mut out = String::with_capacity(42);
        out.push_str("0x");

        for (i, c) in lower.chars().enumerate() {
            // Nibble i of the hash decides the case of character i.
            let byte = hash[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }

        out
    }
}

impl FromStr for Address {
    type Err = EthError;

    /// Parses a `0x`-prefixed, 40 hex character address in any letter case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_part = strip_hex_prefix(s)
            .ok_or_else(|| EthError::InvalidAddress("address must start with 0x".into()))?;

        if hex_part.len() != 40 {
            return Err(EthError::InvalidAddress(format!(
                "expected 40 hex characters, got {}",
                hex_part.len()
            )));
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(hex_part, &mut bytes)
            .map_err(|e| EthError::InvalidAddress(format!("invalid hex: {e}")))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Accepts `0x` or `0X`.
fn strip_hex_prefix(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}

/// Reports whether a string is a syntactically valid address: `0x` followed
/// by exactly 40 hex characters. Letter case is not checked against EIP-55.
pub fn validate_address(address: &str) -> bool {
    strip_hex_prefix(address).is_some_and(|hex_part| {
        hex_part.len() == 40 && hex_part.bytes().all(|b| b.is_ascii_hexdigit())
    })
}

/// Applies EIP-55 mixed-case checksum encoding to a `0x`-prefixed address
/// string of any case.
pub fn checksum_address(address: &str) -> Result<String, EthError> {
    let parsed: Address = address.parse()?;
    Ok(parsed.to_checksum())
}

/// Extracts the address carried in an indexed event topic.
///
/// Topics are 32-byte words with the address left-padded; the address is the
/// trailing 40 hex characters. The `0x` prefix is optional.
pub fn decode_topic_address(topic: &str) -> Result<Address, EthError> {
    let stripped = strip_hex_prefix(topic).unwrap_or(topic);
    if stripped.len() < 40 {
        return Err(EthError::InvalidAddress(format!(
            "unexpected length for address topic: {}",
            stripped.len()
        )));
    }
    let tail = stripped
        .get(stripped.len() - 40..)
        .ok_or_else(|| EthError::InvalidAddress("address topic is not hex".into()))?;
    format!("0x{tail}").parse()
}
