//! EIP-191 personal message signing and verification.
//!
//! A message is framed as `"\x19Ethereum Signed Message:\n" || len || message`,
//! where `len` is the decimal byte length, and the frame is hashed with
//! Keccak-256 before signing. Verification recovers the signer's public key
//! from the signature and compares the derived address.

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};

use crate::address::Address;
use crate::error::EthError;
use crate::identity::{KeyIdentity, SIGNATURE_LEN};

/// Prefix prepended to every personal message before hashing.
pub const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// A message together with its 65-byte recoverable signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedMessage {
    pub message: String,
    pub signature: [u8; SIGNATURE_LEN],
}

impl SignedMessage {
    /// The signature as bare lowercase hex (no `0x`).
    pub fn signature_hex(&self) -> String {
        hex::encode(self.signature)
    }

    /// Checks this signature against a claimed signer address.
    pub fn verify(&self, claimed_address: &str) -> Result<bool, EthError> {
        let signer = recover_signer(&hash_message(self.message.as_bytes()), &self.signature)?;
        Ok(addresses_match(&signer, claimed_address))
    }
}

/// The bytes that precede a message of `len` bytes in its frame: the prefix
/// followed by `len` in decimal.
fn frame_header(len: usize) -> String {
    format!("{PERSONAL_MESSAGE_PREFIX}{len}")
}

/// Returns the framed byte sequence that gets hashed for signing.
pub fn prepare_message(message: &str) -> Vec<u8> {
    let header = frame_header(message.len());
    let mut framed = Vec::with_capacity(header.len() + message.len());
    framed.extend_from_slice(header.as_bytes());
    framed.extend_from_slice(message.as_bytes());
    framed
}

/// Keccak-256 of the personal-message frame around `message`.
pub fn hash_message(message: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(frame_header(message.len()).as_bytes());
    hasher.update(message);
    hasher.finalize().into()
}

/// Signs `message` and returns the signature alongside it.
pub fn sign(message: &str, identity: &KeyIdentity) -> Result<SignedMessage, EthError> {
    let signature = identity.sign_hash(&hash_message(message.as_bytes()))?;
    Ok(SignedMessage {
        message: message.to_owned(),
        signature,
    })
}

/// Signs `message` and returns the 65-byte signature as bare hex.
pub fn sign_message(message: &str, identity: &KeyIdentity) -> Result<String, EthError> {
    sign(message, identity).map(|signed| signed.signature_hex())
}

/// Recovers the address that produced `signature_hex` over `message`.
pub fn recover_address(message: &str, signature_hex: &str) -> Result<Address, EthError> {
    let signature = decode_signature(signature_hex)?;
    recover_signer(&hash_message(message.as_bytes()), &signature)
}

/// Verifies that `signature_hex` over `message` was produced by
/// `claimed_address`.
///
/// A well-formed signature from a different signer yields `Ok(false)`. The
/// address comparison ignores letter case; a claimed address that is not a
/// valid address never matches.
pub fn verify_signature(
    message: &str,
    signature_hex: &str,
    claimed_address: &str,
) -> Result<bool, EthError> {
    let signer = recover_address(message, signature_hex)?;
    Ok(addresses_match(&signer, claimed_address))
}

/// Decodes a 65-byte signature from hex, with or without `0x`.
pub fn decode_signature(signature_hex: &str) -> Result<[u8; SIGNATURE_LEN], EthError> {
    let trimmed = signature_hex.trim();
    let hex_str = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let bytes = hex::decode(hex_str).map_err(|e| EthError::Decode(format!("invalid hex: {e}")))?;
    bytes.as_slice().try_into().map_err(|_| {
        EthError::Decode(format!(
            "signature must be {SIGNATURE_LEN} bytes, got {}",
            bytes.len()
        ))
    })
}

fn recover_signer(hash: &[u8; 32], signature: &[u8; SIGNATURE_LEN]) -> Result<Address, EthError> {
    let sig = Signature::from_slice(&signature[..64])
        .map_err(|e| EthError::Recovery(format!("invalid signature scalars: {e}")))?;

    // Legacy signers emit v = 27/28.
    let v = signature[64];
    let v = if v >= 27 { v - 27 } else { v };
    let recid = RecoveryId::from_byte(v)
        .ok_or_else(|| EthError::Recovery(format!("invalid recovery id {}", signature[64])))?;

    let key = VerifyingKey::recover_from_prehash(hash, &sig, recid)
        .map_err(|e| EthError::Recovery(e.to_string()))?;
    Ok(Address::from_verifying_key(&key))
}

fn addresses_match(signer: &Address, claimed: &str) -> bool {
    claimed
        .trim()
        .parse::<Address>()
        .map(|claimed| claimed == *signer)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;
    use rand::{Rng, RngCore};

    /// Well-known test private key (DO NOT use on mainnet).
    const TEST_KEY_HEX: &str =
        "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
    const TEST_KEY_ADDRESS: &str = "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23";
    const OTHER_ADDRESS: &str = "0x000000000000000000000000000000000000dEaD";

    fn identity() -> KeyIdentity {
        KeyIdentity::from_hex(TEST_KEY_HEX).unwrap()
    }

    fn random_identity() -> KeyIdentity {
        loop {
            let mut key = [0u8; 32];
            OsRng.fill_bytes(&mut key);
            if let Ok(identity) = KeyIdentity::from_bytes(&key) {
                return identity;
            }
        }
    }

    #[test]
    fn prepare_message_frames_with_byte_length() {
        assert_eq!(prepare_message("hello"), b"\x19Ethereum Signed Message:\n5hello");
        assert_eq!(prepare_message(""), b"\x19Ethereum Signed Message:\n0");
        // "héllo" is 6 bytes in UTF-8.
        assert_eq!(prepare_message("héllo"), "\x19Ethereum Signed Message:\n6héllo".as_bytes());
    }

    #[test]
    fn hash_message_matches_frame_hash() {
        for msg in ["", "hello", "héllo wörld ✓"] {
            let expected: [u8; 32] = Keccak256::digest(prepare_message(msg)).into();
            assert_eq!(hash_message(msg.as_bytes()), expected);
        }
    }

    #[test]
    fn hash_message_known_vector() {
        // keccak256("\x19Ethereum Signed Message:\n11hello world")
        assert_eq!(
            hex::encode(hash_message(b"hello world")),
            "d9eba16ed0ecae432b71fe008c98cc872bb4cc214d3220a36f365326cf807d68"
        );
    }

    #[test]
    fn sign_hello_verifies_against_own_address() {
        let sig = sign_message("hello", &identity()).unwrap();
        assert_eq!(sig.len(), 130);
        assert!(!sig.starts_with("0x"));
        assert!(verify_signature("hello", &sig, TEST_KEY_ADDRESS).unwrap());
    }

    #[test]
    fn sign_hello_fails_against_other_address() {
        let sig = sign_message("hello", &identity()).unwrap();
        assert!(!verify_signature("hello", &sig, OTHER_ADDRESS).unwrap());
    }

    #[test]
    fn verify_is_case_insensitive() {
        let sig = sign_message("hello", &identity()).unwrap();
        assert!(verify_signature("hello", &sig, &TEST_KEY_ADDRESS.to_lowercase()).unwrap());
        let upper = format!("0x{}", TEST_KEY_ADDRESS[2..].to_uppercase());
        assert!(verify_signature("hello", &sig, &upper).unwrap());
    }

    #[test]
    fn verify_accepts_prefixed_signature() {
        let sig = sign_message("hello", &identity()).unwrap();
        assert!(verify_signature("hello", &format!("0x{sig}"), TEST_KEY_ADDRESS).unwrap());
    }

    #[test]
    fn verify_accepts_legacy_v() {
        let mut signed = sign("hello", &identity()).unwrap();
        signed.signature[64] += 27;
        assert!(verify_signature("hello", &signed.signature_hex(), TEST_KEY_ADDRESS).unwrap());
    }

    #[test]
    fn verify_different_message_is_false() {
        let sig = sign_message("hello", &identity()).unwrap();
        assert!(!verify_signature("hellO", &sig, TEST_KEY_ADDRESS).unwrap());
    }

    #[test]
    fn verify_malformed_claimed_address_is_false() {
        let sig = sign_message("hello", &identity()).unwrap();
        assert!(!verify_signature("hello", &sig, "not-an-address").unwrap());
    }

    #[test]
    fn verify_rejects_non_hex_signature() {
        let result = verify_signature("hello", "zz", TEST_KEY_ADDRESS);
        assert!(matches!(result, Err(EthError::Decode(_))));
    }

    #[test]
    fn verify_rejects_wrong_length_signature() {
        let result = verify_signature("hello", &"ab".repeat(64), TEST_KEY_ADDRESS);
        assert!(matches!(result, Err(EthError::Decode(_))));
    }

    #[test]
    fn verify_rejects_bad_recovery_id() {
        let mut signed = sign("hello", &identity()).unwrap();
        signed.signature[64] = 9;
        let result = verify_signature("hello", &signed.signature_hex(), TEST_KEY_ADDRESS);
        assert!(matches!(result, Err(EthError::Recovery(_))));
    }

    #[test]
    fn verify_rejects_zero_scalars() {
        let sig = [0u8; SIGNATURE_LEN];
        let result = verify_signature("hello", &hex::encode(sig), TEST_KEY_ADDRESS);
        assert!(matches!(result, Err(EthError::Recovery(_))));
    }

    #[test]
    fn single_bit_flips_never_verify() {
        let signed = sign("hello", &identity()).unwrap();
        for byte in 0..SIGNATURE_LEN {
            for bit in 0..8 {
                let mut tampered = signed.signature;
                tampered[byte] ^= 1 << bit;
                match verify_signature("hello", &hex::encode(tampered), TEST_KEY_ADDRESS) {
                    Ok(valid) => assert!(!valid, "flip of byte {byte} bit {bit} verified"),
                    Err(e) => assert!(matches!(e, EthError::Recovery(_)), "unexpected error {e}"),
                }
            }
        }
    }

    #[test]
    fn round_trip_empty_message() {
        let id = identity();
        let sig = sign_message("", &id).unwrap();
        assert!(verify_signature("", &sig, &id.address().to_string()).unwrap());
    }

    #[test]
    fn round_trip_multibyte_message() {
        let id = identity();
        let msg = "こんにちは 🌍 ünïcødé";
        let sig = sign_message(msg, &id).unwrap();
        assert!(verify_signature(msg, &sig, &id.address().to_string()).unwrap());
        assert_eq!(recover_address(msg, &sig).unwrap(), id.address());
    }

    #[test]
    fn frame_header_keeps_every_length_digit() {
        assert_eq!(
            frame_header(1_234_567_890),
            "\x19Ethereum Signed Message:\n1234567890"
        );
        assert_eq!(
            frame_header(usize::MAX),
            format!("{PERSONAL_MESSAGE_PREFIX}{}", usize::MAX)
        );
    }

    #[test]
    fn large_message_round_trips() {
        let msg = "x".repeat(1_000_000);
        let framed = prepare_message(&msg);
        assert_eq!(framed.len(), PERSONAL_MESSAGE_PREFIX.len() + 7 + msg.len());

        let id = identity();
        let sig = sign_message(&msg, &id).unwrap();
        assert!(verify_signature(&msg, &sig, &id.address().to_string()).unwrap());
    }

    #[test]
    fn round_trip_random_identities_and_messages() {
        let mut rng = OsRng;
        for _ in 0..32 {
            let id = random_identity();
            let len = rng.gen_range(0..256);
            let msg: String = (0..len).map(|_| rng.gen::<char>()).collect();

            let sig = sign_message(&msg, &id).unwrap();
            assert!(verify_signature(&msg, &sig, &id.address().to_string()).unwrap());
        }
    }

    #[test]
    fn signed_message_verifies_itself() {
        let id = identity();
        let signed = sign("attest", &id).unwrap();
        assert_eq!(signed.message, "attest");
        assert!(signed.verify(TEST_KEY_ADDRESS).unwrap());
        assert!(!signed.verify(OTHER_ADDRESS).unwrap());
    }

    #[test]
    fn signing_is_deterministic() {
        let id = identity();
        assert_eq!(sign_message("hello", &id).unwrap(), sign_message("hello", &id).unwrap());
    }
}
