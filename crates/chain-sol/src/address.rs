//! Solana addresses.
//!
//! A Solana address is the Base58 encoding of a raw 32-byte Ed25519 public
//! key or program-derived address. There is no hashing step.

use ed25519_dalek::SigningKey;
use zeroize::Zeroize;

use crate::error::SolError;

/// Encode 32 bytes as a Solana address (Base58 string).
pub fn bytes_to_address(bytes: &[u8; 32]) -> String {
    bs58::encode(bytes).into_string()
}

/// Decode a Solana address string to its 32-byte representation.
///
/// Returns an error if the address is not valid Base58 or does not decode
/// to exactly 32 bytes.
pub fn address_to_bytes(address: &str) -> Result<[u8; 32], SolError> {
    let bytes = bs58::decode(address.trim())
        .into_vec()
        .map_err(|e| SolError::InvalidAddress(format!("base58 decode failed: {e}")))?;

    bytes.try_into().map_err(|v: Vec<u8>| {
        SolError::InvalidAddress(format!("expected 32 bytes, got {}", v.len()))
    })
}

/// Whether `address` decodes to exactly 32 bytes.
pub fn is_valid_address(address: &str) -> bool {
    address_to_bytes(address).is_ok()
}

/// The Ed25519 public key for a 32-byte secret seed.
pub fn public_key_from_seed(seed: &[u8; 32]) -> [u8; 32] {
    let mut copy = *seed;
    let signing_key = SigningKey::from_bytes(&copy);
    copy.zeroize();
    signing_key.verifying_key().to_bytes()
}

/// Parses a secret key given either as a 32-byte seed or as the 64-byte
/// `seed || public key` keypair format used by Solana CLI key files.
pub fn seed_from_secret_bytes(secret: &[u8]) -> Result<[u8; 32], SolError> {
    match secret.len() {
        32 | 64 => {
            let mut seed = [0u8; 32];
            seed.copy_from_slice(&secret[..32]);
            if secret.len() == 64 && public_key_from_seed(&seed) != secret[32..] {
                seed.zeroize();
                return Err(SolError::InvalidPrivateKey(
                    "keypair public half does not match its seed".into(),
                ));
            }
            Ok(seed)
        }
        n => Err(SolError::InvalidPrivateKey(format!(
            "expected 32 or 64 bytes, got {n}"
        ))),
    }
}
