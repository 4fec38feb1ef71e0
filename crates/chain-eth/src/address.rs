//! EIP-55 addresses for deployers, treasuries and created contracts.

use alloy_primitives::Address;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::SecretKey;
use sha3::{Digest, Keccak256};

use crate::error::EthError;

/// Checksummed address controlled by a secp256k1 private key:
/// the last 20 bytes of `keccak256(uncompressed_pubkey[1..])`.
pub fn private_key_to_address(private_key: &[u8; 32]) -> Result<String, EthError> {
    let secret = SecretKey::from_bytes(private_key.into())
        .map_err(|e| EthError::InvalidPrivateKey(e.to_string()))?;
    let point = secret.public_key().to_encoded_point(false);

    let hash = Keccak256::digest(&point.as_bytes()[1..]);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash[12..]);
    Ok(format_address(&addr))
}

/// Parses a `0x` address into its raw bytes.
///
/// All-lowercase and all-uppercase input is accepted as is. Mixed case
/// must match the EIP-55 checksum exactly.
pub fn parse_address(address: &str) -> Result<[u8; 20], EthError> {
    let hex_part = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| EthError::InvalidAddress("address must start with 0x".into()))?;

    if hex_part.len() != 40 {
        return Err(EthError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            hex_part.len()
        )));
    }

    let mut addr = [0u8; 20];
    hex::decode_to_slice(hex_part, &mut addr)
        .map_err(|e| EthError::InvalidAddress(format!("invalid hex: {e}")))?;

    let has_lower = hex_part.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = hex_part.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper && format_address(&addr)[2..] != *hex_part {
        return Err(EthError::InvalidAddress(format!(
            "checksum mismatch for {address}"
        )));
    }

    Ok(addr)
}

/// EIP-55 checksummed form of `bytes`.
pub fn format_address(bytes: &[u8; 20]) -> String {
    Address::from(*bytes).to_checksum(None)
}

pub fn is_valid_address(address: &str) -> bool {
    parse_address(address).is_ok()
}
