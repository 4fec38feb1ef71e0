//! Minimal ABI encoding for EVM constructor arguments.
//!
//! Supports exactly the parameter kinds token constructors take: addresses,
//! unsigned integers (any `uintN` encodes as a 32-byte word) and dynamic
//! `string` values using the standard head/tail layout.

use alloy_primitives::U256;

/// A single ABI-encoded parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiParam {
    /// A 20-byte Ethereum address, left-padded to 32 bytes.
    Address([u8; 20]),
    /// An unsigned integer as a big-endian 32-byte array.
    Uint256([u8; 32]),
    /// A dynamic UTF-8 string (head holds an offset, tail holds length + data).
    String(String),
}

impl AbiParam {
    /// Builds a `Uint256` parameter from a [`U256`] value.
    pub fn uint(value: U256) -> Self {
        AbiParam::Uint256(value.to_be_bytes::<32>())
    }

    fn is_dynamic(&self) -> bool {
        matches!(self, AbiParam::String(_))
    }
}

/// Encodes a parameter list as an ABI tuple (the format constructor arguments
/// are appended to creation bytecode in).
///
/// ```text
/// head: one 32-byte word per parameter (value, or byte offset of its tail)
/// tail: for each dynamic parameter, length word + data right-padded to 32
/// ```
pub fn encode_params(params: &[AbiParam]) -> Vec<u8> {
    let head_len = params.len() * 32;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for param in params {
        if param.is_dynamic() {
            head.extend_from_slice(&uint_word((head_len + tail.len()) as u64));
            tail.extend_from_slice(&encode_tail(param));
        } else {
            head.extend_from_slice(&encode_static(param));
        }
    }

    head.extend_from_slice(&tail);
    head
}

/// Encodes a static parameter as a single 32-byte word.
fn encode_static(param: &AbiParam) -> [u8; 32] {
    match param {
        AbiParam::Address(addr) => {
            // Left-pad: 12 zero bytes + 20 address bytes.
            let mut word = [0u8; 32];
            word[12..].copy_from_slice(addr);
            word
        }
        AbiParam::Uint256(value) => *value,
        AbiParam::String(_) => [0u8; 32],
    }
}

/// Encodes the tail section of a dynamic parameter.
fn encode_tail(param: &AbiParam) -> Vec<u8> {
    let bytes = match param {
        AbiParam::String(s) => s.as_bytes(),
        _ => return Vec::new(),
    };

    let padded_len = bytes.len().div_ceil(32) * 32;
    let mut out = Vec::with_capacity(32 + padded_len);
    out.extend_from_slice(&uint_word(bytes.len() as u64));
    out.extend_from_slice(bytes);
    out.resize(32 + padded_len, 0);
    out
}

fn uint_word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}
