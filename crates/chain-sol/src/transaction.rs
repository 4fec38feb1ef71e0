//! Manual Solana transaction wire format and signing.
//!
//! Transactions are built entirely by hand, no `solana-sdk` dependency.
//! The wire format is a compact binary layout:
//!
//! ```text
//! Transaction:
//!   num_signatures          compact-u16
//!   signatures              64 bytes * num_signatures
//!   message:
//!     num_required_sigs     u8
//!     num_readonly_signed   u8
//!     num_readonly_unsigned u8
//!     num_accounts          compact-u16
//!     account_keys          32 bytes * num_accounts
//!     recent_blockhash      32 bytes
//!     num_instructions      compact-u16
//!     instructions[]        (see below)
//!
//! Instruction:
//!   program_id_index        u8
//!   num_accounts            compact-u16
//!   account_indices         u8 * num_accounts
//!   data_len                compact-u16
//!   data                    u8 * data_len
//! ```
//!
//! A token deployment has two signers: the fee-paying wallet and the freshly
//! generated mint account. The mint key signs its slot first with
//! [`partial_sign`]; the serialized transaction is then handed to the wallet,
//! which fills in the remaining slot the same way.

use ed25519_dalek::Signer;
use zeroize::Zeroize;

use crate::error::SolError;

// ---------------------------------------------------------------------------
// Solana System Program
// ---------------------------------------------------------------------------

/// The Solana System Program public key: 32 zero bytes.
/// Base58: `11111111111111111111111111111111`
pub const SYSTEM_PROGRAM_ID: [u8; 32] = [0u8; 32];

const SIGNATURE_LEN: usize = 64;

// ---------------------------------------------------------------------------
// Compact-u16 encoding
// ---------------------------------------------------------------------------

/// Encode a `u16` value in Solana's compact-u16 format.
///
/// - Values 0..0x7f       -> 1 byte
/// - Values 0x80..0x3fff  -> 2 bytes
/// - Values 0x4000..      -> 3 bytes
pub fn encode_compact_u16(value: u16) -> Vec<u8> {
    let mut val = value as u32;
    let mut out = Vec::with_capacity(3);

    loop {
        let mut byte = (val & 0x7f) as u8;
        val >>= 7;
        if val > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if val == 0 {
            break;
        }
    }

    out
}

/// Decode a compact-u16 value from a byte slice.
///
/// Returns `(value, bytes_consumed)` or an error if the data is truncated.
pub fn decode_compact_u16(data: &[u8]) -> Result<(u16, usize), SolError> {
    let mut value: u32 = 0;
    let mut shift = 0u32;
    let mut consumed = 0usize;

    loop {
        let byte = *data.get(consumed).ok_or_else(|| {
            SolError::SerializationError(
                "unexpected end of data while decoding compact-u16".into(),
            )
        })?;
        consumed += 1;

        value |= ((byte & 0x7f) as u32) << shift;
        shift += 7;

        if byte & 0x80 == 0 || consumed >= 3 {
            break;
        }
    }

    if value > u16::MAX as u32 {
        return Err(SolError::SerializationError(
            "compact-u16 value overflow".into(),
        ));
    }

    Ok((value as u16, consumed))
}

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// A single account reference in a Solana instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolAccountMeta {
    pub pubkey: [u8; 32],
    pub is_signer: bool,
    pub is_writable: bool,
}

impl SolAccountMeta {
    pub fn writable(pubkey: [u8; 32], is_signer: bool) -> Self {
        SolAccountMeta {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    pub fn readonly(pubkey: [u8; 32], is_signer: bool) -> Self {
        SolAccountMeta {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

/// A Solana instruction (before it is compiled into a transaction).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolInstruction {
    pub program_id: [u8; 32],
    pub accounts: Vec<SolAccountMeta>,
    pub data: Vec<u8>,
}

/// A compiled Solana message, ready to be serialized and signed.
#[derive(Debug, Clone)]
pub struct SolTransaction {
    /// All account keys referenced by this transaction, in canonical order:
    ///   1. writable signers (fee payer first)
    ///   2. read-only signers
    ///   3. writable non-signers
    ///   4. read-only non-signers
    pub account_keys: Vec<[u8; 32]>,

    /// Number of required signatures (first N accounts are signers).
    pub num_required_signatures: u8,
    /// How many of the signing accounts are read-only.
    pub num_readonly_signed: u8,
    /// How many of the non-signing accounts are read-only.
    pub num_readonly_unsigned: u8,

    /// Recent blockhash (32 bytes).
    pub recent_blockhash: [u8; 32],

    /// Compiled instructions (account references replaced with indices).
    pub compiled_instructions: Vec<CompiledInstruction>,
}

impl SolTransaction {
    /// The accounts that must sign, in signature-slot order.
    pub fn signers(&self) -> &[[u8; 32]] {
        &self.account_keys[..self.num_required_signatures as usize]
    }
}

/// A compiled instruction where account references are replaced by u8 indices
/// into the transaction's `account_keys` array.
#[derive(Debug, Clone)]
pub struct CompiledInstruction {
    /// Index into `account_keys` for the program to invoke.
    pub program_id_index: u8,
    /// Indices into `account_keys` for each account the instruction reads/writes.
    pub account_indices: Vec<u8>,
    /// Opaque instruction data.
    pub data: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Transaction building
// ---------------------------------------------------------------------------

/// Compile instructions into a message with a single fee payer.
///
/// The fee payer is always the first signer and is placed at index 0 in the
/// account keys. Instruction order is preserved exactly.
pub fn compile_transaction(
    instructions: &[SolInstruction],
    fee_payer: &[u8; 32],
    recent_blockhash: &[u8; 32],
) -> Result<SolTransaction, SolError> {
    if instructions.is_empty() {
        return Err(SolError::TransactionBuildError(
            "transaction has no instructions".into(),
        ));
    }

    struct AccountEntry {
        pubkey: [u8; 32],
        is_signer: bool,
        is_writable: bool,
    }

    let mut entries: Vec<AccountEntry> = Vec::new();

    let mut upsert = |pubkey: [u8; 32], signer: bool, writable: bool| {
        if let Some(entry) = entries.iter_mut().find(|e| e.pubkey == pubkey) {
            entry.is_signer |= signer;
            entry.is_writable |= writable;
        } else {
            entries.push(AccountEntry {
                pubkey,
                is_signer: signer,
                is_writable: writable,
            });
        }
    };

    // Fee payer is always signer + writable, and inserted first.
    upsert(*fee_payer, true, true);

    for ix in instructions {
        for meta in &ix.accounts {
            upsert(meta.pubkey, meta.is_signer, meta.is_writable);
        }
        // Program IDs are non-signer, read-only accounts.
        upsert(ix.program_id, false, false);
    }

    // Stable sort keeps insertion order within each category, so the fee
    // payer (rank 0, inserted first) stays at index 0.
    entries.sort_by_key(|e| match (e.is_signer, e.is_writable) {
        (true, true) => 0u8,
        (true, false) => 1,
        (false, true) => 2,
        (false, false) => 3,
    });

    if entries.len() > u8::MAX as usize {
        return Err(SolError::TransactionBuildError(format!(
            "too many accounts: {}",
            entries.len()
        )));
    }

    let num_signers = entries.iter().filter(|e| e.is_signer).count() as u8;
    let num_readonly_signed = entries
        .iter()
        .filter(|e| e.is_signer && !e.is_writable)
        .count() as u8;
    let num_readonly_unsigned = entries
        .iter()
        .filter(|e| !e.is_signer && !e.is_writable)
        .count() as u8;

    let account_keys: Vec<[u8; 32]> = entries.iter().map(|e| e.pubkey).collect();

    let index_of = |key: &[u8; 32]| -> Result<u8, SolError> {
        account_keys
            .iter()
            .position(|k| k == key)
            .map(|i| i as u8)
            .ok_or_else(|| SolError::TransactionBuildError("account not in account keys".into()))
    };

    let mut compiled = Vec::with_capacity(instructions.len());
    for ix in instructions {
        let program_id_index = index_of(&ix.program_id)?;
        let account_indices = ix
            .accounts
            .iter()
            .map(|meta| index_of(&meta.pubkey))
            .collect::<Result<Vec<u8>, SolError>>()?;

        compiled.push(CompiledInstruction {
            program_id_index,
            account_indices,
            data: ix.data.clone(),
        });
    }

    Ok(SolTransaction {
        account_keys,
        num_required_signatures: num_signers,
        num_readonly_signed,
        num_readonly_unsigned,
        recent_blockhash: *recent_blockhash,
        compiled_instructions: compiled,
    })
}

/// Serialize the transaction message (the bytes that get signed).
pub fn serialize_message(tx: &SolTransaction) -> Result<Vec<u8>, SolError> {
    let mut buf = Vec::with_capacity(512);

    // Header: 3 bytes.
    buf.push(tx.num_required_signatures);
    buf.push(tx.num_readonly_signed);
    buf.push(tx.num_readonly_unsigned);

    buf.extend_from_slice(&encode_compact_u16(compact_len(tx.account_keys.len())?));
    for key in &tx.account_keys {
        buf.extend_from_slice(key);
    }

    buf.extend_from_slice(&tx.recent_blockhash);

    buf.extend_from_slice(&encode_compact_u16(compact_len(
        tx.compiled_instructions.len(),
    )?));
    for ix in &tx.compiled_instructions {
        buf.push(ix.program_id_index);

        buf.extend_from_slice(&encode_compact_u16(compact_len(ix.account_indices.len())?));
        buf.extend_from_slice(&ix.account_indices);

        buf.extend_from_slice(&encode_compact_u16(compact_len(ix.data.len())?));
        buf.extend_from_slice(&ix.data);
    }

    Ok(buf)
}

/// Serialize the transaction in wire format with every signature slot zeroed.
pub fn serialize_unsigned(tx: &SolTransaction) -> Result<Vec<u8>, SolError> {
    let message = serialize_message(tx)?;
    let num_sigs = tx.num_required_signatures as usize;

    let mut wire = Vec::with_capacity(1 + num_sigs * SIGNATURE_LEN + message.len());
    wire.extend_from_slice(&encode_compact_u16(num_sigs as u16));
    wire.resize(wire.len() + num_sigs * SIGNATURE_LEN, 0);
    wire.extend_from_slice(&message);

    Ok(wire)
}

// ---------------------------------------------------------------------------
// Wire-format signing
// ---------------------------------------------------------------------------

/// Sign a wire-format transaction with the given Ed25519 private key.
///
/// The signature slot is located by matching the key's public key against
/// the message's signer accounts; other slots are left untouched. Works on
/// transactions produced by [`serialize_unsigned`] or already partially
/// signed by another key. Signing a transaction whose signers do not
/// include the key is an error.
pub fn partial_sign(private_key: &[u8; 32], raw_tx: &[u8]) -> Result<Vec<u8>, SolError> {
    let mut seed = *private_key;
    let signing_key = ed25519_dalek::SigningKey::from_bytes(&seed);
    seed.zeroize();
    let our_pubkey = signing_key.verifying_key().to_bytes();

    let layout = WireLayout::parse(raw_tx)?;
    let signer_idx = layout
        .signer_keys(raw_tx)
        .position(|key| key == our_pubkey)
        .ok_or_else(|| {
            SolError::SigningError("key not found in transaction signers".into())
        })?;

    let signature = signing_key.sign(&raw_tx[layout.message_start..]);

    let mut signed_tx = raw_tx.to_vec();
    let sig_offset = layout.signatures_start + signer_idx * SIGNATURE_LEN;
    signed_tx[sig_offset..sig_offset + SIGNATURE_LEN].copy_from_slice(&signature.to_bytes());

    Ok(signed_tx)
}

/// The signer public keys of a wire-format transaction, in slot order.
pub fn wire_signers(raw_tx: &[u8]) -> Result<Vec<[u8; 32]>, SolError> {
    let layout = WireLayout::parse(raw_tx)?;
    Ok(layout.signer_keys(raw_tx).collect())
}

/// Whether every signature slot holds a valid signature over the message.
pub fn is_fully_signed(raw_tx: &[u8]) -> Result<bool, SolError> {
    let layout = WireLayout::parse(raw_tx)?;
    let message = &raw_tx[layout.message_start..];

    for (i, key) in layout.signer_keys(raw_tx).enumerate() {
        let offset = layout.signatures_start + i * SIGNATURE_LEN;
        let mut sig_bytes = [0u8; SIGNATURE_LEN];
        sig_bytes.copy_from_slice(&raw_tx[offset..offset + SIGNATURE_LEN]);

        let Ok(verifying_key) = ed25519_dalek::VerifyingKey::from_bytes(&key) else {
            return Ok(false);
        };
        let signature = ed25519_dalek::Signature::from_bytes(&sig_bytes);
        if verifying_key.verify_strict(message, &signature).is_err() {
            return Ok(false);
        }
    }

    Ok(true)
}

/// The transaction id: the first (fee payer's) signature, Base58-encoded.
pub fn transaction_signature(raw_tx: &[u8]) -> Result<String, SolError> {
    let layout = WireLayout::parse(raw_tx)?;
    let first = &raw_tx[layout.signatures_start..layout.signatures_start + SIGNATURE_LEN];

    if first.iter().all(|&b| b == 0) {
        return Err(SolError::SigningError(
            "fee payer signature slot is empty".into(),
        ));
    }

    Ok(bs58::encode(first).into_string())
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Byte offsets of the pieces of a wire-format transaction.
struct WireLayout {
    signatures_start: usize,
    message_start: usize,
    accounts_start: usize,
    num_signers: usize,
}

impl WireLayout {
    /// Layout: compact-u16(num_signatures) | 64-byte signatures * N | message
    fn parse(raw_tx: &[u8]) -> Result<Self, SolError> {
        let (num_sigs, compact_len) = decode_compact_u16(raw_tx)?;

        if num_sigs == 0 {
            return Err(SolError::TransactionBuildError(
                "transaction has zero signatures".into(),
            ));
        }

        let signatures_start = compact_len;
        let message_start = signatures_start + (num_sigs as usize) * SIGNATURE_LEN;

        if message_start + 4 > raw_tx.len() {
            return Err(SolError::SerializationError(
                "transaction too short: signature slots exceed length".into(),
            ));
        }

        let message = &raw_tx[message_start..];
        let num_required_sigs = message[0] as usize;
        if num_required_sigs != num_sigs as usize {
            return Err(SolError::SerializationError(format!(
                "signature count {num_sigs} does not match message header {num_required_sigs}"
            )));
        }

        let (num_accounts, accounts_compact_len) = decode_compact_u16(&message[3..])?;
        let accounts_start = message_start + 3 + accounts_compact_len;
        let accounts_end = accounts_start + (num_accounts as usize) * 32;

        if accounts_end > raw_tx.len() || num_required_sigs > num_accounts as usize {
            return Err(SolError::SerializationError(
                "transaction message too short for account keys".into(),
            ));
        }

        Ok(WireLayout {
            signatures_start,
            message_start,
            accounts_start,
            num_signers: num_required_sigs,
        })
    }

    fn signer_keys<'a>(&self, raw_tx: &'a [u8]) -> impl Iterator<Item = [u8; 32]> + 'a {
        let start = self.accounts_start;
        (0..self.num_signers).map(move |i| {
            let mut key = [0u8; 32];
            key.copy_from_slice(&raw_tx[start + i * 32..start + (i + 1) * 32]);
            key
        })
    }
}

fn compact_len(len: usize) -> Result<u16, SolError> {
    u16::try_from(len)
        .map_err(|_| SolError::SerializationError(format!("length {len} exceeds compact-u16")))
}
