//! SPL Token operations for Solana.
//!
//! Implements the SPL Token instructions a token launch needs, associated
//! token account (ATA) address derivation and mint account decoding, without
//! pulling in the `solana-sdk` or the `spl-token` crates.

use sha2::{Digest, Sha256};

use crate::error::SolError;
use crate::transaction::{SolAccountMeta, SolInstruction, SYSTEM_PROGRAM_ID};

// ---------------------------------------------------------------------------
// Well-known program IDs
// ---------------------------------------------------------------------------

/// SPL Token Program ID: `TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA`
pub const TOKEN_PROGRAM_ID: [u8; 32] = [
    0x06, 0xdd, 0xf6, 0xe1, 0xd7, 0x65, 0xa1, 0x93, 0xd9, 0xcb, 0xe1, 0x46, 0xce, 0xeb, 0x79, 0xac,
    0x1c, 0xb4, 0x85, 0xed, 0x5f, 0x5b, 0x37, 0x91, 0x3a, 0x8c, 0xf5, 0x85, 0x7e, 0xff, 0x00, 0xa9,
];

/// Associated Token Account Program ID: `ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL`
pub const ASSOCIATED_TOKEN_PROGRAM_ID: [u8; 32] = [
    0x8c, 0x97, 0x25, 0x8f, 0x4e, 0x24, 0x89, 0xf1, 0xbb, 0x3d, 0x10, 0x29, 0x14, 0x8e, 0x0d, 0x83,
    0x0b, 0x5a, 0x13, 0x99, 0xda, 0xff, 0x10, 0x84, 0x04, 0x8e, 0x7b, 0xd8, 0xdb, 0xe9, 0xf8, 0x59,
];

/// Size of an SPL mint account.
pub const MINT_ACCOUNT_SIZE: u64 = 82;

/// Size of an SPL token account.
pub const TOKEN_ACCOUNT_SIZE: u64 = 165;

/// The string appended to PDA derivation: "ProgramDerivedAddress".
const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

const IX_SET_AUTHORITY: u8 = 6;
const IX_MINT_TO: u8 = 7;
const IX_INITIALIZE_MINT2: u8 = 20;

/// Which authority a `SetAuthority` instruction changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AuthorityType {
    MintTokens = 0,
    FreezeAccount = 1,
    AccountOwner = 2,
    CloseAccount = 3,
}

// ---------------------------------------------------------------------------
// Instructions
// ---------------------------------------------------------------------------

/// Build an SPL Token `InitializeMint2` instruction.
///
/// Data: `[20, decimals, mint_authority(32), freeze_authority(COption)]`.
/// Unlike `InitializeMint`, no rent sysvar account is required.
pub fn initialize_mint2(
    mint: &[u8; 32],
    decimals: u8,
    mint_authority: &[u8; 32],
    freeze_authority: Option<&[u8; 32]>,
) -> SolInstruction {
    let mut data = Vec::with_capacity(67);
    data.push(IX_INITIALIZE_MINT2);
    data.push(decimals);
    data.extend_from_slice(mint_authority);
    push_pubkey_option(&mut data, freeze_authority);

    SolInstruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![SolAccountMeta::writable(*mint, false)],
        data,
    }
}

/// Build an SPL Token `MintTo` instruction.
///
/// Mints `amount` base units into `destination`. `authority` must be the
/// mint's current mint authority and signs.
pub fn mint_to(
    mint: &[u8; 32],
    destination: &[u8; 32],
    authority: &[u8; 32],
    amount: u64,
) -> Result<SolInstruction, SolError> {
    if amount == 0 {
        return Err(SolError::TransactionBuildError(
            "mint amount must be > 0".into(),
        ));
    }

    // Instruction data: [7] (MintTo) + u64 LE amount = 9 bytes.
    let mut data = Vec::with_capacity(9);
    data.push(IX_MINT_TO);
    data.extend_from_slice(&amount.to_le_bytes());

    Ok(SolInstruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::writable(*mint, false),
            SolAccountMeta::writable(*destination, false),
            SolAccountMeta::readonly(*authority, true),
        ],
        data,
    })
}

/// Build an SPL Token `SetAuthority` instruction.
///
/// Passing `None` as `new_authority` revokes the authority permanently.
pub fn set_authority(
    account: &[u8; 32],
    current_authority: &[u8; 32],
    authority_type: AuthorityType,
    new_authority: Option<&[u8; 32]>,
) -> SolInstruction {
    let mut data = Vec::with_capacity(35);
    data.push(IX_SET_AUTHORITY);
    data.push(authority_type as u8);
    push_pubkey_option(&mut data, new_authority);

    SolInstruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::writable(*account, false),
            SolAccountMeta::readonly(*current_authority, true),
        ],
        data,
    }
}

/// Build an Associated Token Account program `Create` instruction.
///
/// Creates the ATA for `owner` + `mint`, funded by `payer`. The instruction
/// data is empty.
pub fn create_associated_token_account(
    payer: &[u8; 32],
    owner: &[u8; 32],
    mint: &[u8; 32],
) -> Result<SolInstruction, SolError> {
    let ata = derive_associated_token_address(owner, mint)?;

    Ok(SolInstruction {
        program_id: ASSOCIATED_TOKEN_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::writable(*payer, true),
            SolAccountMeta::writable(ata, false),
            SolAccountMeta::readonly(*owner, false),
            SolAccountMeta::readonly(*mint, false),
            SolAccountMeta::readonly(SYSTEM_PROGRAM_ID, false),
            SolAccountMeta::readonly(TOKEN_PROGRAM_ID, false),
        ],
        data: Vec::new(),
    })
}

/// SPL instruction encoding of `COption<Pubkey>`: 1-byte tag, then the key
/// when present.
fn push_pubkey_option(data: &mut Vec<u8>, key: Option<&[u8; 32]>) {
    match key {
        Some(key) => {
            data.push(1);
            data.extend_from_slice(key);
        }
        None => data.push(0),
    }
}

// ---------------------------------------------------------------------------
// Mint account state
// ---------------------------------------------------------------------------

/// Decoded SPL mint account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintAccount {
    pub mint_authority: Option<[u8; 32]>,
    pub supply: u64,
    pub decimals: u8,
    pub is_initialized: bool,
    pub freeze_authority: Option<[u8; 32]>,
}

impl MintAccount {
    /// Decodes the 82-byte mint layout:
    ///
    /// ```text
    /// 0   mint_authority    COption<Pubkey>  (u32 LE tag + 32 bytes)
    /// 36  supply            u64 LE
    /// 44  decimals          u8
    /// 45  is_initialized    u8
    /// 46  freeze_authority  COption<Pubkey>
    /// ```
    pub fn decode(data: &[u8]) -> Result<Self, SolError> {
        if data.len() != MINT_ACCOUNT_SIZE as usize {
            return Err(SolError::InvalidAccountData(format!(
                "mint account is {} bytes, expected {MINT_ACCOUNT_SIZE}",
                data.len()
            )));
        }

        let mut supply = [0u8; 8];
        supply.copy_from_slice(&data[36..44]);

        let is_initialized = match data[45] {
            0 => false,
            1 => true,
            other => {
                return Err(SolError::InvalidAccountData(format!(
                    "invalid is_initialized flag {other}"
                )))
            }
        };

        Ok(MintAccount {
            mint_authority: read_account_coption(&data[0..36])?,
            supply: u64::from_le_bytes(supply),
            decimals: data[44],
            is_initialized,
            freeze_authority: read_account_coption(&data[46..82])?,
        })
    }
}

/// Account-state encoding of `COption<Pubkey>`: u32 LE tag + 32 bytes.
fn read_account_coption(bytes: &[u8]) -> Result<Option<[u8; 32]>, SolError> {
    let mut tag = [0u8; 4];
    tag.copy_from_slice(&bytes[..4]);

    match u32::from_le_bytes(tag) {
        0 => Ok(None),
        1 => {
            let mut key = [0u8; 32];
            key.copy_from_slice(&bytes[4..36]);
            Ok(Some(key))
        }
        other => Err(SolError::InvalidAccountData(format!(
            "invalid COption tag {other}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Associated Token Account (PDA) derivation
// ---------------------------------------------------------------------------

/// Derive the associated token account address for a wallet + mint pair.
///
/// The ATA is a Program Derived Address (PDA) with seeds:
///   `[wallet_address, token_program_id, mint_address]`
/// derived from the Associated Token Account program.
pub fn derive_associated_token_address(
    wallet: &[u8; 32],
    mint: &[u8; 32],
) -> Result<[u8; 32], SolError> {
    find_program_address(
        &[wallet.as_ref(), &TOKEN_PROGRAM_ID, mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .map(|(address, _bump)| address)
}

/// Find a valid Program Derived Address (PDA) for the given seeds and program.
///
/// Iterates bump seeds from 255 down to 0, computing
/// `SHA-256(seed_0 || seed_1 || ... || bump || program_id || "ProgramDerivedAddress")`
/// and returning the first result that is NOT a valid Ed25519 point.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &[u8; 32],
) -> Result<([u8; 32], u8), SolError> {
    for bump in (0u8..=255).rev() {
        if let Some(address) = try_create_program_address(seeds, &[bump], program_id) {
            return Ok((address, bump));
        }
    }

    Err(SolError::InvalidAddress(
        "could not find valid PDA bump seed".into(),
    ))
}

/// Returns `Some(address)` if the derived point is OFF the Ed25519 curve,
/// `None` if it falls on the curve (try the next bump).
fn try_create_program_address(
    seeds: &[&[u8]],
    bump_seed: &[u8],
    program_id: &[u8; 32],
) -> Option<[u8; 32]> {
    let mut hasher = Sha256::new();

    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(bump_seed);
    hasher.update(program_id);
    hasher.update(PDA_MARKER);

    let hash: [u8; 32] = hasher.finalize().into();

    if is_on_curve(&hash) {
        return None;
    }

    Some(hash)
}

/// Check if 32 bytes represent a valid Ed25519 curve point.
fn is_on_curve(bytes: &[u8; 32]) -> bool {
    curve25519_dalek::edwards::CompressedEdwardsY(*bytes)
        .decompress()
        .is_some()
}
