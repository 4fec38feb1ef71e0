//! Metaplex Token Metadata: PDA derivation, instruction encoding and
//! metadata account decoding.
//!
//! Instruction data is a one-byte discriminator followed by the Borsh
//! encoding of the arguments:
//!
//! ```text
//! CreateMetadataAccountV3 (33): DataV2 | is_mutable | collection_details
//! UpdateMetadataAccountV2 (15): Option<DataV2> | Option<Pubkey>
//!                               | Option<bool> primary_sale | Option<bool> is_mutable
//! ```

use borsh::{BorshDeserialize, BorshSerialize};

use crate::error::SolError;
use crate::spl_token::find_program_address;
use crate::transaction::{SolAccountMeta, SolInstruction, SYSTEM_PROGRAM_ID};

/// Token Metadata Program ID: `metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s`
pub const METADATA_PROGRAM_ID: [u8; 32] = [
    0x0b, 0x70, 0x65, 0xb1, 0xe3, 0xd1, 0x7c, 0x45, 0x38, 0x9d, 0x52, 0x7f, 0x6b, 0x04, 0xc3, 0xcd,
    0x58, 0xb8, 0x6c, 0x73, 0x1a, 0xa0, 0xfd, 0xb5, 0x49, 0xb6, 0xd1, 0xbc, 0x03, 0xf8, 0x29, 0x46,
];

/// Rent sysvar: `SysvarRent111111111111111111111111111111111`
pub const RENT_SYSVAR_ID: [u8; 32] = [
    0x06, 0xa7, 0xd5, 0x17, 0x19, 0x2c, 0x5c, 0x51, 0x21, 0x8c, 0xc9, 0x4c, 0x3d, 0x4a, 0xf1, 0x7f,
    0x58, 0xda, 0xee, 0x08, 0x9b, 0xa1, 0xfd, 0x44, 0xe3, 0xdb, 0xd9, 0x8a, 0x00, 0x00, 0x00, 0x00,
];

pub const MAX_NAME_LENGTH: usize = 32;
pub const MAX_SYMBOL_LENGTH: usize = 10;
pub const MAX_URI_LENGTH: usize = 200;

/// Upper bound on a metadata account's size, used for rent estimates.
pub const MAX_METADATA_ACCOUNT_SIZE: u64 = 679;

const IX_CREATE_METADATA_ACCOUNT_V3: u8 = 33;
const IX_UPDATE_METADATA_ACCOUNT_V2: u8 = 15;

/// Account discriminator of a `MetadataV1` account.
const KEY_METADATA_V1: u8 = 4;

/// Metadata PDA for `mint`: seeds `["metadata", program_id, mint]`.
pub fn metadata_address(mint: &[u8; 32]) -> Result<[u8; 32], SolError> {
    find_program_address(
        &[b"metadata", &METADATA_PROGRAM_ID, mint.as_ref()],
        &METADATA_PROGRAM_ID,
    )
    .map(|(address, _bump)| address)
}

// ---------------------------------------------------------------------------
// DataV2
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Creator {
    pub address: [u8; 32],
    pub verified: bool,
    /// Percentage of royalties, all shares sum to 100.
    pub share: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Collection {
    pub verified: bool,
    pub key: [u8; 32],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum UseMethod {
    Burn,
    Multiple,
    Single,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Uses {
    pub use_method: UseMethod,
    pub remaining: u64,
    pub total: u64,
}

/// Token metadata as written on creation or update.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct MetadataDataV2 {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub creators: Option<Vec<Creator>>,
    pub collection: Option<Collection>,
    pub uses: Option<Uses>,
}

impl MetadataDataV2 {
    /// Validated metadata with a zero seller fee and nothing else attached.
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        uri: impl Into<String>,
    ) -> Result<Self, SolError> {
        let data = MetadataDataV2 {
            name: name.into(),
            symbol: symbol.into(),
            uri: uri.into(),
            seller_fee_basis_points: 0,
            creators: None,
            collection: None,
            uses: None,
        };
        data.validate()?;
        Ok(data)
    }

    /// Byte-length limits enforced by the metadata program.
    pub fn validate(&self) -> Result<(), SolError> {
        check_len("name", &self.name, MAX_NAME_LENGTH)?;
        check_len("symbol", &self.symbol, MAX_SYMBOL_LENGTH)?;
        check_len("uri", &self.uri, MAX_URI_LENGTH)?;
        if self.seller_fee_basis_points > 10_000 {
            return Err(SolError::InvalidArgument(format!(
                "seller fee {} exceeds 10000 basis points",
                self.seller_fee_basis_points
            )));
        }
        Ok(())
    }
}

fn check_len(field: &str, value: &str, max: usize) -> Result<(), SolError> {
    if value.len() > max {
        return Err(SolError::InvalidArgument(format!(
            "{field} is {} bytes, max {max}",
            value.len()
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Instructions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum CollectionDetails {
    V1 { size: u64 },
}

/// Arguments of `CreateMetadataAccountV3`.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CreateMetadataArgs {
    pub data: MetadataDataV2,
    pub is_mutable: bool,
    pub collection_details: Option<CollectionDetails>,
}

impl CreateMetadataArgs {
    /// Arguments for a plain fungible token, not a collection parent.
    pub fn new(data: MetadataDataV2, is_mutable: bool) -> Self {
        CreateMetadataArgs {
            data,
            is_mutable,
            collection_details: None,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, SolError> {
        encode_instruction(IX_CREATE_METADATA_ACCOUNT_V3, self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, SolError> {
        decode_instruction(IX_CREATE_METADATA_ACCOUNT_V3, bytes)
    }
}

/// Arguments of `UpdateMetadataAccountV2`. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct UpdateMetadataArgs {
    pub data: Option<MetadataDataV2>,
    pub new_update_authority: Option<[u8; 32]>,
    pub primary_sale_happened: Option<bool>,
    pub is_mutable: Option<bool>,
}

impl UpdateMetadataArgs {
    /// Freezes the metadata: no further updates are possible.
    pub fn make_immutable() -> Self {
        UpdateMetadataArgs {
            is_mutable: Some(false),
            ..Default::default()
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, SolError> {
        encode_instruction(IX_UPDATE_METADATA_ACCOUNT_V2, self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, SolError> {
        decode_instruction(IX_UPDATE_METADATA_ACCOUNT_V2, bytes)
    }
}

fn encode_instruction(discriminator: u8, args: &impl BorshSerialize) -> Result<Vec<u8>, SolError> {
    let mut data = Vec::with_capacity(128);
    data.push(discriminator);
    args.serialize(&mut data).map_err(borsh_error)?;
    Ok(data)
}

/// Decodes the whole of `bytes`; trailing data is an error.
fn decode_instruction<T: BorshDeserialize>(discriminator: u8, bytes: &[u8]) -> Result<T, SolError> {
    match bytes.split_first() {
        Some((&found, body)) if found == discriminator => {
            T::try_from_slice(body).map_err(borsh_error)
        }
        Some((&found, _)) => Err(SolError::SerializationError(format!(
            "expected instruction {discriminator}, found {found}"
        ))),
        None => Err(SolError::SerializationError("empty instruction data".into())),
    }
}

fn borsh_error(e: std::io::Error) -> SolError {
    SolError::SerializationError(e.to_string())
}

/// Build a `CreateMetadataAccountV3` instruction for `mint`.
///
/// Accounts: metadata PDA (w), mint, mint authority (s), payer (s, w),
/// update authority, system program, rent sysvar.
pub fn create_metadata_account_v3(
    mint: &[u8; 32],
    mint_authority: &[u8; 32],
    payer: &[u8; 32],
    update_authority: &[u8; 32],
    args: &CreateMetadataArgs,
) -> Result<SolInstruction, SolError> {
    args.data.validate()?;
    let metadata = metadata_address(mint)?;

    Ok(SolInstruction {
        program_id: METADATA_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::writable(metadata, false),
            SolAccountMeta::readonly(*mint, false),
            SolAccountMeta::readonly(*mint_authority, true),
            SolAccountMeta::writable(*payer, true),
            SolAccountMeta::readonly(*update_authority, false),
            SolAccountMeta::readonly(SYSTEM_PROGRAM_ID, false),
            SolAccountMeta::readonly(RENT_SYSVAR_ID, false),
        ],
        data: args.encode()?,
    })
}

/// Build an `UpdateMetadataAccountV2` instruction for `mint`'s metadata.
pub fn update_metadata_account_v2(
    mint: &[u8; 32],
    update_authority: &[u8; 32],
    args: &UpdateMetadataArgs,
) -> Result<SolInstruction, SolError> {
    if let Some(data) = &args.data {
        data.validate()?;
    }
    let metadata = metadata_address(mint)?;

    Ok(SolInstruction {
        program_id: METADATA_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::writable(metadata, false),
            SolAccountMeta::readonly(*update_authority, true),
        ],
        data: args.encode()?,
    })
}

// ---------------------------------------------------------------------------
// Metadata account
// ---------------------------------------------------------------------------

/// `Data` as stored in the account: DataV2 without collection and uses,
/// which live further down the account.
#[derive(BorshDeserialize)]
struct StoredData {
    name: String,
    symbol: String,
    uri: String,
    seller_fee_basis_points: u16,
    creators: Option<Vec<Creator>>,
}

/// The fields of a `MetadataV1` account after its key byte.
#[derive(BorshDeserialize)]
struct StoredMetadataPrefix {
    update_authority: [u8; 32],
    mint: [u8; 32],
    data: StoredData,
    primary_sale_happened: bool,
    is_mutable: bool,
}

/// The leading fields of an on-chain `MetadataV1` account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataAccount {
    pub update_authority: [u8; 32],
    pub mint: [u8; 32],
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub creators: Option<Vec<Creator>>,
    pub primary_sale_happened: bool,
    pub is_mutable: bool,
}

impl MetadataAccount {
    /// Decodes `key | update_authority | mint | Data | primary_sale | is_mutable`.
    ///
    /// The program pads stored strings with NUL bytes to their maximum
    /// length; the padding is stripped. Trailing fields are ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self, SolError> {
        let (&key, mut rest) = bytes
            .split_first()
            .ok_or_else(|| SolError::SerializationError("empty metadata account".into()))?;
        if key != KEY_METADATA_V1 {
            return Err(SolError::InvalidAccountData(format!(
                "not a metadata account (key {key})"
            )));
        }

        let prefix = StoredMetadataPrefix::deserialize(&mut rest).map_err(borsh_error)?;
        Ok(MetadataAccount {
            update_authority: prefix.update_authority,
            mint: prefix.mint,
            name: strip_padding(prefix.data.name),
            symbol: strip_padding(prefix.data.symbol),
            uri: strip_padding(prefix.data.uri),
            seller_fee_basis_points: prefix.data.seller_fee_basis_points,
            creators: prefix.data.creators,
            primary_sale_happened: prefix.primary_sale_happened,
            is_mutable: prefix.is_mutable,
        })
    }
}

fn strip_padding(s: String) -> String {
    s.trim_end_matches('\0').to_string()
}
