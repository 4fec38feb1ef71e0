//! Solana chain support for the token deployer.
//!
//! This crate handles Solana addresses, the manual transaction wire format
//! (including multi-signer partial signing), the System / SPL Token / ATA /
//! Token Metadata instructions a token launch needs, and the ordered launch
//! instruction sequence, all without pulling in `solana-sdk`.
//!
//! The compact wire format is implemented by hand, using `ed25519-dalek` for
//! Ed25519 signing, `curve25519-dalek` for PDA off-curve checks and `bs58`
//! for Base58 encoding.

pub mod address;
pub mod cluster;
pub mod error;
pub mod metadata;
pub mod sequence;
pub mod spl_token;
pub mod system;
pub mod transaction;

pub use address::{
    address_to_bytes, bytes_to_address, is_valid_address, public_key_from_seed,
    seed_from_secret_bytes,
};
pub use cluster::SolanaCluster;
pub use error::SolError;
pub use metadata::{
    metadata_address, CreateMetadataArgs, Creator, MetadataAccount, MetadataDataV2,
    UpdateMetadataArgs, METADATA_PROGRAM_ID,
};
pub use sequence::{
    build_token_instructions, AuthorityFlags, InstructionKind, InstructionSequence,
    SequencedInstruction, TokenLaunchParams,
};
pub use spl_token::{
    derive_associated_token_address, AuthorityType, MintAccount, ASSOCIATED_TOKEN_PROGRAM_ID,
    MINT_ACCOUNT_SIZE, TOKEN_ACCOUNT_SIZE, TOKEN_PROGRAM_ID,
};
pub use transaction::{
    compile_transaction, decode_compact_u16, encode_compact_u16, is_fully_signed, partial_sign,
    serialize_message, serialize_unsigned, transaction_signature, wire_signers,
    CompiledInstruction, SolAccountMeta, SolInstruction, SolTransaction, SYSTEM_PROGRAM_ID,
};
