//! Instruction sequence for launching an SPL token with metadata.
//!
//! One transaction, in this order:
//!
//! ```text
//! 1. CreateAccount            mint, 82 bytes, owned by the token program
//! 2. InitializeMint2          mint authority = payer, optional freeze authority
//! 3. CreateMetadataAccountV3  is_mutable = true
//! 4. Create ATA               payer's associated token account
//! 5. MintTo                   initial supply (skipped when zero)
//! 6. SetAuthority             MintTokens -> none (unless minting is kept)
//! 7. UpdateMetadataAccountV2  is_mutable = false (unless updates are kept)
//! ```
//!
//! Metadata is created mutable even when updates are not kept, because the
//! mint authority must be able to write it once; the freeze in step 7 comes
//! last so nothing after it needs the update authority. The mint authority
//! revoke in step 6 always follows MintTo.

use serde::{Deserialize, Serialize};

use crate::error::SolError;
use crate::metadata::{
    create_metadata_account_v3, metadata_address, update_metadata_account_v2, CreateMetadataArgs,
    MetadataDataV2, UpdateMetadataArgs,
};
use crate::spl_token::{
    create_associated_token_account, derive_associated_token_address, initialize_mint2, mint_to,
    set_authority, AuthorityType, MINT_ACCOUNT_SIZE, TOKEN_PROGRAM_ID,
};
use crate::system::create_account;
use crate::transaction::SolInstruction;

/// Highest decimals accepted for a launched mint.
pub const MAX_SOLANA_DECIMALS: u8 = 9;

/// Which authorities survive the launch transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthorityFlags {
    /// Keep the mint authority so more supply can be created later.
    pub enable_mint_authority: bool,
    /// Set the payer as freeze authority.
    pub enable_freeze_authority: bool,
    /// Keep the metadata mutable.
    pub enable_update_authority: bool,
}

impl AuthorityFlags {
    /// All 8 combinations, for exhaustive checks.
    pub fn all_combinations() -> impl Iterator<Item = AuthorityFlags> {
        (0u8..8).map(|bits| AuthorityFlags {
            enable_mint_authority: bits & 1 != 0,
            enable_freeze_authority: bits & 2 != 0,
            enable_update_authority: bits & 4 != 0,
        })
    }
}

/// What a sequenced instruction does, for inspection and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionKind {
    CreateMintAccount,
    InitializeMint,
    CreateMetadata,
    CreateAssociatedTokenAccount,
    MintTo,
    RevokeMintAuthority,
    RevokeUpdateAuthority,
}

#[derive(Debug, Clone)]
pub struct SequencedInstruction {
    pub kind: InstructionKind,
    pub instruction: SolInstruction,
}

/// Inputs to [`build_token_instructions`].
#[derive(Debug, Clone)]
pub struct TokenLaunchParams {
    /// Fee payer, mint authority, update authority and supply recipient.
    pub payer: [u8; 32],
    /// Fresh single-use mint account; co-signs the transaction.
    pub mint: [u8; 32],
    pub decimals: u8,
    /// Initial supply in base units.
    pub supply: u64,
    pub metadata: MetadataDataV2,
    pub authorities: AuthorityFlags,
    /// Rent-exempt balance for an 82-byte mint account.
    pub mint_rent_lamports: u64,
}

/// The ordered instruction list plus the addresses it creates.
#[derive(Debug, Clone)]
pub struct InstructionSequence {
    pub instructions: Vec<SequencedInstruction>,
    pub metadata_address: [u8; 32],
    pub associated_token_account: [u8; 32],
}

impl InstructionSequence {
    pub fn kinds(&self) -> Vec<InstructionKind> {
        self.instructions.iter().map(|i| i.kind).collect()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn position(&self, kind: InstructionKind) -> Option<usize> {
        self.instructions.iter().position(|i| i.kind == kind)
    }

    pub fn into_instructions(self) -> Vec<SolInstruction> {
        self.instructions.into_iter().map(|i| i.instruction).collect()
    }
}

/// Builds the launch sequence. Every precondition is checked before the
/// first instruction is built: the result is the complete list or an error.
pub fn build_token_instructions(params: &TokenLaunchParams) -> Result<InstructionSequence, SolError> {
    validate(params)?;

    let payer = &params.payer;
    let mint = &params.mint;
    let flags = params.authorities;

    let metadata = metadata_address(mint)?;
    let ata = derive_associated_token_address(payer, mint)?;

    let mut instructions = Vec::with_capacity(7);
    let mut push = |kind, instruction| instructions.push(SequencedInstruction { kind, instruction });

    push(
        InstructionKind::CreateMintAccount,
        create_account(
            payer,
            mint,
            params.mint_rent_lamports,
            MINT_ACCOUNT_SIZE,
            &TOKEN_PROGRAM_ID,
        ),
    );

    let freeze_authority = flags.enable_freeze_authority.then_some(payer);
    push(
        InstructionKind::InitializeMint,
        initialize_mint2(mint, params.decimals, payer, freeze_authority),
    );

    push(
        InstructionKind::CreateMetadata,
        create_metadata_account_v3(
            mint,
            payer,
            payer,
            payer,
            &CreateMetadataArgs::new(params.metadata.clone(), true),
        )?,
    );

    push(
        InstructionKind::CreateAssociatedTokenAccount,
        create_associated_token_account(payer, payer, mint)?,
    );

    if params.supply > 0 {
        push(
            InstructionKind::MintTo,
            mint_to(mint, &ata, payer, params.supply)?,
        );
    }

    if !flags.enable_mint_authority {
        push(
            InstructionKind::RevokeMintAuthority,
            set_authority(mint, payer, AuthorityType::MintTokens, None),
        );
    }

    if !flags.enable_update_authority {
        push(
            InstructionKind::RevokeUpdateAuthority,
            update_metadata_account_v2(mint, payer, &UpdateMetadataArgs::make_immutable())?,
        );
    }

    Ok(InstructionSequence {
        instructions,
        metadata_address: metadata,
        associated_token_account: ata,
    })
}

fn validate(params: &TokenLaunchParams) -> Result<(), SolError> {
    if params.decimals > MAX_SOLANA_DECIMALS {
        return Err(SolError::InvalidArgument(format!(
            "decimals {} exceeds {MAX_SOLANA_DECIMALS}",
            params.decimals
        )));
    }
    if params.mint == params.payer {
        return Err(SolError::InvalidArgument(
            "mint account must differ from the payer".into(),
        ));
    }
    if params.mint_rent_lamports == 0 {
        return Err(SolError::InvalidArgument(
            "mint account needs a rent-exempt balance".into(),
        ));
    }
    params.metadata.validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::METADATA_PROGRAM_ID;
    use crate::spl_token::ASSOCIATED_TOKEN_PROGRAM_ID;
    use crate::transaction::{compile_transaction, SYSTEM_PROGRAM_ID};

    use InstructionKind::*;

    const PAYER: [u8; 32] = [1u8; 32];
    const MINT: [u8; 32] = [2u8; 32];

    fn params(supply: u64, authorities: AuthorityFlags) -> TokenLaunchParams {
        TokenLaunchParams {
            payer: PAYER,
            mint: MINT,
            decimals: 9,
            supply,
            metadata: MetadataDataV2::new("Test", "TST", "").unwrap(),
            authorities,
            mint_rent_lamports: 1_461_600,
        }
    }

    fn all_inputs() -> impl Iterator<Item = (u64, AuthorityFlags)> {
        [0u64, 1_000_000_000_000_000]
            .into_iter()
            .flat_map(|supply| AuthorityFlags::all_combinations().map(move |f| (supply, f)))
    }

    // -- Reference example --------------------------------------------------

    #[test]
    fn fixed_supply_launch_has_six_instructions() {
        let flags = AuthorityFlags {
            enable_mint_authority: false,
            enable_freeze_authority: false,
            enable_update_authority: true,
        };
        let seq = build_token_instructions(&params(1_000_000_000_000_000, flags)).unwrap();

        assert_eq!(
            seq.kinds(),
            vec![
                CreateMintAccount,
                InitializeMint,
                CreateMetadata,
                CreateAssociatedTokenAccount,
                MintTo,
                RevokeMintAuthority,
            ]
        );
    }

    #[test]
    fn everything_revoked_appends_metadata_freeze_last() {
        let seq = build_token_instructions(&params(5, AuthorityFlags::default())).unwrap();
        assert_eq!(seq.len(), 7);
        assert_eq!(seq.kinds().last(), Some(&RevokeUpdateAuthority));
    }

    #[test]
    fn everything_kept_has_no_revokes() {
        let flags = AuthorityFlags {
            enable_mint_authority: true,
            enable_freeze_authority: true,
            enable_update_authority: true,
        };
        let seq = build_token_instructions(&params(5, flags)).unwrap();
        assert_eq!(seq.len(), 5);
        assert!(seq.position(RevokeMintAuthority).is_none());
        assert!(seq.position(RevokeUpdateAuthority).is_none());
    }

    // -- Ordering over every input combination ------------------------------

    #[test]
    fn all_sixteen_combinations_respect_ordering() {
        let mut seen = 0;
        for (supply, flags) in all_inputs() {
            seen += 1;
            let seq = build_token_instructions(&params(supply, flags)).unwrap();
            let kinds = seq.kinds();

            assert_eq!(
                &kinds[..4],
                &[
                    CreateMintAccount,
                    InitializeMint,
                    CreateMetadata,
                    CreateAssociatedTokenAccount,
                ]
            );

            let mint_to = seq.position(MintTo);
            assert_eq!(mint_to.is_some(), supply > 0);

            match seq.position(RevokeMintAuthority) {
                Some(revoke) => {
                    assert!(!flags.enable_mint_authority);
                    assert!(revoke > seq.position(InitializeMint).unwrap());
                    if let Some(mint_to) = mint_to {
                        assert!(revoke > mint_to);
                    }
                }
                None => assert!(flags.enable_mint_authority),
            }

            match seq.position(RevokeUpdateAuthority) {
                Some(freeze) => {
                    assert!(!flags.enable_update_authority);
                    assert_eq!(freeze, kinds.len() - 1);
                }
                None => assert!(flags.enable_update_authority),
            }

            let revokes = kinds.iter().filter(|k| **k == RevokeMintAuthority).count();
            assert_eq!(revokes, usize::from(!flags.enable_mint_authority));
        }
        assert_eq!(seen, 16);
    }

    #[test]
    fn builder_is_deterministic() {
        for (supply, flags) in all_inputs() {
            let a = build_token_instructions(&params(supply, flags)).unwrap();
            let b = build_token_instructions(&params(supply, flags)).unwrap();
            assert_eq!(a.into_instructions(), b.into_instructions());
        }
    }

    #[test]
    fn zero_supply_without_mint_authority_revokes_after_init() {
        let seq = build_token_instructions(&params(0, AuthorityFlags::default())).unwrap();
        assert_eq!(
            seq.kinds(),
            vec![
                CreateMintAccount,
                InitializeMint,
                CreateMetadata,
                CreateAssociatedTokenAccount,
                RevokeMintAuthority,
                RevokeUpdateAuthority,
            ]
        );
    }

    // -- Instruction contents -----------------------------------------------

    #[test]
    fn freeze_authority_follows_flag() {
        let with = build_token_instructions(&params(
            1,
            AuthorityFlags {
                enable_freeze_authority: true,
                ..Default::default()
            },
        ))
        .unwrap();
        let without = build_token_instructions(&params(1, AuthorityFlags::default())).unwrap();

        let init = |seq: &InstructionSequence| seq.instructions[1].instruction.data.clone();
        assert_eq!(init(&with)[34], 1);
        assert_eq!(&init(&with)[35..], &PAYER);
        assert_eq!(init(&without)[34], 0);
        // mint authority is always the payer
        assert_eq!(&init(&without)[2..34], &PAYER);
    }

    #[test]
    fn programs_and_addresses() {
        let seq = build_token_instructions(&params(1, AuthorityFlags::default())).unwrap();
        let programs: Vec<[u8; 32]> = seq
            .instructions
            .iter()
            .map(|i| i.instruction.program_id)
            .collect();

        assert_eq!(
            programs,
            vec![
                SYSTEM_PROGRAM_ID,
                TOKEN_PROGRAM_ID,
                METADATA_PROGRAM_ID,
                ASSOCIATED_TOKEN_PROGRAM_ID,
                TOKEN_PROGRAM_ID,
                TOKEN_PROGRAM_ID,
                METADATA_PROGRAM_ID,
            ]
        );
        assert_eq!(seq.metadata_address, metadata_address(&MINT).unwrap());
        assert_eq!(
            seq.associated_token_account,
            derive_associated_token_address(&PAYER, &MINT).unwrap()
        );
        // MintTo targets the payer's ATA
        assert_eq!(
            seq.instructions[4].instruction.accounts[1].pubkey,
            seq.associated_token_account
        );
    }

    #[test]
    fn metadata_created_mutable() {
        let seq = build_token_instructions(&params(1, AuthorityFlags::default())).unwrap();
        let args = CreateMetadataArgs::decode(&seq.instructions[2].instruction.data).unwrap();
        assert!(args.is_mutable);
        assert_eq!(args.data.symbol, "TST");
    }

    #[test]
    fn sequence_compiles_with_two_signers() {
        let seq = build_token_instructions(&params(1, AuthorityFlags::default())).unwrap();
        let tx = compile_transaction(&seq.into_instructions(), &PAYER, &[0u8; 32]).unwrap();
        assert_eq!(tx.signers(), &[PAYER, MINT]);
    }

    // -- Preconditions ------------------------------------------------------

    #[test]
    fn rejects_decimals_above_nine() {
        let mut p = params(1, AuthorityFlags::default());
        p.decimals = 10;
        assert!(matches!(
            build_token_instructions(&p),
            Err(SolError::InvalidArgument(_))
        ));
    }

    #[test]
    fn rejects_mint_equal_to_payer() {
        let mut p = params(1, AuthorityFlags::default());
        p.mint = PAYER;
        assert!(build_token_instructions(&p).is_err());
    }

    #[test]
    fn rejects_missing_rent() {
        let mut p = params(1, AuthorityFlags::default());
        p.mint_rent_lamports = 0;
        assert!(build_token_instructions(&p).is_err());
    }

    #[test]
    fn rejects_oversized_metadata_before_building() {
        let mut p = params(1, AuthorityFlags::default());
        p.metadata.name = "x".repeat(40);
        assert!(build_token_instructions(&p).is_err());
    }

    #[test]
    fn flags_deserialize_from_client_names() {
        let flags: AuthorityFlags =
            serde_json::from_str(r#"{"enableMintAuthority":true,"enableUpdateAuthority":true}"#)
                .unwrap();
        assert!(flags.enable_mint_authority);
        assert!(!flags.enable_freeze_authority);
        assert!(flags.enable_update_authority);
    }
}
