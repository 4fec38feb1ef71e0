//! Solana deployment executor and post-launch authority management.
//!
//! A launch is a single transaction: the instruction sequence from
//! [`chain_sol::build_token_instructions`], compiled with the deployer as fee
//! payer, pre-signed with a single-use mint key and then handed to the
//! wallet for the fee payer signature.

use std::sync::Arc;

use chain_sol::metadata::update_metadata_account_v2;
use chain_sol::spl_token::set_authority;
use chain_sol::{
    bytes_to_address, compile_transaction, is_fully_signed, metadata_address, partial_sign,
    serialize_unsigned, AuthorityType, InstructionKind, MetadataAccount, MetadataDataV2,
    MintAccount, SolInstruction, SolanaCluster, TokenLaunchParams, UpdateMetadataArgs,
    MINT_ACCOUNT_SIZE,
};
use tracing::{debug, info, instrument, warn};
use zeroize::Zeroizing;

use crate::config::DeployerConfig;
use crate::error::DeployError;
use crate::record::DeploymentOutcome;
use crate::request::{DeploymentPlan, ValidatedRequest};
use crate::rpc::{poll_until, SolanaRpc};
use crate::wallet::SolanaWallet;

/// A confirmed token launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolanaDeployment {
    pub mint_address: String,
    pub transaction_signature: String,
    pub metadata_address: String,
    pub associated_token_account: String,
    /// The instructions the launch transaction carried, in order.
    pub instructions: Vec<InstructionKind>,
}

impl SolanaDeployment {
    pub fn into_outcome(self) -> DeploymentOutcome {
        DeploymentOutcome::Solana {
            mint_address: self.mint_address,
            transaction_signature: self.transaction_signature,
        }
    }
}

pub struct SolanaDeployer {
    rpc: Arc<dyn SolanaRpc>,
    config: DeployerConfig,
}

impl SolanaDeployer {
    pub fn new(rpc: Arc<dyn SolanaRpc>, config: DeployerConfig) -> Self {
        Self { rpc, config }
    }

    #[instrument(skip_all, fields(network = %validated.network(), symbol = %validated.request.symbol))]
    pub async fn deploy(
        &self,
        validated: &ValidatedRequest,
        wallet: &dyn SolanaWallet,
    ) -> Result<SolanaDeployment, DeployError> {
        let DeploymentPlan::Solana { cluster, supply } = validated.plan else {
            return Err(DeployError::Validation(format!(
                "{} is not a Solana network",
                validated.network()
            )));
        };

        self.check_cluster(cluster, wallet).await?;

        let payer = wallet.public_key();
        if bytes_to_address(&payer) != validated.deployer {
            return Err(DeployError::Validation(format!(
                "wallet {} is not the deployer {}",
                bytes_to_address(&payer),
                validated.deployer
            )));
        }

        let mint_seed = Zeroizing::new(crypto_utils::random_bytes_fixed::<32>());
        let mint = chain_sol::public_key_from_seed(&mint_seed);

        let mint_rent_lamports = self
            .rpc
            .get_minimum_balance_for_rent_exemption(MINT_ACCOUNT_SIZE)
            .await?;

        let request = &validated.request;
        let metadata = MetadataDataV2::new(
            request.name.as_str(),
            request.symbol.as_str(),
            request.logo_url.clone().unwrap_or_default(),
        )?;

        let sequence = chain_sol::build_token_instructions(&TokenLaunchParams {
            payer,
            mint,
            decimals: request.decimals,
            supply,
            metadata,
            authorities: request.authorities,
            mint_rent_lamports,
        })?;
        let instructions = sequence.kinds();
        let metadata_address = bytes_to_address(&sequence.metadata_address);
        let associated_token_account = bytes_to_address(&sequence.associated_token_account);
        debug!(?instructions, mint_rent_lamports, "launch sequence built");

        let blockhash = self.rpc.get_latest_blockhash().await?;
        let tx = compile_transaction(&sequence.into_instructions(), &payer, &blockhash)?;
        let presigned = partial_sign(&mint_seed, &serialize_unsigned(&tx)?)?;
        drop(mint_seed);

        let transaction_signature = self.sign_and_submit(presigned, wallet).await?;
        let mint_address = bytes_to_address(&mint);
        info!(%mint_address, %transaction_signature, "token launched");

        Ok(SolanaDeployment {
            mint_address,
            transaction_signature,
            metadata_address,
            associated_token_account,
            instructions,
        })
    }

    /// Permanently removes the mint authority of an existing mint. The
    /// wallet must be the current authority.
    #[instrument(skip_all, fields(mint = %mint))]
    pub async fn revoke_mint_authority(
        &self,
        mint: &str,
        wallet: &dyn SolanaWallet,
    ) -> Result<String, DeployError> {
        let mint_key = chain_sol::address_to_bytes(mint)?;
        let data = self
            .rpc
            .get_account_data(&mint_key)
            .await?
            .ok_or_else(|| DeployError::AccountNotFound(format!("Mint {mint}")))?;
        let account = MintAccount::decode(&data)
            .map_err(|e| DeployError::Validation(format!("{mint} is not a token mint: {e}")))?;

        let authority = wallet.public_key();
        match account.mint_authority {
            None => {
                return Err(DeployError::AuthorityMismatch(
                    "mint authority is already revoked".into(),
                ))
            }
            Some(current) if current != authority => {
                return Err(DeployError::AuthorityMismatch(format!(
                    "mint authority is {}",
                    bytes_to_address(&current)
                )))
            }
            Some(_) => {}
        }

        let ix = set_authority(&mint_key, &authority, AuthorityType::MintTokens, None);
        let signature = self.submit_with_wallet(ix, wallet).await?;
        info!(%signature, "mint authority revoked");
        Ok(signature)
    }

    /// Replaces the name, symbol and URI of a mint's metadata. The wallet
    /// must be the update authority and the metadata must still be mutable.
    #[instrument(skip_all, fields(mint = %mint))]
    pub async fn update_metadata(
        &self,
        mint: &str,
        data: MetadataDataV2,
        wallet: &dyn SolanaWallet,
    ) -> Result<String, DeployError> {
        data.validate()?;
        let mint_key = chain_sol::address_to_bytes(mint)?;
        let metadata_key = metadata_address(&mint_key)?;
        let raw = self
            .rpc
            .get_account_data(&metadata_key)
            .await?
            .ok_or_else(|| DeployError::AccountNotFound(format!("Metadata for {mint}")))?;
        let account = MetadataAccount::decode(&raw)?;

        let authority = wallet.public_key();
        if !account.is_mutable {
            return Err(DeployError::AuthorityMismatch("metadata is immutable".into()));
        }
        if account.update_authority != authority {
            return Err(DeployError::AuthorityMismatch(format!(
                "update authority is {}",
                bytes_to_address(&account.update_authority)
            )));
        }

        let args = UpdateMetadataArgs {
            data: Some(data),
            ..UpdateMetadataArgs::default()
        };
        let ix = update_metadata_account_v2(&mint_key, &authority, &args)?;
        let signature = self.submit_with_wallet(ix, wallet).await?;
        info!(%signature, "metadata updated");
        Ok(signature)
    }

    async fn check_cluster(
        &self,
        expected: SolanaCluster,
        wallet: &dyn SolanaWallet,
    ) -> Result<(), DeployError> {
        match wallet.cluster().await? {
            Some(actual) if actual != expected => {
                return Err(DeployError::NetworkMismatch {
                    expected: expected.to_string(),
                    actual: actual.to_string(),
                })
            }
            Some(_) => {}
            None => warn!(
                %expected,
                "wallet does not report its cluster; only the RPC endpoint is checked"
            ),
        }

        let genesis = self.rpc.get_genesis_hash().await?;
        match SolanaCluster::from_genesis_hash(&genesis) {
            Some(actual) if actual != expected => Err(DeployError::NetworkMismatch {
                expected: expected.to_string(),
                actual: format!("RPC endpoint on {actual}"),
            }),
            Some(_) => Ok(()),
            None => {
                debug!(%genesis, "unrecognised genesis hash; assuming a local cluster");
                Ok(())
            }
        }
    }

    async fn submit_with_wallet(
        &self,
        ix: SolInstruction,
        wallet: &dyn SolanaWallet,
    ) -> Result<String, DeployError> {
        let blockhash = self.rpc.get_latest_blockhash().await?;
        let tx = compile_transaction(&[ix], &wallet.public_key(), &blockhash)?;
        self.sign_and_submit(serialize_unsigned(&tx)?, wallet).await
    }

    async fn sign_and_submit(
        &self,
        raw_tx: Vec<u8>,
        wallet: &dyn SolanaWallet,
    ) -> Result<String, DeployError> {
        let signed = wallet.sign_transaction(raw_tx).await?;
        if !is_fully_signed(&signed)? {
            return Err(DeployError::Unknown(
                "wallet returned a transaction with missing signatures".into(),
            ));
        }

        let signature = self.rpc.send_transaction(&signed).await?;
        debug!(%signature, "transaction submitted");
        self.wait_for_confirmation(&signature).await?;
        Ok(signature)
    }

    async fn wait_for_confirmation(&self, signature: &str) -> Result<(), DeployError> {
        poll_until(
            self.config.poll_interval(),
            self.config.confirmation_timeout(),
            &format!("confirmation of {signature}"),
            || async move {
                match self.rpc.get_signature_status(signature).await? {
                    Some(status) => match status.err {
                        Some(err) => Err(DeployError::Unknown(format!(
                            "transaction {signature} failed: {err}"
                        ))),
                        None if status.is_confirmed() => Ok(Some(())),
                        None => Ok(None),
                    },
                    None => Ok(None),
                }
            },
        )
        .await
    }
}
