//! Deployment records and their lifecycle.
//!
//! A record is created `pending` and moves exactly once to `deployed` or
//! `failed`. The terminal fields (addresses, transaction ids, timestamps,
//! failure reason) are written together by [`DeploymentRecord::apply`] or not
//! at all.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::network::ChainFamily;
use crate::request::TokenDeploymentRequest;
use crate::store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Pending,
    Deployed,
    Failed,
}

impl DeploymentStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DeploymentStatus::Pending)
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentStatus::Pending => f.write_str("pending"),
            DeploymentStatus::Deployed => f.write_str("deployed"),
            DeploymentStatus::Failed => f.write_str("failed"),
        }
    }
}

/// On-chain identifiers of a successful deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "lowercase")]
pub enum DeploymentOutcome {
    #[serde(rename_all = "camelCase")]
    Evm {
        contract_address: String,
        transaction_hash: String,
        #[serde(default)]
        block_number: Option<u64>,
    },
    #[serde(rename_all = "camelCase")]
    Solana {
        mint_address: String,
        transaction_signature: String,
    },
}

impl DeploymentOutcome {
    pub fn family(&self) -> ChainFamily {
        match self {
            DeploymentOutcome::Evm { .. } => ChainFamily::Evm,
            DeploymentOutcome::Solana { .. } => ChainFamily::Solana,
        }
    }

    /// Contract or mint address.
    pub fn address(&self) -> &str {
        match self {
            DeploymentOutcome::Evm {
                contract_address, ..
            } => contract_address,
            DeploymentOutcome::Solana { mint_address, .. } => mint_address,
        }
    }

    /// Transaction hash or signature.
    pub fn transaction_id(&self) -> &str {
        match self {
            DeploymentOutcome::Evm {
                transaction_hash, ..
            } => transaction_hash,
            DeploymentOutcome::Solana {
                transaction_signature,
                ..
            } => transaction_signature,
        }
    }
}

/// A terminal transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordUpdate {
    Deployed(DeploymentOutcome),
    Failed { reason: String },
}

impl RecordUpdate {
    pub fn status(&self) -> DeploymentStatus {
        match self {
            RecordUpdate::Deployed(_) => DeploymentStatus::Deployed,
            RecordUpdate::Failed { .. } => DeploymentStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub id: String,
    #[serde(flatten)]
    pub request: TokenDeploymentRequest,
    pub deployer: String,
    pub status: DeploymentStatus,
    pub contract_address: Option<String>,
    pub mint_address: Option<String>,
    pub transaction_hash: Option<String>,
    pub transaction_signature: Option<String>,
    pub block_number: Option<u64>,
    pub failure_reason: Option<String>,
    pub deployed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl DeploymentRecord {
    pub fn new_pending(
        id: String,
        request: TokenDeploymentRequest,
        deployer: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            request,
            deployer,
            status: DeploymentStatus::Pending,
            contract_address: None,
            mint_address: None,
            transaction_hash: None,
            transaction_signature: None,
            block_number: None,
            failure_reason: None,
            deployed_at: None,
            created_at,
        }
    }

    pub fn family(&self) -> ChainFamily {
        self.request.chain_id.family()
    }

    /// Applies a terminal transition. Fails without touching the record if
    /// it is already terminal or the outcome belongs to the other family.
    pub fn apply(&mut self, update: RecordUpdate, at: DateTime<Utc>) -> Result<(), StoreError> {
        if self.status.is_terminal() {
            return Err(StoreError::InvalidTransition {
                id: self.id.clone(),
                from: self.status,
                to: update.status(),
            });
        }

        match update {
            RecordUpdate::Deployed(outcome) => {
                if outcome.family() != self.family() {
                    return Err(StoreError::OutcomeMismatch {
                        id: self.id.clone(),
                        expected: self.family(),
                        actual: outcome.family(),
                    });
                }
                match outcome {
                    DeploymentOutcome::Evm {
                        contract_address,
                        transaction_hash,
                        block_number,
                    } => {
                        self.contract_address = Some(contract_address);
                        self.transaction_hash = Some(transaction_hash);
                        self.block_number = block_number;
                    }
                    DeploymentOutcome::Solana {
                        mint_address,
                        transaction_signature,
                    } => {
                        self.mint_address = Some(mint_address);
                        self.transaction_signature = Some(transaction_signature);
                    }
                }
                self.status = DeploymentStatus::Deployed;
                self.deployed_at = Some(at);
            }
            RecordUpdate::Failed { reason } => {
                self.status = DeploymentStatus::Failed;
                self.failure_reason = Some(reason);
            }
        }
        Ok(())
    }

    /// The outcome, once deployed.
    pub fn outcome(&self) -> Option<DeploymentOutcome> {
        if self.status != DeploymentStatus::Deployed {
            return None;
        }
        match self.family() {
            ChainFamily::Evm => Some(DeploymentOutcome::Evm {
                contract_address: self.contract_address.clone()?,
                transaction_hash: self.transaction_hash.clone()?,
                block_number: self.block_number,
            }),
            ChainFamily::Solana => Some(DeploymentOutcome::Solana {
                mint_address: self.mint_address.clone()?,
                transaction_signature: self.transaction_signature.clone()?,
            }),
        }
    }

    /// Explorer link for the deployed contract or mint.
    pub fn explorer_url(&self) -> Option<String> {
        self.outcome()
            .map(|o| self.request.chain_id.address_url(o.address()))
    }
}
