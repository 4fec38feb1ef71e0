//! Request handlers behind the token HTTP surface.
//!
//! The transport maps `deploy`, `update_status`, `list_tokens` and
//! `get_token` onto its routes and turns [`ServiceError::status_code`] into
//! the response status. Here the browser wallet signs. `deploy` records
//! the intent and `update_status` records what happened on chain.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::error::{DeployError, ErrorKind};
use crate::network::ChainFamily;
use crate::record::{DeploymentOutcome, DeploymentRecord, DeploymentStatus, RecordUpdate};
use crate::request::{validate_request, TokenDeploymentRequest};
use crate::store::{RecordStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("{message}")]
    BadRequest { kind: ErrorKind, message: String },

    #[error("Token {0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    fn bad_request(message: impl Into<String>) -> Self {
        ServiceError::BadRequest {
            kind: ErrorKind::Validation,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::BadRequest { .. } => 400,
            ServiceError::NotFound(_) => 404,
            ServiceError::Conflict(_) => 409,
            ServiceError::Internal(_) => 500,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
            kind: match self {
                ServiceError::BadRequest { kind, .. } => Some(*kind),
                _ => None,
            },
        }
    }
}

impl From<DeployError> for ServiceError {
    fn from(e: DeployError) -> Self {
        match e.kind() {
            ErrorKind::Validation | ErrorKind::UnsupportedVariant => ServiceError::BadRequest {
                kind: e.kind(),
                message: e.to_string(),
            },
            _ => ServiceError::Internal(e.to_string()),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidTransition { .. } | StoreError::OutcomeMismatch { .. } => {
                ServiceError::Conflict(e.to_string())
            }
            StoreError::Backend(msg) => ServiceError::Internal(msg),
        }
    }
}

/// JSON error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

/// `POST /deploy` body: the request plus the connected wallet's address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployPayload {
    #[serde(flatten)]
    pub request: TokenDeploymentRequest,
    pub deployer: String,
}

/// `POST /tokens/{id}/status` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusUpdate {
    pub status: Option<DeploymentStatus>,
    pub contract_address: Option<String>,
    pub transaction_hash: Option<String>,
    pub block_number: Option<u64>,
    pub mint_address: Option<String>,
    pub transaction_signature: Option<String>,
    pub reason: Option<String>,
}

impl StatusUpdate {
    /// Turns the payload into a transition for a record of `family`.
    pub fn into_record_update(self, family: ChainFamily) -> Result<RecordUpdate, ServiceError> {
        match self.status {
            Some(DeploymentStatus::Deployed) => {
                let outcome = match family {
                    ChainFamily::Evm => {
                        let contract_address = required(self.contract_address, "contractAddress")?;
                        let transaction_hash = required(self.transaction_hash, "transactionHash")?;
                        chain_eth::address::parse_address(&contract_address)
                            .map_err(|e| ServiceError::bad_request(format!("contractAddress: {e}")))?;
                        if !is_tx_hash(&transaction_hash) {
                            return Err(ServiceError::bad_request(
                                "transactionHash must be 0x followed by 64 hex characters",
                            ));
                        }
                        DeploymentOutcome::Evm {
                            contract_address,
                            transaction_hash,
                            block_number: self.block_number,
                        }
                    }
                    ChainFamily::Solana => {
                        let mint_address = required(self.mint_address, "mintAddress")?;
                        let transaction_signature =
                            required(self.transaction_signature, "transactionSignature")?;
                        if !chain_sol::is_valid_address(&mint_address) {
                            return Err(ServiceError::bad_request(
                                "mintAddress is not a valid Solana address",
                            ));
                        }
                        if !is_signature(&transaction_signature) {
                            return Err(ServiceError::bad_request(
                                "transactionSignature is not a valid Solana signature",
                            ));
                        }
                        DeploymentOutcome::Solana {
                            mint_address,
                            transaction_signature,
                        }
                    }
                };
                Ok(RecordUpdate::Deployed(outcome))
            }
            Some(DeploymentStatus::Failed) => Ok(RecordUpdate::Failed {
                reason: self
                    .reason
                    .filter(|r| !r.trim().is_empty())
                    .unwrap_or_else(|| "failed".to_string()),
            }),
            Some(DeploymentStatus::Pending) => Err(ServiceError::bad_request(
                "status must be deployed or failed",
            )),
            None => Err(ServiceError::bad_request("status is required")),
        }
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, ServiceError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ServiceError::bad_request(format!("{field} is required"))),
    }
}

fn is_tx_hash(value: &str) -> bool {
    value
        .strip_prefix("0x")
        .is_some_and(|h| h.len() == 64 && h.bytes().all(|b| b.is_ascii_hexdigit()))
}

fn is_signature(value: &str) -> bool {
    bs58::decode(value)
        .into_vec()
        .is_ok_and(|bytes| bytes.len() == 64)
}

/// Handlers over a [`RecordStore`].
#[derive(Clone)]
pub struct TokenService {
    store: Arc<dyn RecordStore>,
}

impl TokenService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Validates the payload and creates a `pending` record.
    #[instrument(skip_all, fields(network = %payload.request.chain_id))]
    pub async fn deploy(&self, payload: DeployPayload) -> Result<DeploymentRecord, ServiceError> {
        let validated = validate_request(&payload.request, &payload.deployer)?;
        let record = self
            .store
            .create(validated.request, validated.deployer)
            .await?;
        info!(id = %record.id, "pending deployment recorded");
        Ok(record)
    }

    /// Moves a `pending` record to its terminal state.
    #[instrument(skip(self, update))]
    pub async fn update_status(
        &self,
        id: &str,
        update: StatusUpdate,
    ) -> Result<DeploymentRecord, ServiceError> {
        let record = self.get_token(id).await?;
        let update = update.into_record_update(record.family())?;

        match self.store.update(id, update).await {
            Ok(Some(record)) => {
                info!(status = %record.status, "deployment status updated");
                Ok(record)
            }
            Ok(None) => Err(ServiceError::NotFound(id.to_string())),
            Err(err) => {
                warn!(error = %err, "status update refused");
                Err(err.into())
            }
        }
    }

    /// All records, newest first.
    pub async fn list_tokens(&self) -> Result<Vec<DeploymentRecord>, ServiceError> {
        Ok(self.store.list().await?)
    }

    pub async fn get_token(&self, id: &str) -> Result<DeploymentRecord, ServiceError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }
}
