//! Record store boundary and the in-memory implementation.

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::network::ChainFamily;
use crate::record::{DeploymentRecord, DeploymentStatus, RecordUpdate};
use crate::request::TokenDeploymentRequest;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Record {id} is already {from}; cannot move to {to}")]
    InvalidTransition {
        id: String,
        from: DeploymentStatus,
        to: DeploymentStatus,
    },

    #[error("Record {id} is a {expected} deployment; got a {actual} outcome")]
    OutcomeMismatch {
        id: String,
        expected: ChainFamily,
        actual: ChainFamily,
    },

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Keyed persistence for deployment records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Creates a `pending` record with a fresh id.
    async fn create(
        &self,
        request: TokenDeploymentRequest,
        deployer: String,
    ) -> Result<DeploymentRecord, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<DeploymentRecord>, StoreError>;

    /// Applies a terminal transition. `Ok(None)` for an unknown id; never
    /// creates a record.
    async fn update(
        &self,
        id: &str,
        update: RecordUpdate,
    ) -> Result<Option<DeploymentRecord>, StoreError>;

    /// All records, newest first.
    async fn list(&self) -> Result<Vec<DeploymentRecord>, StoreError>;
}

/// Process-local store. Records are kept in creation order.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: RwLock<Vec<DeploymentRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create(
        &self,
        request: TokenDeploymentRequest,
        deployer: String,
    ) -> Result<DeploymentRecord, StoreError> {
        let record =
            DeploymentRecord::new_pending(crypto_utils::random_id(), request, deployer, Utc::now());
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn get(&self, id: &str) -> Result<Option<DeploymentRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn update(
        &self,
        id: &str,
        update: RecordUpdate,
    ) -> Result<Option<DeploymentRecord>, StoreError> {
        let mut records = self.records.write().await;
        let Some(record) = records.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        record.apply(update, Utc::now())?;
        Ok(Some(record.clone()))
    }

    async fn list(&self) -> Result<Vec<DeploymentRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().rev().cloned().collect())
    }
}
