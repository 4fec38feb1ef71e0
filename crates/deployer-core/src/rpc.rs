//! RPC boundaries for the two chain families.
//!
//! The orchestrator never talks to a node directly: callers inject an
//! [`EvmRpc`] or [`SolanaRpc`] implementation (an HTTP JSON-RPC client in
//! production, an in-memory mock in tests). Failures propagate to the caller
//! and are never retried here.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chain_eth::FeeParams;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::DeployError;
use crate::network::ChainFamily;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    #[error("RPC error {code}: {message}")]
    Server { code: i64, message: String },

    #[error("RPC transport error: {0}")]
    Transport(String),

    #[error("Timed out waiting for {0}")]
    Timeout(String),
}

impl RpcError {
    /// Whether the node refused the submission because the payer cannot
    /// cover fees, rent or value.
    pub fn is_insufficient_funds(&self) -> bool {
        let RpcError::Server { message, .. } = self else {
            return false;
        };
        let message = message.to_ascii_lowercase();
        message.contains("insufficient funds")
            || message.contains("insufficient lamports")
            || message.contains("insufficient balance")
            || message.contains("attempt to debit an account but found no record of a prior credit")
    }
}

// ---------------------------------------------------------------------------
// EVM
// ---------------------------------------------------------------------------

/// Current fee market, in wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeData {
    pub base_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
}

impl FeeData {
    /// EIP-1559 parameters leaving headroom for two full base-fee doublings.
    pub fn to_fee_params(&self) -> FeeParams {
        FeeParams {
            max_priority_fee_per_gas: self.max_priority_fee_per_gas,
            max_fee_per_gas: self
                .base_fee_per_gas
                .saturating_mul(2)
                .saturating_add(self.max_priority_fee_per_gas),
        }
    }

    /// Price paid per gas unit if the block's base fee does not move.
    pub fn effective_gas_price(&self) -> u128 {
        self.base_fee_per_gas
            .saturating_add(self.max_priority_fee_per_gas)
    }
}

/// `eth_estimateGas` call object for a contract creation (`to` omitted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    pub from: String,
    #[serde(with = "hex_data")]
    pub data: Vec<u8>,
    pub value: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    pub block_number: u64,
    pub contract_address: Option<String>,
    /// `true` when execution succeeded, `false` when it reverted.
    pub status: bool,
}

#[async_trait]
pub trait EvmRpc: Send + Sync {
    /// Pending nonce of `address`.
    async fn get_transaction_count(&self, address: &str) -> Result<u64, RpcError>;

    async fn fee_data(&self) -> Result<FeeData, RpcError>;

    async fn estimate_gas(&self, call: &CallRequest) -> Result<u64, RpcError>;

    /// Broadcasts a signed transaction and returns its hash.
    async fn send_raw_transaction(&self, raw_tx: &[u8]) -> Result<String, RpcError>;

    /// `None` while the transaction is not yet included.
    async fn get_transaction_receipt(
        &self,
        tx_hash: &str,
    ) -> Result<Option<TransactionReceipt>, RpcError>;
}

// ---------------------------------------------------------------------------
// Solana
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationStatus {
    Processed,
    Confirmed,
    Finalized,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    pub confirmation: Option<ConfirmationStatus>,
    /// Transaction error, when the transaction landed but failed.
    pub err: Option<String>,
}

impl SignatureStatus {
    pub fn is_confirmed(&self) -> bool {
        self.err.is_none()
            && self
                .confirmation
                .is_some_and(|c| c >= ConfirmationStatus::Confirmed)
    }
}

#[async_trait]
pub trait SolanaRpc: Send + Sync {
    async fn get_latest_blockhash(&self) -> Result<[u8; 32], RpcError>;

    async fn get_minimum_balance_for_rent_exemption(&self, space: u64) -> Result<u64, RpcError>;

    async fn get_fee_per_signature(&self) -> Result<u64, RpcError>;

    /// Submits a fully signed transaction and returns its signature.
    async fn send_transaction(&self, raw_tx: &[u8]) -> Result<String, RpcError>;

    /// `None` when the node has not seen the signature yet.
    async fn get_signature_status(
        &self,
        signature: &str,
    ) -> Result<Option<SignatureStatus>, RpcError>;

    /// Raw account data, `None` when the account does not exist.
    async fn get_account_data(&self, address: &[u8; 32]) -> Result<Option<Vec<u8>>, RpcError>;

    /// Base58 genesis hash of the cluster the node serves.
    async fn get_genesis_hash(&self) -> Result<String, RpcError>;
}

/// The RPC client configured for one network.
#[derive(Clone)]
pub enum ChainRpc {
    Evm(Arc<dyn EvmRpc>),
    Solana(Arc<dyn SolanaRpc>),
}

impl ChainRpc {
    pub fn family(&self) -> ChainFamily {
        match self {
            ChainRpc::Evm(_) => ChainFamily::Evm,
            ChainRpc::Solana(_) => ChainFamily::Solana,
        }
    }
}

/// Calls `check` every `interval` until it yields a value, fails, or
/// `timeout` elapses.
pub(crate) async fn poll_until<T, F, Fut>(
    interval: Duration,
    timeout: Duration,
    what: &str,
    mut check: F,
) -> Result<T, DeployError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, DeployError>>,
{
    let polling = async {
        loop {
            if let Some(value) = check().await? {
                return Ok::<T, DeployError>(value);
            }
            tokio::time::sleep(interval).await;
        }
    };

    match tokio::time::timeout(timeout, polling).await {
        Ok(result) => result,
        Err(_) => Err(RpcError::Timeout(what.to_string()).into()),
    }
}

mod hex_data {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_funds_detection() {
        let evm = RpcError::Server {
            code: -32000,
            message: "insufficient funds for gas * price + value".into(),
        };
        assert!(evm.is_insufficient_funds());

        let sol = RpcError::Server {
            code: -32002,
            message: "Transaction simulation failed: Attempt to debit an account but found no record of a prior credit.".into(),
        };
        assert!(sol.is_insufficient_funds());

        let other = RpcError::Server {
            code: -32000,
            message: "nonce too low".into(),
        };
        assert!(!other.is_insufficient_funds());
        assert!(!RpcError::Transport("insufficient funds".into()).is_insufficient_funds());
    }

    #[test]
    fn fee_params_from_fee_data() {
        let fees = FeeData {
            base_fee_per_gas: 30_000_000_000,
            max_priority_fee_per_gas: 2_000_000_000,
        };
        let params = fees.to_fee_params();
        assert_eq!(params.max_priority_fee_per_gas, 2_000_000_000);
        assert_eq!(params.max_fee_per_gas, 62_000_000_000);
        assert_eq!(fees.effective_gas_price(), 32_000_000_000);
    }

    #[test]
    fn signature_status_confirmation_levels() {
        let processed = SignatureStatus {
            confirmation: Some(ConfirmationStatus::Processed),
            err: None,
        };
        assert!(!processed.is_confirmed());

        let finalized = SignatureStatus {
            confirmation: Some(ConfirmationStatus::Finalized),
            err: None,
        };
        assert!(finalized.is_confirmed());

        let failed = SignatureStatus {
            confirmation: Some(ConfirmationStatus::Confirmed),
            err: Some("InstructionError".into()),
        };
        assert!(!failed.is_confirmed());
    }

    #[tokio::test]
    async fn poll_until_returns_first_value() {
        let mut calls = 0;
        let value = poll_until(Duration::from_millis(1), Duration::from_secs(5), "value", || {
            calls += 1;
            let current = calls;
            async move { Ok((current == 3).then_some(current)) }
        })
        .await
        .unwrap();
        assert_eq!(value, 3);
    }

    #[tokio::test]
    async fn poll_until_times_out() {
        let err = poll_until::<(), _, _>(
            Duration::from_millis(5),
            Duration::from_millis(30),
            "receipt of 0xabc",
            || async { Ok(None) },
        )
        .await
        .unwrap_err();
        assert_eq!(err, DeployError::Unknown("Timed out waiting for receipt of 0xabc".into()));
    }

    #[test]
    fn call_request_serializes_hex_data() {
        let call = CallRequest {
            from: "0xabc".into(),
            data: vec![0x60, 0x80],
            value: 0,
        };
        let json = serde_json::to_value(&call).unwrap();
        assert_eq!(json["data"], "0x6080");
        let back: CallRequest = serde_json::from_value(json).unwrap();
        assert_eq!(back, call);
    }
}
