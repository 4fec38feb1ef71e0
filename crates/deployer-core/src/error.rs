use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rpc::RpcError;
use crate::store::StoreError;
use crate::wallet::WalletError;

/// Stable, machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Validation,
    NetworkMismatch,
    UnsupportedVariant,
    CompilationFailed,
    UserRejected,
    InsufficientFunds,
    AccountNotFound,
    AuthorityMismatch,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeployError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Network mismatch: wallet is on {actual}, request targets {expected}")]
    NetworkMismatch { expected: String, actual: String },

    #[error("Unsupported token variant: {0}")]
    UnsupportedVariant(String),

    #[error("Compilation failed: {}", .0.join("; "))]
    CompilationFailed(Vec<String>),

    #[error("Transaction rejected by the wallet")]
    UserRejected,

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Authority mismatch: {0}")]
    AuthorityMismatch(String),

    #[error("Deployment failed: {0}")]
    Unknown(String),
}

impl DeployError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DeployError::Validation(_) => ErrorKind::Validation,
            DeployError::NetworkMismatch { .. } => ErrorKind::NetworkMismatch,
            DeployError::UnsupportedVariant(_) => ErrorKind::UnsupportedVariant,
            DeployError::CompilationFailed(_) => ErrorKind::CompilationFailed,
            DeployError::UserRejected => ErrorKind::UserRejected,
            DeployError::InsufficientFunds(_) => ErrorKind::InsufficientFunds,
            DeployError::AccountNotFound(_) => ErrorKind::AccountNotFound,
            DeployError::AuthorityMismatch(_) => ErrorKind::AuthorityMismatch,
            DeployError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// A short corrective hint for the person deploying.
    pub fn user_message(&self) -> String {
        match self {
            DeployError::Validation(msg) => format!("Check the token details: {msg}"),
            DeployError::NetworkMismatch { expected, .. } => {
                format!("Switch your wallet to {expected} and try again")
            }
            DeployError::UnsupportedVariant(_) => {
                "That feature combination is not available; pick a supported token type".into()
            }
            DeployError::CompilationFailed(_) => {
                "The token contract could not be compiled; try again later".into()
            }
            DeployError::UserRejected => "You rejected the transaction in your wallet".into(),
            DeployError::InsufficientFunds(_) => {
                "Your wallet does not hold enough native currency to pay for the deployment".into()
            }
            DeployError::AccountNotFound(what) => format!("{what} does not exist on this network"),
            DeployError::AuthorityMismatch(_) => {
                "The connected wallet is not allowed to change this token".into()
            }
            DeployError::Unknown(_) => "Something went wrong during deployment".into(),
        }
    }
}

impl From<token_amount::AmountError> for DeployError {
    fn from(e: token_amount::AmountError) -> Self {
        DeployError::Validation(format!("total supply: {e}"))
    }
}

impl From<chain_eth::EthError> for DeployError {
    fn from(e: chain_eth::EthError) -> Self {
        use chain_eth::EthError;
        match e {
            EthError::UnsupportedVariant(v) => DeployError::UnsupportedVariant(v),
            EthError::CompilationFailed(errors) => DeployError::CompilationFailed(errors),
            EthError::ArtifactNotFound(name) => {
                DeployError::CompilationFailed(vec![format!("no artifact for {name}")])
            }
            EthError::InvalidArtifact(msg) => DeployError::CompilationFailed(vec![msg]),
            EthError::InvalidAddress(msg) | EthError::InvalidArgument(msg) => {
                DeployError::Validation(msg)
            }
            other => DeployError::Unknown(format!("EVM: {other}")),
        }
    }
}

impl From<chain_sol::SolError> for DeployError {
    fn from(e: chain_sol::SolError) -> Self {
        use chain_sol::SolError;
        match e {
            SolError::InvalidAddress(msg) | SolError::InvalidArgument(msg) => {
                DeployError::Validation(msg)
            }
            other => DeployError::Unknown(format!("Solana: {other}")),
        }
    }
}

impl From<WalletError> for DeployError {
    fn from(e: WalletError) -> Self {
        match e {
            WalletError::Rejected => DeployError::UserRejected,
            WalletError::Other(msg) => DeployError::Unknown(format!("wallet: {msg}")),
        }
    }
}

impl From<RpcError> for DeployError {
    fn from(e: RpcError) -> Self {
        if e.is_insufficient_funds() {
            DeployError::InsufficientFunds(e.to_string())
        } else {
            DeployError::Unknown(e.to_string())
        }
    }
}

impl From<StoreError> for DeployError {
    fn from(e: StoreError) -> Self {
        DeployError::Unknown(e.to_string())
    }
}
