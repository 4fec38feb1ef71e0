//! Multi-chain token deployment orchestration.
//!
//! This crate provides:
//! - Request validation per chain family and the network catalogue
//! - EVM contract deployment and Solana SPL mint launch executors
//! - Deployment records with a single `pending` to terminal transition
//! - Background orchestration with cancellation
//! - Pre-flight cost estimation and the token HTTP handlers
//!
//! Chain access, signing, compilation and persistence sit behind async
//! traits ([`EvmRpc`], [`SolanaRpc`], [`EvmSigner`], [`SolanaWallet`],
//! [`ContractCompiler`], [`RecordStore`]).

pub mod compiler;
pub mod config;
pub mod error;
pub mod estimator;
pub mod evm;
pub mod network;
pub mod orchestrator;
pub mod record;
pub mod request;
pub mod rpc;
pub mod service;
pub mod solana;
pub mod store;
pub mod wallet;

#[cfg(test)]
mod testing;

pub use compiler::{CompilerError, ContractCompiler, StaticCompiler};
pub use config::{ConfigError, DeployerConfig};
pub use error::{DeployError, ErrorKind};
pub use estimator::{CostEstimate, CostEstimator};
pub use evm::{EvmDeployer, EvmDeployment};
pub use network::{ChainFamily, NetworkId};
pub use orchestrator::{DeploymentOrchestrator, DeploymentTask, TaskOutcome};
pub use record::{DeploymentOutcome, DeploymentRecord, DeploymentStatus, RecordUpdate};
pub use request::{validate_request, DeploymentPlan, TokenDeploymentRequest, ValidatedRequest};
pub use rpc::{ChainRpc, EvmRpc, RpcError, SolanaRpc};
pub use service::{DeployPayload, ServiceError, StatusUpdate, TokenService};
pub use solana::{SolanaDeployer, SolanaDeployment};
pub use store::{MemoryRecordStore, RecordStore, StoreError};
pub use wallet::{
    EvmSigner, LocalEvmSigner, LocalSolanaWallet, SolanaWallet, WalletCapability, WalletError,
};
