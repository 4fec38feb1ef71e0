//! Deployment orchestration.
//!
//! [`DeploymentOrchestrator::submit`] validates synchronously, creates the
//! `pending` record and returns it together with a [`DeploymentTask`]. The
//! chain submission runs in the background and writes the terminal state to
//! the store exactly once. It is never retried.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info, info_span, warn, Instrument};

use crate::compiler::ContractCompiler;
use crate::config::DeployerConfig;
use crate::error::DeployError;
use crate::estimator::{CostEstimate, CostEstimator};
use crate::evm::EvmDeployer;
use crate::network::{ChainFamily, NetworkId};
use crate::record::{DeploymentOutcome, DeploymentRecord, RecordUpdate};
use crate::request::{validate_request, TokenDeploymentRequest, ValidatedRequest};
use crate::rpc::{ChainRpc, EvmRpc, SolanaRpc};
use crate::solana::SolanaDeployer;
use crate::store::RecordStore;
use crate::wallet::{EvmSigner, SolanaWallet, WalletCapability};

/// Failure reason recorded for a cancelled deployment.
pub const CANCELLED_REASON: &str = "cancelled";

/// How a background deployment ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Deployed(DeploymentOutcome),
    Failed(DeployError),
    Cancelled,
}

impl TaskOutcome {
    fn to_update(&self) -> RecordUpdate {
        match self {
            TaskOutcome::Deployed(outcome) => RecordUpdate::Deployed(outcome.clone()),
            TaskOutcome::Failed(err) => RecordUpdate::Failed {
                reason: err.to_string(),
            },
            TaskOutcome::Cancelled => RecordUpdate::Failed {
                reason: CANCELLED_REASON.to_string(),
            },
        }
    }
}

/// Handle to a background deployment.
///
/// Dropping the handle detaches the task; it keeps running and still
/// records its result.
#[derive(Debug)]
pub struct DeploymentTask {
    id: String,
    handle: JoinHandle<TaskOutcome>,
    cancel: Option<oneshot::Sender<()>>,
}

impl DeploymentTask {
    /// Id of the record this task will finalize.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Asks the task to stop. The record becomes `failed` with reason
    /// `"cancelled"`. A transaction already broadcast may still land on
    /// chain. Returns `false` if the task already finished or was
    /// cancelled before.
    pub fn cancel(&mut self) -> bool {
        match self.cancel.take() {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }

    /// Waits for the task and returns how it ended.
    pub async fn wait(self) -> Result<TaskOutcome, DeployError> {
        self.handle
            .await
            .map_err(|e| DeployError::Unknown(format!("deployment task aborted: {e}")))
    }
}

enum Execution {
    Evm {
        deployer: EvmDeployer,
        signer: Arc<dyn EvmSigner>,
    },
    Solana {
        deployer: SolanaDeployer,
        wallet: Arc<dyn SolanaWallet>,
    },
}

impl Execution {
    async fn run(&self, validated: &ValidatedRequest) -> Result<DeploymentOutcome, DeployError> {
        match self {
            Execution::Evm { deployer, signer } => Ok(deployer
                .deploy(validated, signer.as_ref())
                .await?
                .into_outcome()),
            Execution::Solana { deployer, wallet } => Ok(deployer
                .deploy(validated, wallet.as_ref())
                .await?
                .into_outcome()),
        }
    }
}

pub struct DeploymentOrchestrator {
    store: Arc<dyn RecordStore>,
    compiler: Arc<dyn ContractCompiler>,
    rpcs: HashMap<NetworkId, ChainRpc>,
    config: DeployerConfig,
}

impl DeploymentOrchestrator {
    pub fn new(
        store: Arc<dyn RecordStore>,
        compiler: Arc<dyn ContractCompiler>,
        config: DeployerConfig,
    ) -> Self {
        Self {
            store,
            compiler,
            rpcs: HashMap::new(),
            config,
        }
    }

    /// Enables `network` with the given client. Non-EVM networks are ignored.
    pub fn with_evm_rpc(mut self, network: NetworkId, rpc: Arc<dyn EvmRpc>) -> Self {
        if network.family() == ChainFamily::Evm {
            self.rpcs.insert(network, ChainRpc::Evm(rpc));
        } else {
            warn!(%network, "EVM RPC registered for a non-EVM network; ignored");
        }
        self
    }

    /// Enables `network` with the given client. Non-Solana networks are ignored.
    pub fn with_solana_rpc(mut self, network: NetworkId, rpc: Arc<dyn SolanaRpc>) -> Self {
        if network.family() == ChainFamily::Solana {
            self.rpcs.insert(network, ChainRpc::Solana(rpc));
        } else {
            warn!(%network, "Solana RPC registered for a non-Solana network; ignored");
        }
        self
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Networks with a configured RPC client.
    pub fn networks(&self) -> Vec<NetworkId> {
        let mut networks: Vec<_> = self.rpcs.keys().copied().collect();
        networks.sort_by_key(|n| NetworkId::ALL.iter().position(|m| m == n));
        networks
    }

    /// Best-effort cost of deploying `request` from `deployer`.
    pub async fn estimate(
        &self,
        request: &TokenDeploymentRequest,
        deployer: &str,
    ) -> Result<CostEstimate, DeployError> {
        let validated = validate_request(request, deployer)?;
        let estimator = CostEstimator::new(self.config.clone());
        Ok(estimator
            .estimate(&validated, self.rpcs.get(&validated.network()))
            .await)
    }

    /// Executor for post-launch authority management on `network`.
    pub fn solana_deployer(&self, network: NetworkId) -> Result<SolanaDeployer, DeployError> {
        match self.rpcs.get(&network) {
            Some(ChainRpc::Solana(rpc)) => Ok(SolanaDeployer::new(rpc.clone(), self.config.clone())),
            _ => Err(DeployError::Validation(format!("{network} is not enabled"))),
        }
    }

    /// Validates `request`, records it as `pending` and starts the chain
    /// submission in the background.
    ///
    /// Validation, family and network-availability errors are returned
    /// before any record exists.
    pub async fn submit(
        &self,
        request: TokenDeploymentRequest,
        wallet: WalletCapability,
    ) -> Result<(DeploymentRecord, DeploymentTask), DeployError> {
        let network = request.chain_id;
        if wallet.family() != network.family() {
            return Err(DeployError::NetworkMismatch {
                expected: network.to_string(),
                actual: format!("{} wallet", wallet.family()),
            });
        }

        let validated = validate_request(&request, &wallet.address())?;
        let execution = self.execution_for(network, wallet)?;

        let record = self
            .store
            .create(validated.request.clone(), validated.deployer.clone())
            .await?;
        info!(id = %record.id, %network, symbol = %record.request.symbol, "deployment record created");

        let task = self.spawn(record.id.clone(), validated, execution);
        Ok((record, task))
    }

    fn execution_for(
        &self,
        network: NetworkId,
        wallet: WalletCapability,
    ) -> Result<Execution, DeployError> {
        match (self.rpcs.get(&network), wallet) {
            (Some(ChainRpc::Evm(rpc)), WalletCapability::Evm(signer)) => Ok(Execution::Evm {
                deployer: EvmDeployer::new(rpc.clone(), self.compiler.clone(), self.config.clone()),
                signer,
            }),
            (Some(ChainRpc::Solana(rpc)), WalletCapability::Solana(wallet)) => {
                Ok(Execution::Solana {
                    deployer: SolanaDeployer::new(rpc.clone(), self.config.clone()),
                    wallet,
                })
            }
            _ => Err(DeployError::Validation(format!("{network} is not enabled"))),
        }
    }

    fn spawn(&self, id: String, validated: ValidatedRequest, execution: Execution) -> DeploymentTask {
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
        let store = self.store.clone();
        let span = info_span!("deployment", id = %id, network = %validated.network());
        let record_id = id.clone();

        let handle = tokio::spawn(
            async move {
                // A dropped sender disables the cancel branch; only an
                // explicit cancel() stops the run.
                let outcome = tokio::select! {
                    result = execution.run(&validated) => match result {
                        Ok(outcome) => TaskOutcome::Deployed(outcome),
                        Err(err) => TaskOutcome::Failed(err),
                    },
                    Ok(()) = &mut cancel_rx => TaskOutcome::Cancelled,
                };

                match &outcome {
                    TaskOutcome::Deployed(o) => {
                        info!(address = o.address(), tx = o.transaction_id(), "deployment confirmed")
                    }
                    TaskOutcome::Failed(err) => {
                        error!(kind = ?err.kind(), error = %err, "deployment failed")
                    }
                    TaskOutcome::Cancelled => warn!("deployment cancelled"),
                }

                match store.update(&record_id, outcome.to_update()).await {
                    Ok(Some(record)) => info!(status = %record.status, "record finalized"),
                    Ok(None) => warn!("record disappeared before it could be finalized"),
                    Err(err) => error!(error = %err, "failed to finalize record"),
                }

                outcome
            }
            .instrument(span),
        );

        DeploymentTask {
            id,
            handle,
            cancel: Some(cancel_tx),
        }
    }
}
