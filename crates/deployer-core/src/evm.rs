//! EVM deployment executor.
//!
//! network check -> compile -> constructor args -> nonce/fees/gas ->
//! sign -> broadcast -> receipt. The network check runs before anything
//! else so a wallet on the wrong chain never triggers a compilation.

use std::sync::Arc;

use chain_eth::constructor::deployment_data;
use chain_eth::transaction::{build_contract_creation, contract_address};
use chain_eth::{ConstructorArgs, ConstructorInput, TokenVariant};
use tracing::{debug, info, instrument};

use crate::compiler::ContractCompiler;
use crate::config::DeployerConfig;
use crate::error::DeployError;
use crate::network::NetworkId;
use crate::record::DeploymentOutcome;
use crate::request::{DeploymentPlan, ValidatedRequest};
use crate::rpc::{poll_until, CallRequest, EvmRpc, TransactionReceipt};
use crate::wallet::EvmSigner;

/// A confirmed contract deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvmDeployment {
    pub contract_address: String,
    pub transaction_hash: String,
    pub block_number: u64,
    pub variant: TokenVariant,
    pub constructor_args: ConstructorArgs,
}

impl EvmDeployment {
    pub fn into_outcome(self) -> DeploymentOutcome {
        DeploymentOutcome::Evm {
            contract_address: self.contract_address,
            transaction_hash: self.transaction_hash,
            block_number: Some(self.block_number),
        }
    }
}

pub struct EvmDeployer {
    rpc: Arc<dyn EvmRpc>,
    compiler: Arc<dyn ContractCompiler>,
    config: DeployerConfig,
}

impl EvmDeployer {
    pub fn new(
        rpc: Arc<dyn EvmRpc>,
        compiler: Arc<dyn ContractCompiler>,
        config: DeployerConfig,
    ) -> Self {
        Self {
            rpc,
            compiler,
            config,
        }
    }

    /// Constructor tuple for `validated`, with the configured default tax
    /// and the deployer as treasury filled in for taxable tokens.
    pub fn constructor_args(
        &self,
        validated: &ValidatedRequest,
        variant: TokenVariant,
    ) -> Result<ConstructorArgs, DeployError> {
        let request = &validated.request;
        let input = ConstructorInput {
            name: &request.name,
            symbol: &request.symbol,
            decimals: request.decimals,
            initial_supply: validated.supply,
            tax_percentage: request
                .tax_percentage
                .or(Some(self.config.default_tax_percentage)),
            treasury: request.treasury_wallet.as_deref(),
            deployer: &validated.deployer,
        };
        Ok(ConstructorArgs::for_variant(variant, input)?)
    }

    #[instrument(skip_all, fields(network = %validated.network(), symbol = %validated.request.symbol))]
    pub async fn deploy(
        &self,
        validated: &ValidatedRequest,
        signer: &dyn EvmSigner,
    ) -> Result<EvmDeployment, DeployError> {
        let DeploymentPlan::Evm { variant, chain_id } = validated.plan else {
            return Err(DeployError::Validation(format!(
                "{} is not an EVM network",
                validated.network()
            )));
        };

        let active_chain = signer.chain_id().await?;
        if active_chain != chain_id {
            return Err(DeployError::NetworkMismatch {
                expected: validated.network().to_string(),
                actual: describe_chain(active_chain),
            });
        }

        let from = signer.address();
        if !same_address(&from, &validated.deployer) {
            return Err(DeployError::Validation(format!(
                "signer {from} is not the deployer {}",
                validated.deployer
            )));
        }

        let contract_name = variant.contract_name();
        let artifact = self
            .compiler
            .compile(contract_name)
            .await?
            .into_artifact(contract_name)?;
        debug!(contract = contract_name, bytecode_len = artifact.bytecode.len(), "artifact ready");

        let constructor_args = self.constructor_args(validated, variant)?;
        let init_code = deployment_data(&artifact.bytecode, &constructor_args);

        let nonce = self.rpc.get_transaction_count(&from).await?;
        let fees = self.rpc.fee_data().await?;
        let estimate = self
            .rpc
            .estimate_gas(&CallRequest {
                from: from.clone(),
                data: init_code.clone(),
                value: 0,
            })
            .await?;
        let gas_limit = self.config.buffered_gas(estimate);
        debug!(nonce, estimate, gas_limit, "gas estimated");

        let tx = build_contract_creation(chain_id, nonce, init_code, fees.to_fee_params(), gas_limit)?;
        let signed = signer.sign_transaction(&tx).await?;
        let transaction_hash = self.rpc.send_raw_transaction(&signed.raw_tx).await?;
        info!(%transaction_hash, %variant, "contract creation submitted");

        let receipt = self.wait_for_receipt(&transaction_hash).await?;
        if !receipt.status {
            return Err(DeployError::Unknown(format!(
                "contract creation reverted in block {}",
                receipt.block_number
            )));
        }

        let contract_address = match receipt.contract_address {
            Some(address) => address,
            None => {
                debug!("receipt has no contractAddress; deriving CREATE address");
                contract_address(&from, nonce)?
            }
        };
        info!(%contract_address, block = receipt.block_number, "contract deployed");

        Ok(EvmDeployment {
            contract_address,
            transaction_hash,
            block_number: receipt.block_number,
            variant,
            constructor_args,
        })
    }

    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<TransactionReceipt, DeployError> {
        poll_until(
            self.config.poll_interval(),
            self.config.confirmation_timeout(),
            &format!("receipt of {tx_hash}"),
            || async move {
                self.rpc
                    .get_transaction_receipt(tx_hash)
                    .await
                    .map_err(DeployError::from)
            },
        )
        .await
    }
}

fn describe_chain(chain_id: u64) -> String {
    match NetworkId::from_evm_chain_id(chain_id) {
        Some(network) => network.to_string(),
        None => format!("chain {chain_id}"),
    }
}

fn same_address(a: &str, b: &str) -> bool {
    match (
        chain_eth::address::parse_address(a),
        chain_eth::address::parse_address(b),
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
