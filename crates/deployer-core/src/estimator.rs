//! Pre-flight cost estimates.
//!
//! Best-effort: when the RPC cannot answer, configured fallback values are
//! used and the estimate is flagged. Estimation never fails and never
//! touches deployment records.

use std::fmt;

use chain_eth::TokenVariant;
use chain_sol::metadata::MAX_METADATA_ACCOUNT_SIZE;
use chain_sol::{MINT_ACCOUNT_SIZE, TOKEN_ACCOUNT_SIZE};
use serde::{Deserialize, Serialize};
use token_amount::U256;
use tracing::{debug, warn};

use crate::config::DeployerConfig;
use crate::network::NetworkId;
use crate::request::{DeploymentPlan, ValidatedRequest};
use crate::rpc::{ChainRpc, EvmRpc, RpcError, SolanaRpc};

/// Fee payer and mint key.
const LAUNCH_SIGNATURES: u64 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimate {
    pub network: NetworkId,
    pub native_symbol: String,
    /// Total in wei or lamports.
    pub total_base_units: u128,
    /// Total in whole native units, e.g. `"0.0091"`.
    pub formatted: String,
    /// Whether any part came from fallback values.
    pub used_fallback: bool,
}

impl CostEstimate {
    fn new(network: NetworkId, total_base_units: u128, used_fallback: bool) -> Self {
        let formatted = token_amount::format_units(
            U256::from(total_base_units),
            network.native_decimals(),
        )
        .unwrap_or_else(|_| total_base_units.to_string());
        Self {
            network,
            native_symbol: network.native_symbol().to_string(),
            total_base_units,
            formatted,
            used_fallback,
        }
    }
}

impl fmt::Display for CostEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.used_fallback { "~" } else { "" };
        write!(f, "{prefix}{} {}", self.formatted, self.native_symbol)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CostEstimator {
    config: DeployerConfig,
}

impl CostEstimator {
    pub fn new(config: DeployerConfig) -> Self {
        Self { config }
    }

    /// Estimates the cost of deploying `validated`. A missing or
    /// mismatched `rpc` yields the fallback estimate.
    pub async fn estimate(&self, validated: &ValidatedRequest, rpc: Option<&ChainRpc>) -> CostEstimate {
        let network = validated.network();
        match (validated.plan, rpc) {
            (DeploymentPlan::Evm { variant, .. }, Some(ChainRpc::Evm(rpc))) => {
                self.estimate_evm(network, variant, Some(&**rpc)).await
            }
            (DeploymentPlan::Evm { variant, .. }, _) => {
                self.estimate_evm(network, variant, None).await
            }
            (DeploymentPlan::Solana { .. }, Some(ChainRpc::Solana(rpc))) => {
                self.estimate_solana(network, Some(&**rpc)).await
            }
            (DeploymentPlan::Solana { .. }, _) => self.estimate_solana(network, None).await,
        }
    }

    /// Gas limit for the variant times the current gas price.
    pub async fn estimate_evm(
        &self,
        network: NetworkId,
        variant: TokenVariant,
        rpc: Option<&dyn EvmRpc>,
    ) -> CostEstimate {
        let gas_limit = if variant.is_taxable() {
            self.config.evm_taxable_gas_limit
        } else {
            self.config.evm_gas_limit
        };

        let fee_data = match rpc {
            Some(rpc) => rpc.fee_data().await.map_err(Some),
            None => Err(None),
        };
        let (gas_price, used_fallback) = match fee_data {
            Ok(fees) => (fees.effective_gas_price(), false),
            Err(err) => {
                log_fallback(network, err.as_ref(), "gas price");
                (u128::from(self.config.fallback_gas_price_wei), true)
            }
        };

        let total = gas_price.saturating_mul(u128::from(gas_limit));
        debug!(%network, gas_limit, gas_price, total, "EVM cost estimated");
        CostEstimate::new(network, total, used_fallback)
    }

    /// Rent for the mint, metadata and token accounts plus the launch
    /// transaction's signature fees.
    pub async fn estimate_solana(&self, network: NetworkId, rpc: Option<&dyn SolanaRpc>) -> CostEstimate {
        let live = match rpc {
            Some(rpc) => solana_costs(rpc).await.map_err(Some),
            None => Err(None),
        };

        let (total, used_fallback) = match live {
            Ok(total) => (total, false),
            Err(err) => {
                log_fallback(network, err.as_ref(), "rent and fees");
                let config = &self.config;
                let total = config
                    .fallback_mint_rent_lamports
                    .saturating_add(config.fallback_metadata_rent_lamports)
                    .saturating_add(config.fallback_token_account_rent_lamports)
                    .saturating_add(
                        config
                            .fallback_lamports_per_signature
                            .saturating_mul(LAUNCH_SIGNATURES),
                    );
                (total, true)
            }
        };

        debug!(%network, total, "Solana cost estimated");
        CostEstimate::new(network, u128::from(total), used_fallback)
    }
}

async fn solana_costs(rpc: &dyn SolanaRpc) -> Result<u64, RpcError> {
    let mut total = 0u64;
    for space in [MINT_ACCOUNT_SIZE, MAX_METADATA_ACCOUNT_SIZE, TOKEN_ACCOUNT_SIZE] {
        total = total.saturating_add(rpc.get_minimum_balance_for_rent_exemption(space).await?);
    }
    let per_signature = rpc.get_fee_per_signature().await?;
    Ok(total.saturating_add(per_signature.saturating_mul(LAUNCH_SIGNATURES)))
}

fn log_fallback(network: NetworkId, err: Option<&RpcError>, what: &str) {
    match err {
        Some(err) => warn!(%network, error = %err, "{what} lookup failed; using fallback"),
        None => warn!(%network, "no RPC configured; using fallback {what}"),
    }
}
