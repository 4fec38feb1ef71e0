use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use chain_eth::constructor::MAX_TAX_PERCENTAGE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing deployer config")]
    Missing,
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables for the executors and the estimator.
///
/// Every field has a default, so `{}` is a valid config and partial JSON
/// only overrides what it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeployerConfig {
    /// How long to wait for a receipt or confirmation after submission.
    pub confirmation_timeout_secs: u64,
    pub poll_interval_ms: u64,
    /// Added on top of the node's gas estimate.
    pub gas_buffer_percent: u64,
    /// Tax applied to taxable tokens when the request leaves it unset.
    pub default_tax_percentage: u8,

    /// Gas the estimator budgets for a deployment. There is no bytecode
    /// to simulate before compilation, so these always apply.
    pub evm_gas_limit: u64,
    pub evm_taxable_gas_limit: u64,

    // Estimator fallbacks, used when the RPC cannot answer.
    pub fallback_gas_price_wei: u64,
    pub fallback_lamports_per_signature: u64,
    pub fallback_mint_rent_lamports: u64,
    pub fallback_token_account_rent_lamports: u64,
    pub fallback_metadata_rent_lamports: u64,
}

impl Default for DeployerConfig {
    fn default() -> Self {
        Self {
            confirmation_timeout_secs: 120,
            poll_interval_ms: 1_500,
            gas_buffer_percent: 20,
            default_tax_percentage: chain_eth::DEFAULT_TAX_PERCENTAGE,
            evm_gas_limit: 1_500_000,
            evm_taxable_gas_limit: 2_500_000,
            fallback_gas_price_wei: 20_000_000_000,
            fallback_lamports_per_signature: 5_000,
            fallback_mint_rent_lamports: 1_461_600,
            fallback_token_account_rent_lamports: 2_039_280,
            fallback_metadata_rent_lamports: 5_616_720,
        }
    }
}

impl DeployerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Self::from_json_value(&value)
    }

    /// Reads the `deployer` object from a larger settings blob, e.g.
    ///
    /// ```json
    /// { "deployer": { "pollIntervalMs": 500, "gasBufferPercent": 30 } }
    /// ```
    pub fn from_json_value(settings: &Value) -> Result<Self, ConfigError> {
        let section = settings.get("deployer").ok_or(ConfigError::Missing)?;
        let config = serde_json::from_value::<DeployerConfig>(section.clone())
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("pollIntervalMs must be positive".into()));
        }
        if self.confirmation_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "confirmationTimeoutSecs must be positive".into(),
            ));
        }
        if self.default_tax_percentage > MAX_TAX_PERCENTAGE {
            return Err(ConfigError::Invalid(format!(
                "defaultTaxPercentage {} exceeds {MAX_TAX_PERCENTAGE}",
                self.default_tax_percentage
            )));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }

    /// `estimate` plus the configured buffer.
    pub fn buffered_gas(&self, estimate: u64) -> u64 {
        estimate.saturating_add(estimate.saturating_mul(self.gas_buffer_percent) / 100)
    }
}
