//! Deployment requests and their validation.
//!
//! Validation is synchronous and happens before any record is created or any
//! chain call is made. Its output, [`ValidatedRequest`], carries the
//! normalized request plus everything the executors derive from it: the
//! parsed supply in base units and the chain-specific plan.

use chain_eth::{EvmFeatures, TokenVariant};
use chain_sol::metadata::{MAX_NAME_LENGTH, MAX_SYMBOL_LENGTH, MAX_URI_LENGTH};
use chain_sol::sequence::MAX_SOLANA_DECIMALS;
use chain_sol::{AuthorityFlags, SolanaCluster};
use serde::{Deserialize, Serialize};
use token_amount::U256;

use crate::error::DeployError;
use crate::network::{ChainFamily, NetworkId};

pub const MAX_EVM_NAME_CHARS: usize = 50;
pub const MAX_EVM_DECIMALS: u8 = 18;
pub const MAX_TAX_PERCENTAGE: u8 = chain_eth::constructor::MAX_TAX_PERCENTAGE;

/// What the user asked to deploy, as the client submits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDeploymentRequest {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Decimal string. Empty or `"0"` means no initial supply.
    #[serde(default)]
    pub total_supply: String,
    pub chain_id: NetworkId,
    /// Explicit EVM contract tag (`standard|mintable|burnable|taxable`).
    /// Takes precedence over the feature flags when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(flatten)]
    pub features: EvmFeatures,
    #[serde(flatten)]
    pub authorities: AuthorityFlags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_percentage: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treasury_wallet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TokenDeploymentRequest {
    /// A request with no optional fields set.
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        decimals: u8,
        total_supply: impl Into<String>,
        chain_id: NetworkId,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals,
            total_supply: total_supply.into(),
            chain_id,
            token_type: None,
            features: EvmFeatures::default(),
            authorities: AuthorityFlags::default(),
            tax_percentage: None,
            treasury_wallet: None,
            logo_url: None,
            description: None,
        }
    }

    pub fn family(&self) -> ChainFamily {
        self.chain_id.family()
    }
}

/// Chain-specific execution plan resolved during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentPlan {
    Evm {
        variant: TokenVariant,
        chain_id: u64,
    },
    Solana {
        cluster: SolanaCluster,
        supply: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    /// The request with name trimmed and symbol upper-cased.
    pub request: TokenDeploymentRequest,
    pub deployer: String,
    /// Initial supply in base units.
    pub supply: U256,
    pub plan: DeploymentPlan,
}

impl ValidatedRequest {
    pub fn network(&self) -> NetworkId {
        self.request.chain_id
    }

    pub fn has_supply(&self) -> bool {
        !self.supply.is_zero()
    }
}

/// Checks `request` against the limits of its chain family and resolves the
/// plan. `deployer` is the address of the wallet that will sign.
pub fn validate_request(
    request: &TokenDeploymentRequest,
    deployer: &str,
) -> Result<ValidatedRequest, DeployError> {
    let mut normalized = request.clone();
    normalized.name = request.name.trim().to_string();
    normalized.symbol = request.symbol.trim().to_uppercase();
    normalized.total_supply = request.total_supply.trim().to_string();
    normalized.treasury_wallet = non_empty(&request.treasury_wallet);
    normalized.logo_url = non_empty(&request.logo_url);
    normalized.description = non_empty(&request.description);
    let deployer = deployer.trim().to_string();

    if normalized.name.is_empty() {
        return Err(DeployError::Validation("name is required".into()));
    }
    if normalized.symbol.is_empty() {
        return Err(DeployError::Validation("symbol is required".into()));
    }
    if normalized.symbol.chars().any(char::is_whitespace) {
        return Err(DeployError::Validation(
            "symbol must not contain whitespace".into(),
        ));
    }
    if let Some(tax) = normalized.tax_percentage {
        if tax > MAX_TAX_PERCENTAGE {
            return Err(DeployError::Validation(format!(
                "tax percentage {tax} exceeds {MAX_TAX_PERCENTAGE}"
            )));
        }
    }

    let (supply, plan) = match normalized.chain_id.family() {
        ChainFamily::Evm => validate_evm(&normalized, &deployer)?,
        ChainFamily::Solana => validate_solana(&normalized, &deployer)?,
    };

    Ok(ValidatedRequest {
        request: normalized,
        deployer,
        supply,
        plan,
    })
}

fn validate_evm(
    request: &TokenDeploymentRequest,
    deployer: &str,
) -> Result<(U256, DeploymentPlan), DeployError> {
    if request.name.chars().count() > MAX_EVM_NAME_CHARS {
        return Err(DeployError::Validation(format!(
            "name exceeds {MAX_EVM_NAME_CHARS} characters"
        )));
    }
    if request.symbol.chars().count() > MAX_SYMBOL_LENGTH {
        return Err(DeployError::Validation(format!(
            "symbol exceeds {MAX_SYMBOL_LENGTH} characters"
        )));
    }
    if request.decimals > MAX_EVM_DECIMALS {
        return Err(DeployError::Validation(format!(
            "decimals must be between 0 and {MAX_EVM_DECIMALS}"
        )));
    }

    chain_eth::address::parse_address(deployer)
        .map_err(|e| DeployError::Validation(format!("deployer address: {e}")))?;
    if let Some(treasury) = &request.treasury_wallet {
        chain_eth::address::parse_address(treasury)
            .map_err(|e| DeployError::Validation(format!("treasury wallet: {e}")))?;
    }

    let variant = match &request.token_type {
        Some(tag) => TokenVariant::from_tag(tag)?,
        None => TokenVariant::from_features(&request.features)?,
    };

    let supply = token_amount::to_base_units(&request.total_supply, request.decimals)?;
    if supply.is_zero() && !variant.can_mint() {
        return Err(DeployError::Validation(
            "a token without initial supply must be mintable".into(),
        ));
    }

    let chain_id = request
        .chain_id
        .evm_chain_id()
        .ok_or_else(|| DeployError::Validation(format!("{} is not an EVM network", request.chain_id)))?;

    Ok((supply, DeploymentPlan::Evm { variant, chain_id }))
}

fn validate_solana(
    request: &TokenDeploymentRequest,
    deployer: &str,
) -> Result<(U256, DeploymentPlan), DeployError> {
    if request.name.len() > MAX_NAME_LENGTH {
        return Err(DeployError::Validation(format!(
            "name exceeds {MAX_NAME_LENGTH} bytes"
        )));
    }
    if request.symbol.len() > MAX_SYMBOL_LENGTH {
        return Err(DeployError::Validation(format!(
            "symbol exceeds {MAX_SYMBOL_LENGTH} bytes"
        )));
    }
    if request.decimals > MAX_SOLANA_DECIMALS {
        return Err(DeployError::Validation(format!(
            "decimals must be between 0 and {MAX_SOLANA_DECIMALS}"
        )));
    }
    if let Some(uri) = &request.logo_url {
        if uri.len() > MAX_URI_LENGTH {
            return Err(DeployError::Validation(format!(
                "logo URL exceeds {MAX_URI_LENGTH} bytes"
            )));
        }
    }

    chain_sol::address_to_bytes(deployer)
        .map_err(|e| DeployError::Validation(format!("deployer address: {e}")))?;
    if let Some(treasury) = &request.treasury_wallet {
        chain_sol::address_to_bytes(treasury)
            .map_err(|e| DeployError::Validation(format!("treasury wallet: {e}")))?;
    }

    let supply = token_amount::to_base_units(&request.total_supply, request.decimals)?;
    let supply_u64 = u64::try_from(supply).map_err(|_| {
        DeployError::Validation("total supply exceeds the SPL token maximum".into())
    })?;
    if supply_u64 == 0 && !request.authorities.enable_mint_authority {
        return Err(DeployError::Validation(
            "a token without initial supply must keep its mint authority".into(),
        ));
    }

    let cluster = request
        .chain_id
        .solana_cluster()
        .ok_or_else(|| DeployError::Validation(format!("{} is not a Solana network", request.chain_id)))?;

    Ok((
        supply,
        DeploymentPlan::Solana {
            cluster,
            supply: supply_u64,
        },
    ))
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const EVM_DEPLOYER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn sol_deployer() -> String {
        chain_sol::bytes_to_address(&chain_sol::public_key_from_seed(&[7u8; 32]))
    }

    fn evm_request() -> TokenDeploymentRequest {
        TokenDeploymentRequest::new("My Token", "mtk", 18, "1000000", NetworkId::Sepolia)
    }

    fn sol_request() -> TokenDeploymentRequest {
        let mut req = TokenDeploymentRequest::new("Test", "tst", 9, "1000000", NetworkId::SolanaDevnet);
        req.authorities.enable_update_authority = true;
        req
    }

    // -- normalization --

    #[test]
    fn symbol_is_uppercased_and_name_trimmed() {
        let mut req = sol_request();
        req.name = "  Test  ".into();
        let validated = validate_request(&req, &sol_deployer()).unwrap();
        assert_eq!(validated.request.symbol, "TST");
        assert_eq!(validated.request.name, "Test");
        assert_eq!(validated.supply, U256::from(1_000_000_000_000_000u64));
        assert_eq!(
            validated.plan,
            DeploymentPlan::Solana {
                cluster: SolanaCluster::Devnet,
                supply: 1_000_000_000_000_000,
            }
        );
    }

    #[test]
    fn blank_optional_fields_become_none() {
        let mut req = evm_request();
        req.treasury_wallet = Some("   ".into());
        req.logo_url = Some(String::new());
        let validated = validate_request(&req, EVM_DEPLOYER).unwrap();
        assert_eq!(validated.request.treasury_wallet, None);
        assert_eq!(validated.request.logo_url, None);
    }

    // -- EVM --

    #[test]
    fn evm_variant_from_features_and_tag() {
        let mut req = evm_request();
        req.features.burnable = true;
        let validated = validate_request(&req, EVM_DEPLOYER).unwrap();
        assert_eq!(
            validated.plan,
            DeploymentPlan::Evm {
                variant: TokenVariant::Burnable,
                chain_id: 11155111,
            }
        );

        req.token_type = Some("taxable".into());
        let validated = validate_request(&req, EVM_DEPLOYER).unwrap();
        assert!(matches!(
            validated.plan,
            DeploymentPlan::Evm {
                variant: TokenVariant::Taxable,
                ..
            }
        ));
    }

    #[test]
    fn evm_unknown_tag_is_unsupported_variant() {
        let mut req = evm_request();
        req.token_type = Some("rebasing".into());
        let err = validate_request(&req, EVM_DEPLOYER).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedVariant);

        let mut req = evm_request();
        req.features.pausable = true;
        let err = validate_request(&req, EVM_DEPLOYER).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedVariant);
    }

    #[test]
    fn evm_limits() {
        let mut req = evm_request();
        req.name = "x".repeat(51);
        assert!(validate_request(&req, EVM_DEPLOYER).is_err());
        req.name = "x".repeat(50);
        assert!(validate_request(&req, EVM_DEPLOYER).is_ok());

        let mut req = evm_request();
        req.decimals = 19;
        assert!(validate_request(&req, EVM_DEPLOYER).is_err());

        let mut req = evm_request();
        req.symbol = "ABCDEFGHIJK".into();
        assert!(validate_request(&req, EVM_DEPLOYER).is_err());

        let mut req = evm_request();
        req.tax_percentage = Some(26);
        assert!(validate_request(&req, EVM_DEPLOYER).is_err());
    }

    #[test]
    fn evm_addresses_are_checked() {
        let req = evm_request();
        assert!(validate_request(&req, "not-an-address").is_err());
        assert!(validate_request(&req, &sol_deployer()).is_err());

        let mut req = evm_request();
        req.treasury_wallet = Some("0x1234".into());
        let err = validate_request(&req, EVM_DEPLOYER).unwrap_err();
        assert!(err.to_string().contains("treasury"));
    }

    #[test]
    fn evm_zero_supply_requires_mintable() {
        let mut req = evm_request();
        req.total_supply = String::new();
        assert_eq!(
            validate_request(&req, EVM_DEPLOYER).unwrap_err().kind(),
            ErrorKind::Validation
        );

        req.features.mintable = true;
        let validated = validate_request(&req, EVM_DEPLOYER).unwrap();
        assert!(!validated.has_supply());
    }

    #[test]
    fn evm_bad_supply_is_validation_error() {
        let mut req = evm_request();
        req.total_supply = "1,000".into();
        assert_eq!(
            validate_request(&req, EVM_DEPLOYER).unwrap_err().kind(),
            ErrorKind::Validation
        );
    }

    // -- Solana --

    #[test]
    fn solana_limits() {
        let mut req = sol_request();
        req.decimals = 10;
        assert!(validate_request(&req, &sol_deployer()).is_err());

        let mut req = sol_request();
        req.name = "é".repeat(17);
        assert!(validate_request(&req, &sol_deployer()).is_err());

        let mut req = sol_request();
        req.logo_url = Some(format!("https://{}", "a".repeat(200)));
        assert!(validate_request(&req, &sol_deployer()).is_err());

        let req = sol_request();
        assert!(validate_request(&req, EVM_DEPLOYER).is_err());
    }

    #[test]
    fn solana_supply_must_fit_u64() {
        let mut req = sol_request();
        req.total_supply = "18446744073709551616".into();
        req.decimals = 0;
        let err = validate_request(&req, &sol_deployer()).unwrap_err();
        assert!(err.to_string().contains("SPL token maximum"));
    }

    #[test]
    fn solana_zero_supply_requires_mint_authority() {
        let mut req = sol_request();
        req.total_supply = "0".into();
        assert!(validate_request(&req, &sol_deployer()).is_err());

        req.authorities.enable_mint_authority = true;
        assert!(validate_request(&req, &sol_deployer()).is_ok());
    }

    // -- serde --

    #[test]
    fn request_deserializes_client_payload() {
        let json = r#"{
            "name": "Test",
            "symbol": "tst",
            "decimals": 9,
            "totalSupply": "1000000",
            "chainId": "solana-devnet",
            "enableMintAuthority": false,
            "enableUpdateAuthority": true,
            "logoUrl": "https://example.com/logo.png"
        }"#;
        let req: TokenDeploymentRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.chain_id, NetworkId::SolanaDevnet);
        assert!(req.authorities.enable_update_authority);
        assert!(!req.authorities.enable_freeze_authority);
        assert!(!req.features.mintable);
        assert_eq!(req.logo_url.as_deref(), Some("https://example.com/logo.png"));
    }

    #[test]
    fn request_serializes_flags_inline() {
        let mut req = evm_request();
        req.features.taxable = true;
        req.tax_percentage = Some(3);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["taxable"], true);
        assert_eq!(value["taxPercentage"], 3);
        assert_eq!(value["chainId"], "sepolia");
        assert!(value.get("treasuryWallet").is_none());
    }
}
