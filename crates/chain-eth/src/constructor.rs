//! Constructor argument tuples for the token contracts.
//!
//! Positional layout expected by every variant:
//!
//! ```text
//! 0  string   name
//! 1  string   symbol
//! 2  uint8    decimals
//! 3  uint256  initialSupply   (base units, minted to the deployer)
//! 4  uint256  taxPercentage   (taxable only)
//! 5  address  treasury        (taxable only)
//! ```

use alloy_primitives::U256;

use crate::abi::{encode_params, AbiParam};
use crate::address::{format_address, parse_address};
use crate::error::EthError;
use crate::variant::TokenVariant;

/// Tax applied when a taxable token is requested without a percentage.
pub const DEFAULT_TAX_PERCENTAGE: u8 = 5;

/// Upper bound on the transfer tax, in percent.
pub const MAX_TAX_PERCENTAGE: u8 = 25;

/// Raw inputs for [`ConstructorArgs::for_variant`]. Optional tax settings
/// are resolved against `deployer` there.
#[derive(Debug, Clone)]
pub struct ConstructorInput<'a> {
    pub name: &'a str,
    pub symbol: &'a str,
    pub decimals: u8,
    pub initial_supply: U256,
    pub tax_percentage: Option<u8>,
    pub treasury: Option<&'a str>,
    pub deployer: &'a str,
}

/// Resolved tax settings for the taxable variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxSettings {
    pub percentage: u8,
    pub treasury: [u8; 20],
}

/// A fully resolved constructor tuple. No field is left optional: defaults
/// are applied before the tuple exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorArgs {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub initial_supply: U256,
    pub tax: Option<TaxSettings>,
}

impl ConstructorArgs {
    /// Builds the tuple for `variant`, applying the taxable defaults
    /// (5 percent, treasury = deployer).
    pub fn for_variant(variant: TokenVariant, input: ConstructorInput<'_>) -> Result<Self, EthError> {
        let deployer = parse_address(input.deployer)?;

        let tax = if variant.is_taxable() {
            let percentage = input.tax_percentage.unwrap_or(DEFAULT_TAX_PERCENTAGE);
            if percentage > MAX_TAX_PERCENTAGE {
                return Err(EthError::InvalidArgument(format!(
                    "tax percentage {percentage} exceeds {MAX_TAX_PERCENTAGE}"
                )));
            }

            let treasury = match input.treasury.map(str::trim).filter(|t| !t.is_empty()) {
                Some(addr) => parse_address(addr)?,
                None => deployer,
            };

            Some(TaxSettings {
                percentage,
                treasury,
            })
        } else {
            None
        };

        Ok(ConstructorArgs {
            name: input.name.to_string(),
            symbol: input.symbol.to_string(),
            decimals: input.decimals,
            initial_supply: input.initial_supply,
            tax,
        })
    }

    /// The positional parameter list, in contract order.
    pub fn to_abi_params(&self) -> Vec<AbiParam> {
        let mut params = vec![
            AbiParam::String(self.name.clone()),
            AbiParam::String(self.symbol.clone()),
            AbiParam::uint(U256::from(self.decimals)),
            AbiParam::uint(self.initial_supply),
        ];

        if let Some(tax) = &self.tax {
            params.push(AbiParam::uint(U256::from(tax.percentage)));
            params.push(AbiParam::Address(tax.treasury));
        }

        params
    }

    /// Checksummed treasury address, when taxable.
    pub fn treasury_address(&self) -> Option<String> {
        self.tax.as_ref().map(|t| format_address(&t.treasury))
    }

    /// ABI-encoded constructor arguments.
    pub fn encode(&self) -> Vec<u8> {
        encode_params(&self.to_abi_params())
    }
}

/// Creation calldata: contract bytecode followed by the encoded arguments.
pub fn deployment_data(bytecode: &[u8], args: &ConstructorArgs) -> Vec<u8> {
    let encoded = args.encode();
    let mut data = Vec::with_capacity(bytecode.len() + encoded.len());
    data.extend_from_slice(bytecode);
    data.extend_from_slice(&encoded);
    data
}
