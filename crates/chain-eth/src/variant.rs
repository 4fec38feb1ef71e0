//! Contract variant selection.
//!
//! Each deployable ERC-20 variant is a separately compiled contract. The
//! choice is a pure function of the requested feature flags so every flag
//! combination can be enumerated and tested.
//!
//! | variant    | contract         | features covered                |
//! |------------|------------------|---------------------------------|
//! | `standard` | `StandardToken`  | none                            |
//! | `mintable` | `MintableToken`  | owner mint, holder burn         |
//! | `burnable` | `BurnableToken`  | holder burn                     |
//! | `taxable`  | `TaxableToken`   | transfer tax paid to a treasury |
//!
//! `pausable` and `capped` have no contract of their own; requesting them is
//! an [`EthError::UnsupportedVariant`] rather than a silent downgrade.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EthError;

/// Feature flags a user can request for an EVM token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvmFeatures {
    pub mintable: bool,
    pub burnable: bool,
    pub pausable: bool,
    pub capped: bool,
    pub taxable: bool,
}

impl EvmFeatures {
    /// Every one of the 32 flag combinations, for exhaustive checks.
    pub fn all_combinations() -> impl Iterator<Item = EvmFeatures> {
        (0u8..32).map(|bits| EvmFeatures {
            mintable: bits & 1 != 0,
            burnable: bits & 2 != 0,
            pausable: bits & 4 != 0,
            capped: bits & 8 != 0,
            taxable: bits & 16 != 0,
        })
    }
}

/// A deployable token contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenVariant {
    Standard,
    Mintable,
    Burnable,
    Taxable,
}

impl TokenVariant {
    pub const ALL: [TokenVariant; 4] = [
        TokenVariant::Standard,
        TokenVariant::Mintable,
        TokenVariant::Burnable,
        TokenVariant::Taxable,
    ];

    /// Name of the compiled contract the external compiler is asked for.
    pub fn contract_name(&self) -> &'static str {
        match self {
            TokenVariant::Standard => "StandardToken",
            TokenVariant::Mintable => "MintableToken",
            TokenVariant::Burnable => "BurnableToken",
            TokenVariant::Taxable => "TaxableToken",
        }
    }

    /// The lowercase type tag used by clients.
    pub fn tag(&self) -> &'static str {
        match self {
            TokenVariant::Standard => "standard",
            TokenVariant::Mintable => "mintable",
            TokenVariant::Burnable => "burnable",
            TokenVariant::Taxable => "taxable",
        }
    }

    pub fn is_taxable(&self) -> bool {
        matches!(self, TokenVariant::Taxable)
    }

    /// Number of positional constructor arguments the contract expects.
    pub fn constructor_arity(&self) -> usize {
        if self.is_taxable() {
            6
        } else {
            4
        }
    }

    /// Whether the deployed contract lets its owner create new supply.
    pub fn can_mint(&self) -> bool {
        matches!(self, TokenVariant::Mintable)
    }

    /// Resolves a client-supplied type tag.
    pub fn from_tag(tag: &str) -> Result<Self, EthError> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(TokenVariant::Standard),
            "mintable" => Ok(TokenVariant::Mintable),
            "burnable" => Ok(TokenVariant::Burnable),
            "taxable" => Ok(TokenVariant::Taxable),
            other => Err(EthError::UnsupportedVariant(other.to_string())),
        }
    }

    /// Selects the contract covering exactly the requested features.
    pub fn from_features(features: &EvmFeatures) -> Result<Self, EthError> {
        if features.pausable {
            return Err(EthError::UnsupportedVariant("pausable".into()));
        }
        if features.capped {
            return Err(EthError::UnsupportedVariant("capped".into()));
        }

        match (features.taxable, features.mintable, features.burnable) {
            (true, false, false) => Ok(TokenVariant::Taxable),
            (true, _, _) => Err(EthError::UnsupportedVariant(
                "taxable cannot be combined with mintable or burnable".into(),
            )),
            (false, true, _) => Ok(TokenVariant::Mintable),
            (false, false, true) => Ok(TokenVariant::Burnable),
            (false, false, false) => Ok(TokenVariant::Standard),
        }
    }
}

impl fmt::Display for TokenVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for TokenVariant {
    type Err = EthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TokenVariant::from_tag(s)
    }
}
