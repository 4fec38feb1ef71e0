//! EVM chain support for the token deployer.
//!
//! This crate provides:
//! - Contract variant selection from the requested feature flags
//! - Constructor argument construction and ABI encoding
//! - Parsing of external compiler output into deployable artifacts
//! - EIP-1559 contract-creation transaction building and signing
//! - EVM network definitions and EIP-55 address handling

pub mod abi;
pub mod address;
pub mod artifact;
pub mod chains;
pub mod constructor;
pub mod error;
pub mod transaction;
pub mod variant;

pub use artifact::{CompilerOutput, ContractArtifact, Diagnostic, Severity};
pub use constructor::{ConstructorArgs, ConstructorInput, TaxSettings, DEFAULT_TAX_PERCENTAGE};
pub use error::EthError;
pub use transaction::{EthTransaction, FeeParams, SignedEthTransaction};
pub use variant::{EvmFeatures, TokenVariant};
