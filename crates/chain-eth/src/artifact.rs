//! Compiled contract artifacts and compiler diagnostics.
//!
//! Solidity compilation is delegated to an external toolchain. This module
//! only interprets what it returns: the solc standard-JSON output format
//!
//! ```text
//! {
//!   "errors":    [ { "severity": "error" | "warning" | "info", "message": ..., "formattedMessage": ... } ],
//!   "contracts": { "<source file>": { "<ContractName>": { "abi": [...], "evm": { "bytecode": { "object": "6080..." } } } } }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::EthError;

/// Diagnostic severity reported by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A single compiler diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub formatted_message: Option<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            message: message.into(),
            formatted_message: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// ABI and creation bytecode for one contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractArtifact {
    pub contract_name: String,
    pub abi: serde_json::Value,
    #[serde(with = "hex_bytes")]
    pub bytecode: Vec<u8>,
}

/// What the compiler service returned for one contract request.
#[derive(Debug, Clone, Default)]
pub struct CompilerOutput {
    pub diagnostics: Vec<Diagnostic>,
    pub artifact: Option<ContractArtifact>,
}

impl CompilerOutput {
    pub fn from_artifact(artifact: ContractArtifact) -> Self {
        CompilerOutput {
            diagnostics: Vec::new(),
            artifact: Some(artifact),
        }
    }

    /// The artifact, provided no diagnostic has error severity.
    ///
    /// Warnings are tolerated; any error fails the whole compilation even if
    /// bytecode was produced.
    pub fn into_artifact(self, contract_name: &str) -> Result<ContractArtifact, EthError> {
        let errors: Vec<String> = self
            .diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| d.message.clone())
            .collect();

        if !errors.is_empty() {
            return Err(EthError::CompilationFailed(errors));
        }

        let artifact = self
            .artifact
            .ok_or_else(|| EthError::ArtifactNotFound(contract_name.to_string()))?;

        if artifact.bytecode.is_empty() {
            return Err(EthError::InvalidArtifact(format!(
                "{contract_name} has empty bytecode (abstract contract or interface?)"
            )));
        }

        Ok(artifact)
    }
}

#[derive(Deserialize)]
struct SolcOutput {
    #[serde(default)]
    errors: Vec<Diagnostic>,
    #[serde(default)]
    contracts: BTreeMap<String, BTreeMap<String, SolcContract>>,
}

#[derive(Deserialize)]
struct SolcContract {
    #[serde(default)]
    abi: serde_json::Value,
    evm: Option<SolcEvm>,
}

#[derive(Deserialize)]
struct SolcEvm {
    bytecode: SolcBytecode,
}

#[derive(Deserialize)]
struct SolcBytecode {
    object: String,
}

/// Parses solc standard-JSON output and extracts `contract_name`.
pub fn parse_solc_output(json: &str, contract_name: &str) -> Result<CompilerOutput, EthError> {
    let output: SolcOutput = serde_json::from_str(json)
        .map_err(|e| EthError::InvalidArtifact(format!("malformed compiler output: {e}")))?;

    let contract = output
        .contracts
        .into_values()
        .find_map(|mut contracts| contracts.remove(contract_name));

    let artifact = match contract {
        Some(contract) => {
            let object = contract
                .evm
                .map(|evm| evm.bytecode.object)
                .unwrap_or_default();
            Some(ContractArtifact {
                contract_name: contract_name.to_string(),
                abi: contract.abi,
                bytecode: decode_hex(&object)?,
            })
        }
        None => None,
    };

    Ok(CompilerOutput {
        diagnostics: output.errors,
        artifact,
    })
}

fn decode_hex(s: &str) -> Result<Vec<u8>, EthError> {
    let trimmed = s.trim();
    let hex_part = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(hex_part).map_err(|e| EthError::InvalidArtifact(format!("invalid bytecode hex: {e}")))
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::decode_hex(&s).map_err(serde::de::Error::custom)
    }
}
