//! External compiler boundary.

use std::collections::HashMap;

use async_trait::async_trait;
use chain_eth::{CompilerOutput, ContractArtifact, EthError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompilerError {
    #[error("Compiler unavailable: {0}")]
    Unavailable(String),

    #[error("Unknown contract: {0}")]
    UnknownContract(String),
}

impl From<CompilerError> for crate::DeployError {
    fn from(e: CompilerError) -> Self {
        crate::DeployError::CompilationFailed(vec![e.to_string()])
    }
}

/// Produces ABI + bytecode for a named contract, or its diagnostics.
#[async_trait]
pub trait ContractCompiler: Send + Sync {
    async fn compile(&self, contract_name: &str) -> Result<CompilerOutput, CompilerError>;
}

/// Serves artifacts compiled ahead of time.
#[derive(Debug, Clone, Default)]
pub struct StaticCompiler {
    outputs: HashMap<String, CompilerOutput>,
}

impl StaticCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_artifact(mut self, artifact: ContractArtifact) -> Self {
        self.outputs.insert(
            artifact.contract_name.clone(),
            CompilerOutput::from_artifact(artifact),
        );
        self
    }

    /// Registers `contract_name` from a solc standard-JSON output blob.
    /// Error diagnostics are kept and reported on every compile request.
    pub fn with_solc_output(mut self, json: &str, contract_name: &str) -> Result<Self, EthError> {
        let output = chain_eth::artifact::parse_solc_output(json, contract_name)?;
        self.outputs.insert(contract_name.to_string(), output);
        Ok(self)
    }

    pub fn contract_names(&self) -> impl Iterator<Item = &str> {
        self.outputs.keys().map(String::as_str)
    }
}

#[async_trait]
impl ContractCompiler for StaticCompiler {
    async fn compile(&self, contract_name: &str) -> Result<CompilerOutput, CompilerError> {
        self.outputs
            .get(contract_name)
            .cloned()
            .ok_or_else(|| CompilerError::UnknownContract(contract_name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn serves_registered_artifacts() {
        let compiler = StaticCompiler::new().with_artifact(ContractArtifact {
            contract_name: "StandardToken".into(),
            abi: json!([]),
            bytecode: vec![0x60, 0x80],
        });

        let output = compiler.compile("StandardToken").await.unwrap();
        let artifact = output.into_artifact("StandardToken").unwrap();
        assert_eq!(artifact.bytecode, vec![0x60, 0x80]);

        let err = compiler.compile("TaxableToken").await.unwrap_err();
        assert_eq!(err, CompilerError::UnknownContract("TaxableToken".into()));
    }

    #[tokio::test]
    async fn solc_errors_surface_as_compilation_failed() {
        let solc = json!({
            "errors": [{
                "severity": "error",
                "message": "ParserError: Expected ';'",
                "formattedMessage": "TaxableToken.sol:12: ParserError"
            }]
        })
        .to_string();

        let compiler = StaticCompiler::new()
            .with_solc_output(&solc, "TaxableToken")
            .unwrap();
        let output = compiler.compile("TaxableToken").await.unwrap();
        let err = crate::DeployError::from(output.into_artifact("TaxableToken").unwrap_err());
        assert_eq!(err.kind(), crate::ErrorKind::CompilationFailed);
    }
}
