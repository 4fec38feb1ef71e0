use thiserror::Error;

/// EVM chain operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EthError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("unsupported token variant: {0}")]
    UnsupportedVariant(String),

    #[error("compilation failed: {}", .0.join("; "))]
    CompilationFailed(Vec<String>),

    #[error("artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("invalid artifact: {0}")]
    InvalidArtifact(String),
}
