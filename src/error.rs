use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalystError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("{0}")]
    ConfigError(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("API request failed with status {0}")]
    HttpStatus(u16),

    #[error("API request failed with error: {0}")]
    ExplorerError(String),

    #[error("Failed to retrieve source code")]
    NoVerifiedSource,

    #[error("Failed to retrieve source code: {0}")]
    DecompileExtractFailed(String),

    #[error("network error: {0}")]
    NetworkError(String),
}

pub type Result<T> = std::result::Result<T, AnalystError>;
