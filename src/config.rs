use crate::error::{AnalystError, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Public RPC endpoint for the Monad testnet, used when RPC_URL is not set.
const DEFAULT_RPC_URL: &str = "https://testnet-rpc.monad.xyz";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub rpc_url: String,
    pub explorer_api_url: Option<String>,
    pub explorer_api_key: Option<String>,
    pub decompiler_url: Option<String>,
}

impl Config {
    /// Load configuration once at startup. The explorer and decompiler values
    /// are only required by their respective tool, so their absence is not an
    /// error here; the accessors below report it per call.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Config {
            rpc_url: env::var("RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.to_string()),
            explorer_api_url: env::var("API_URL").ok(),
            explorer_api_key: env::var("API_KEY").ok(),
            decompiler_url: env::var("DECOMPILE_URL").ok(),
        }
    }

    pub fn from_url(rpc_url: String) -> Self {
        Config {
            rpc_url,
            explorer_api_url: None,
            explorer_api_key: None,
            decompiler_url: None,
        }
    }

    /// Explorer base URL, required by the verified-contract path.
    pub fn explorer_api_url(&self) -> Result<&str> {
        self.explorer_api_url
            .as_deref()
            .ok_or_else(|| AnalystError::ConfigError("API_URL not set".to_string()))
    }

    /// Explorer API key, required by the verified-contract path.
    pub fn explorer_api_key(&self) -> Result<&str> {
        self.explorer_api_key
            .as_deref()
            .ok_or_else(|| AnalystError::ConfigError("API_KEY not set".to_string()))
    }

    /// Decompiler endpoint, required by the unverified-contract path.
    pub fn decompiler_url(&self) -> Result<&str> {
        self.decompiler_url
            .as_deref()
            .ok_or_else(|| AnalystError::ConfigError("DECOMPILE_URL not set".to_string()))
    }
}
