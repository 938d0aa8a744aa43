use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder};
use std::sync::Arc;
use tracing::{debug, error};

use crate::error::{AnalystError, Result};

type HttpProvider = alloy::providers::fillers::FillProvider<
    alloy::providers::fillers::JoinFill<
        alloy::providers::Identity,
        alloy::providers::fillers::JoinFill<
            alloy::providers::fillers::GasFiller,
            alloy::providers::fillers::JoinFill<
                alloy::providers::fillers::BlobGasFiller,
                alloy::providers::fillers::JoinFill<
                    alloy::providers::fillers::NonceFiller,
                    alloy::providers::fillers::ChainIdFiller,
                >,
            >,
        >,
    >,
    alloy::providers::RootProvider<alloy::transports::http::Http<reqwest::Client>>,
    alloy::transports::http::Http<reqwest::Client>,
    alloy::network::Ethereum,
>;

/// RPC client for Monad testnet reads
#[derive(Clone)]
pub struct RpcClient {
    inner: Arc<RpcClientInner>,
}

struct RpcClientInner {
    provider_url: String,
}

impl RpcClient {
    /// Create a new RPC client
    pub async fn new(rpc_url: String) -> Result<Self> {
        // Validate URL format
        rpc_url
            .parse::<url::Url>()
            .map_err(|_| AnalystError::ConfigError("Invalid RPC URL format".to_string()))?;

        debug!("Connected to RPC: {}", rpc_url);

        Ok(RpcClient {
            inner: Arc::new(RpcClientInner {
                provider_url: rpc_url,
            }),
        })
    }

    /// Helper to get provider for each operation
    fn get_provider(&self) -> Result<HttpProvider> {
        let url = self
            .inner
            .provider_url
            .parse()
            .map_err(|_| AnalystError::ConfigError("Invalid RPC URL".to_string()))?;

        Ok(ProviderBuilder::new()
            .with_recommended_fillers()
            .on_http(url))
    }

    /// Deployed bytecode at an address as a hex string, or None when no
    /// contract is deployed there.
    pub async fn get_code(&self, address: Address) -> Result<Option<String>> {
        debug!("Getting deployed bytecode for: {:?}", address);

        let provider = self.get_provider()?;

        let code = provider.get_code_at(address).await.map_err(|e| {
            error!("Failed to get bytecode: {}", e);
            AnalystError::RpcError(format!("Failed to get bytecode: {}", e))
        })?;

        if code.is_empty() {
            Ok(None)
        } else {
            Ok(Some(code.to_string()))
        }
    }

    /// Get RPC URL
    pub fn rpc_url(&self) -> &str {
        &self.inner.provider_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_invalid_rpc_url() {
        assert!(RpcClient::new("not a url".to_string()).await.is_err());
    }

    #[tokio::test]
    async fn test_keeps_the_configured_url() {
        let client = RpcClient::new("https://testnet-rpc.monad.xyz".to_string())
            .await
            .unwrap();
        assert_eq!(client.rpc_url(), "https://testnet-rpc.monad.xyz");
    }
}
