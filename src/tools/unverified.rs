use alloy::primitives::Address;
use tracing::{debug, error};

use crate::config::Config;
use crate::error::{AnalystError, Result};
use crate::rpc::RpcClient;
use crate::scrape;
use crate::tools::{self, AnalyzeRequest, ToolResult};

pub struct UnverifiedContractTool {
    config: Config,
    rpc: RpcClient,
}

impl UnverifiedContractTool {
    pub fn new(config: Config, rpc: RpcClient) -> Self {
        UnverifiedContractTool { config, rpc }
    }

    /// The chain read needs a typed address; the parse failure surfaces
    /// through the normal failure template like any other error.
    fn validate_address(addr_str: &str) -> Result<Address> {
        addr_str.parse::<Address>().map_err(|_| {
            AnalystError::InvalidAddress(format!("invalid contract address: {}", addr_str))
        })
    }

    /// Read deployed bytecode, decompile it, and wrap the recovered source in
    /// the analysis prompt. Every failure mode is converted to failure text
    /// here; nothing propagates past this boundary.
    pub async fn analyze(&self, request: AnalyzeRequest) -> ToolResult {
        debug!("Decompiling contract at address: {}", request.address);

        match self.decompile(&request.address).await {
            Ok(source) => ToolResult::text(format!(
                "Analyze the decompiled source code of contract {}, including its core \
                 functionalities, main logic flow, and security aspects:\n```\n{}\n```",
                request.address, source
            )),
            Err(e) => {
                error!("Error getting contract bytecode: {}", e);
                tools::failure("bytecode", &request.address, &e)
            }
        }
    }

    async fn decompile(&self, address: &str) -> Result<String> {
        let contract_address = Self::validate_address(address)?;

        let bytecode = self.rpc.get_code(contract_address).await?;
        debug!("contract bytecode: {:?}", bytecode);

        // An address with no deployed code still yields a submission; the
        // decompiler's reply decides the outcome.
        self.submit_bytecode(bytecode.unwrap_or_default()).await
    }

    async fn submit_bytecode(&self, bytecode: String) -> Result<String> {
        let decompiler_url = self.config.decompiler_url()?;

        let form = reqwest::multipart::Form::new().text("bytecode", bytecode);

        let response = tools::http_client()?
            .post(decompiler_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AnalystError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AnalystError::HttpStatus(response.status().as_u16()));
        }

        let html = response
            .text()
            .await
            .map_err(|e| AnalystError::NetworkError(e.to_string()))?;

        scrape::extract_decompiled_source(&html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The exact wrapper the decompiler emits; duplicated here as a fixture
    /// so a drift in the matching rule breaks a test.
    const MARKER: &str = r#"<div class="code javascript" style="border: 1px solid gray; padding: 0.5em; white-space: pre; font-family: monospace; line-height: 1.2">"#;

    async fn tool_for(server: &mockito::ServerGuard) -> UnverifiedContractTool {
        let config = Config {
            rpc_url: "https://testnet-rpc.monad.xyz".to_string(),
            explorer_api_url: None,
            explorer_api_key: None,
            decompiler_url: Some(server.url()),
        };
        let rpc = RpcClient::new(config.rpc_url.clone()).await.unwrap();
        UnverifiedContractTool::new(config, rpc)
    }

    #[tokio::test]
    async fn test_submit_extracts_and_strips_decompiled_source() {
        let mut server = mockito::Server::new_async().await;
        let body = format!(
            "<html><body>{}function <em>main</em>() {{ stack[0]; }}</div></body></html>",
            MARKER
        );
        let mock = server
            .mock("POST", "/")
            .match_body(mockito::Matcher::Regex("name=\"bytecode\"".to_string()))
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let tool = tool_for(&server).await;
        let source = tool.submit_bytecode("0x6080".to_string()).await.unwrap();
        mock.assert_async().await;

        assert_eq!(source, "function main() { stack[0]; }");
    }

    #[tokio::test]
    async fn test_http_error_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(404)
            .create_async()
            .await;

        let tool = tool_for(&server).await;
        let err = tool.submit_bytecode("0x6080".to_string()).await.unwrap_err();

        assert_eq!(err.to_string(), "API request failed with status 404");
    }

    #[tokio::test]
    async fn test_missing_marker_embeds_raw_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body("<html><body>decompilation queue full</body></html>")
            .create_async()
            .await;

        let tool = tool_for(&server).await;
        let err = tool.submit_bytecode("0x6080".to_string()).await.unwrap_err();

        assert!(err
            .to_string()
            .contains("<html><body>decompilation queue full</body></html>"));
    }

    #[tokio::test]
    async fn test_empty_bytecode_is_still_submitted() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_body(format!("{}nothing here</div>", MARKER))
            .create_async()
            .await;

        let tool = tool_for(&server).await;
        let source = tool.submit_bytecode(String::new()).await.unwrap();
        mock.assert_async().await;

        assert_eq!(source, "nothing here");
    }

    #[tokio::test]
    async fn test_missing_decompiler_url_is_a_failure() {
        let config = Config::from_url("https://testnet-rpc.monad.xyz".to_string());
        let rpc = RpcClient::new(config.rpc_url.clone()).await.unwrap();
        let tool = UnverifiedContractTool::new(config, rpc);

        let err = tool.submit_bytecode("0x6080".to_string()).await.unwrap_err();
        assert_eq!(err.to_string(), "DECOMPILE_URL not set");
    }

    #[tokio::test]
    async fn test_invalid_address_becomes_failure_text() {
        let config = Config::from_url("https://testnet-rpc.monad.xyz".to_string());
        let rpc = RpcClient::new(config.rpc_url.clone()).await.unwrap();
        let tool = UnverifiedContractTool::new(config, rpc);

        let result = tool
            .analyze(AnalyzeRequest {
                address: "nonsense".to_string(),
            })
            .await;

        let text = &result.content[0].text;
        assert!(text.starts_with("Failed to retrieve contract bytecode for address: nonsense."));
        assert!(text.contains("invalid contract address"));
    }

    #[test]
    fn test_validate_address_accepts_checksummed() {
        let addr = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";
        assert!(UnverifiedContractTool::validate_address(addr).is_ok());
    }
}
