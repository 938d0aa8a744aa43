use serde::Deserialize;
use tracing::{debug, error};

use crate::config::Config;
use crate::error::{AnalystError, Result};
use crate::tools::{self, AnalyzeRequest, ToolResult};

/// Fixed analysis prompt wrapped around retrieved source
const ANALYSIS_PROMPT: &str = "Analyze the source code of smart contract, including its core functionalities, main logic flow, and security aspects:";

/// Explorer API response shape. A `code` of zero signals success; non-zero is
/// an application-level failure regardless of HTTP status.
#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    code: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: Option<ExplorerResult>,
}

#[derive(Debug, Deserialize)]
struct ExplorerResult {
    #[serde(rename = "sourceCode", default)]
    source_code: Vec<SourceFile>,
}

#[derive(Debug, Deserialize)]
struct SourceFile {
    content: String,
}

pub struct VerifiedContractTool {
    config: Config,
}

impl VerifiedContractTool {
    pub fn new(config: Config) -> Self {
        VerifiedContractTool { config }
    }

    /// Fetch verified source for the address and wrap it in the analysis
    /// prompt. Every failure mode is converted to failure text here; nothing
    /// propagates past this boundary.
    pub async fn analyze(&self, request: AnalyzeRequest) -> ToolResult {
        debug!("Fetching verified source for address: {}", request.address);

        match self.fetch_source(&request.address).await {
            Ok(source) => {
                ToolResult::text(format!("{}\n```\n{}\n```", ANALYSIS_PROMPT, source))
            }
            Err(e) => {
                error!("Error getting contract sourceCode: {}", e);
                tools::failure("sourceCode", &request.address, &e)
            }
        }
    }

    async fn fetch_source(&self, address: &str) -> Result<String> {
        let api_url = self.config.explorer_api_url()?;
        let api_key = self.config.explorer_api_key()?;

        // The explorer keys on the raw address string appended to the base URL
        let url = format!("{}{}", api_url, address);

        let response = tools::http_client()?
            .get(&url)
            .header("accept", "application/json")
            .header("x-api-key", api_key)
            .send()
            .await
            .map_err(|e| AnalystError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AnalystError::HttpStatus(response.status().as_u16()));
        }

        let data: ExplorerResponse = response
            .json()
            .await
            .map_err(|e| AnalystError::NetworkError(e.to_string()))?;

        // Non-zero application code is authoritative even on HTTP 200
        if data.code != 0 {
            return Err(AnalystError::ExplorerError(
                data.message.unwrap_or_default(),
            ));
        }

        let files = data.result.map(|r| r.source_code).unwrap_or_default();
        if files.is_empty() {
            return Err(AnalystError::NoVerifiedSource);
        }

        Ok(files
            .into_iter()
            .map(|f| f.content)
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}
