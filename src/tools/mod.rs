pub mod unverified;
pub mod verified;

pub use unverified::UnverifiedContractTool;
pub use verified::VerifiedContractTool;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{AnalystError, Result};

/// Arguments accepted by both analysis tools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub address: String,
}

/// Single item of tool output content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

/// Uniform tool output handed back to the dispatcher: an ordered list of
/// content items, here always exactly one text item. Failures are carried as
/// failure text inside this shape, never as an error past the tool boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        ToolResult {
            content: vec![ToolContent {
                content_type: "text".to_string(),
                text: text.into(),
            }],
        }
    }
}

/// Failure formatting shared by both tools; `kind` is "sourceCode" for the
/// verified path and "bytecode" for the unverified path.
pub(crate) fn failure(kind: &str, address: &str, error: &AnalystError) -> ToolResult {
    ToolResult::text(format!(
        "Failed to retrieve contract {} for address: {}. Error: {}",
        kind, address, error
    ))
}

/// One client per outbound call; each request is bounded by a fixed deadline.
pub(crate) fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| AnalystError::NetworkError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_text_embeds_kind_address_and_error() {
        let err = AnalystError::ConfigError("API_URL not set".to_string());
        let result = failure("sourceCode", "0xabc", &err);

        assert_eq!(result.content.len(), 1);
        assert_eq!(
            result.content[0].text,
            "Failed to retrieve contract sourceCode for address: 0xabc. Error: API_URL not set"
        );
    }

    #[test]
    fn test_tool_result_serializes_as_single_text_item() {
        let result = ToolResult::text("hello");
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"content":[{"type":"text","text":"hello"}]}"#);
    }

    #[test]
    fn test_analyze_request_deserializes_from_arguments() {
        let request: AnalyzeRequest =
            serde_json::from_str(r#"{"address":"0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045"}"#)
                .unwrap();
        assert_eq!(request.address, "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045");
    }
}
