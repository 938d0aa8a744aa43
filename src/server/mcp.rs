use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::Config;
use crate::rpc::RpcClient;
use crate::tools::{AnalyzeRequest, UnverifiedContractTool, VerifiedContractTool};

/// JSON-RPC 2.0 Request format. A request without an id is a notification
/// and gets no reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 Response format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// MCP Tool Definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// MCP server exposing the two contract-analysis tools
pub struct McpServer {
    config: Config,
    verified_tool: Arc<RwLock<Option<VerifiedContractTool>>>,
    unverified_tool: Arc<RwLock<Option<UnverifiedContractTool>>>,
}

impl McpServer {
    pub fn new(config: Config) -> Self {
        McpServer {
            config,
            verified_tool: Arc::new(RwLock::new(None)),
            unverified_tool: Arc::new(RwLock::new(None)),
        }
    }

    /// Initialize the server and connect to RPC
    pub async fn initialize(&self) -> crate::error::Result<()> {
        info!(
            "Initializing MCP server with RPC URL: {}",
            self.config.rpc_url
        );

        let rpc = RpcClient::new(self.config.rpc_url.clone()).await?;

        *self.verified_tool.write().await = Some(VerifiedContractTool::new(self.config.clone()));
        *self.unverified_tool.write().await =
            Some(UnverifiedContractTool::new(self.config.clone(), rpc));

        info!("MCP server initialized successfully");
        Ok(())
    }

    /// Get tool definitions (MCP spec)
    pub fn get_tool_definitions(&self) -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                name: "analyze_verified_contract".to_string(),
                description: "Analyze a verified contract from an address on the Monad testnet."
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "address": {
                            "type": "string",
                            "description": "Monad testnet address to analyze verified contract for"
                        }
                    },
                    "required": ["address"]
                }),
            },
            ToolDefinition {
                name: "analyze_unverified_contract".to_string(),
                description: "Analyze an unverified contract from an address on the Monad testnet."
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "address": {
                            "type": "string",
                            "description": "Monad testnet address to analyze unverified contract for"
                        }
                    },
                    "required": ["address"]
                }),
            },
        ]
    }

    /// Handle a JSON-RPC request; notifications produce no response
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!(
            "Handling MCP request: {} with params: {:?}",
            request.method, request.params
        );

        // Notifications (e.g. notifications/initialized) carry no id
        let id = request.id?;

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(),
            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tool_call(&request.params).await,
            "ping" => Ok(json!({"status": "ok"})),
            _ => Err(JsonRpcError {
                code: -32601,
                message: format!("Method not found: {}", request.method),
                data: None,
            }),
        };

        Some(match response {
            Ok(result) => JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                result: Some(result),
                error: None,
                id,
            },
            Err(err) => JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                result: None,
                error: Some(err),
                id,
            },
        })
    }

    fn handle_initialize(&self) -> Result<Value, JsonRpcError> {
        Ok(json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": "contract-analyst-mcp-server",
                "version": env!("CARGO_PKG_VERSION")
            }
        }))
    }

    fn handle_tools_list(&self) -> Result<Value, JsonRpcError> {
        let tools = self.get_tool_definitions();
        serde_json::to_value(&tools)
            .map(|tools| json!({ "tools": tools }))
            .map_err(|e| JsonRpcError {
                code: -32603,
                message: format!("Internal error: {}", e),
                data: None,
            })
    }

    async fn handle_tool_call(&self, params: &Value) -> Result<Value, JsonRpcError> {
        let tool_name =
            params
                .get("name")
                .and_then(|v| v.as_str())
                .ok_or_else(|| JsonRpcError {
                    code: -32602,
                    message: "Missing or invalid 'name' parameter".to_string(),
                    data: None,
                })?;

        let arguments = params.get("arguments").ok_or_else(|| JsonRpcError {
            code: -32602,
            message: "Missing 'arguments' parameter".to_string(),
            data: None,
        })?;

        match tool_name {
            "analyze_verified_contract" => {
                let request: AnalyzeRequest =
                    serde_json::from_value(arguments.clone()).map_err(|e| JsonRpcError {
                        code: -32602,
                        message: format!("Invalid arguments: {}", e),
                        data: None,
                    })?;

                let verified_tool = self.verified_tool.read().await;
                let tool = verified_tool.as_ref().ok_or_else(|| JsonRpcError {
                    code: -32603,
                    message: "Verified contract tool not initialized".to_string(),
                    data: None,
                })?;

                let result = tool.analyze(request).await;
                serde_json::to_value(&result).map_err(|e| JsonRpcError {
                    code: -32603,
                    message: format!("Internal error: {}", e),
                    data: None,
                })
            }
            "analyze_unverified_contract" => {
                let request: AnalyzeRequest =
                    serde_json::from_value(arguments.clone()).map_err(|e| JsonRpcError {
                        code: -32602,
                        message: format!("Invalid arguments: {}", e),
                        data: None,
                    })?;

                let unverified_tool = self.unverified_tool.read().await;
                let tool = unverified_tool.as_ref().ok_or_else(|| JsonRpcError {
                    code: -32603,
                    message: "Unverified contract tool not initialized".to_string(),
                    data: None,
                })?;

                let result = tool.analyze(request).await;
                serde_json::to_value(&result).map_err(|e| JsonRpcError {
                    code: -32603,
                    message: format!("Internal error: {}", e),
                    data: None,
                })
            }
            _ => Err(JsonRpcError {
                code: -32601,
                message: format!("Tool not found: {}", tool_name),
                data: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_server() -> McpServer {
        McpServer::new(Config::from_url("https://testnet-rpc.monad.xyz".to_string()))
    }

    fn request(method: &str, params: Value, id: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id,
        }
    }

    #[test]
    fn test_jsonrpc_request_serialization() {
        let request = request("tools/call", json!({}), Some(json!(1)));

        let json_str = serde_json::to_string(&request).unwrap();
        assert!(json_str.contains("tools/call"));
        assert!(json_str.contains("2.0"));
    }

    #[test]
    fn test_request_without_id_is_a_notification() {
        let request: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
                .unwrap();
        assert!(request.id.is_none());
        assert_eq!(request.params, Value::Null);
    }

    #[tokio::test]
    async fn test_notification_gets_no_response() {
        let server = test_server();
        let response = server
            .handle_request(request("notifications/initialized", json!({}), None))
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_initialize_reports_server_info() {
        let server = test_server();
        let response = server
            .handle_request(request("initialize", json!({}), Some(json!(1))))
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["serverInfo"]["name"], "contract-analyst-mcp-server");
        assert!(result["protocolVersion"].is_string());
    }

    #[tokio::test]
    async fn test_tools_list_names_both_tools() {
        let server = test_server();
        let response = server
            .handle_request(request("tools/list", json!({}), Some(json!(2))))
            .await
            .unwrap();

        let tools = response.result.unwrap()["tools"].clone();
        let names: Vec<&str> = tools
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();

        assert_eq!(
            names,
            vec!["analyze_verified_contract", "analyze_unverified_contract"]
        );
        for tool in tools.as_array().unwrap() {
            assert_eq!(tool["inputSchema"]["required"], json!(["address"]));
        }
    }

    #[tokio::test]
    async fn test_unknown_method_is_rejected() {
        let server = test_server();
        let response = server
            .handle_request(request("resources/list", json!({}), Some(json!(3))))
            .await
            .unwrap();

        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_rejected() {
        let server = test_server();
        let params = json!({"name": "swap_tokens", "arguments": {"address": "0xabc"}});
        let response = server
            .handle_request(request("tools/call", params, Some(json!(4))))
            .await
            .unwrap();

        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_tool_call_before_initialize_is_an_error() {
        let server = test_server();
        let params = json!({"name": "analyze_verified_contract", "arguments": {"address": "0xabc"}});
        let response = server
            .handle_request(request("tools/call", params, Some(json!(5))))
            .await
            .unwrap();

        assert_eq!(response.error.unwrap().code, -32603);
    }

    #[tokio::test]
    async fn test_tool_call_with_bad_arguments_is_rejected() {
        let server = test_server();
        let params = json!({"name": "analyze_verified_contract", "arguments": {}});
        let response = server
            .handle_request(request("tools/call", params, Some(json!(6))))
            .await
            .unwrap();

        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_ping_answers_ok() {
        let server = test_server();
        let response = server
            .handle_request(request("ping", json!({}), Some(json!(7))))
            .await
            .unwrap();

        assert_eq!(response.result.unwrap(), json!({"status": "ok"}));
    }
}
