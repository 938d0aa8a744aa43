use contract_analyst_mcp_server::{Config, McpServer};
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize tracing; stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    info!("Starting Contract Analyst MCP Server...");

    // Load configuration from environment
    let config = Config::from_env();

    // Create and initialize MCP server
    let mcp_server = Arc::new(McpServer::new(config));

    match mcp_server.initialize().await {
        Ok(_) => info!("MCP server initialized successfully"),
        Err(e) => {
            error!("Failed to initialize MCP server: {}", e);
            return Err(e.into());
        }
    }

    info!("Contract Analyst MCP Server running on stdio");
    info!("Available tools: analyze_verified_contract, analyze_unverified_contract");

    serve_stdio(mcp_server).await
}

async fn serve_stdio(mcp_server: Arc<McpServer>) -> eyre::Result<()> {
    let stdin = tokio::io::stdin();
    let mut writer = tokio::io::stdout();
    let mut buf_reader = BufReader::new(stdin);
    let mut line = String::new();

    while buf_reader.read_line(&mut line).await? > 0 {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            line.clear();
            continue;
        }

        // Parse JSON-RPC request
        match serde_json::from_str::<contract_analyst_mcp_server::server::JsonRpcRequest>(trimmed) {
            Ok(request) => {
                info!(
                    "Received request: {} (id: {:?})",
                    request.method, request.id
                );

                if let Some(response) = mcp_server.handle_request(request).await {
                    let response_json = serde_json::to_string(&response)?;
                    writer.write_all(response_json.as_bytes()).await?;
                    writer.write_all(b"\n").await?;
                    writer.flush().await?;
                }
            }
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);

                let error_response = json!({
                    "jsonrpc": "2.0",
                    "error": {
                        "code": -32700,
                        "message": "Parse error",
                        "data": e.to_string()
                    },
                    "id": null
                });

                let response_json = serde_json::to_string(&error_response)?;
                writer.write_all(response_json.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        line.clear();
    }

    Ok(())
}
