pub mod mcp;

pub use mcp::{JsonRpcRequest, JsonRpcResponse, McpServer};
