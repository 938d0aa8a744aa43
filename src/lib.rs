pub mod config;
pub mod error;
pub mod rpc;
pub mod scrape;
pub mod server;
pub mod tools;

pub use config::Config;
pub use error::{AnalystError, Result};
pub use rpc::RpcClient;
pub use server::McpServer;
