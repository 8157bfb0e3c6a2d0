//! JSON-RPC 2.0 envelope handling for the MCP methods.

pub mod handler;
pub mod prompts;
pub mod types;

pub use handler::McpHandler;
pub use types::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
