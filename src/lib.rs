pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod pagination;
pub mod registry;
pub mod rpc;
pub mod serializer;
pub mod store;
pub mod tool;
pub mod users;
pub mod viewset;

pub use catalog::ToolCatalog;
pub use config::ServerConfig;
pub use dispatch::Dispatcher;
pub use error::{BridgeError, Result};
pub use registry::Registry;
pub use rpc::McpHandler;
pub use store::{SqliteStore, UserRepository};
pub use tool::{Tool, ToolDescriptor, ToolOutcome};
pub use viewset::{Action, ActionCall, Payload, ViewSet};
