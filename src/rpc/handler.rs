use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{debug, error};

use crate::catalog::ToolCatalog;
use crate::config::ServerConfig;
use crate::dispatch::Dispatcher;
use crate::error::{BridgeError, Result};
use crate::registry::Registry;
use crate::rpc::prompts::{get_prompt, list_prompts};
use crate::rpc::types::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};

/// Routes MCP methods for one JSON-RPC envelope at a time.
#[derive(Clone)]
pub struct McpHandler {
    config: Arc<ServerConfig>,
    catalog: ToolCatalog,
    dispatcher: Dispatcher,
}

impl McpHandler {
    pub fn new(registry: Arc<Registry>, config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
            catalog: ToolCatalog::new(Arc::clone(&registry)),
            dispatcher: Dispatcher::new(registry),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Handles a raw request body.
    pub fn handle_bytes(&self, body: &[u8]) -> JsonRpcResponse {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => self.handle_value(value),
            Err(e) => {
                debug!(error = %e, "Rejecting unparseable request body");
                JsonRpcResponse::failure(None, JsonRpcError::parse_error())
            }
        }
    }

    pub fn handle_value(&self, value: Value) -> JsonRpcResponse {
        let id = value.get("id").cloned();
        if !value.is_object() {
            return JsonRpcResponse::failure(None, JsonRpcError::invalid_request());
        }
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle_request(request),
            Err(_) => JsonRpcResponse::failure(id, JsonRpcError::invalid_request()),
        }
    }

    pub fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let JsonRpcRequest {
            id, method, params, ..
        } = request;
        debug!(method = %method, "Handling JSON-RPC request");

        if method.starts_with("notifications/") {
            return JsonRpcResponse::ack();
        }

        let params = match params {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        // A panicking ViewSet or tool must still produce an envelope for this id.
        let routed = catch_unwind(AssertUnwindSafe(|| self.route(&method, &params)))
            .unwrap_or_else(|panic| Err(BridgeError::Internal(panic_message(panic.as_ref()))));

        match routed {
            Ok(Ok(result)) => JsonRpcResponse::success(id, result),
            Ok(Err(rpc_error)) => JsonRpcResponse::failure(id, rpc_error),
            Err(e) => {
                error!(method = %method, error = %e, "Internal error while handling request");
                JsonRpcResponse::failure(id, JsonRpcError::internal(e))
            }
        }
    }

    /// Outer error: internal fault. Inner error: protocol-level rejection.
    fn route(&self, method: &str, params: &Map<String, Value>) -> Result<std::result::Result<Value, JsonRpcError>> {
        let result = match method {
            "initialize" => self.initialize(),
            "ping" => json!({}),
            "tools/list" => {
                let tools = serde_json::to_value(self.catalog.discover())?;
                json!({ "tools": tools })
            }
            "tools/call" => self.call_tool(params),
            "resources/list" => json!({ "resources": [] }),
            "prompts/list" => json!({ "prompts": list_prompts() }),
            "prompts/get" => {
                let name = params.get("name").and_then(Value::as_str).unwrap_or_default();
                let arguments = params
                    .get("arguments")
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_default();
                match get_prompt(name, &arguments) {
                    Some(prompt) => prompt,
                    None => {
                        return Ok(Err(JsonRpcError::invalid_params(format!(
                            "Unknown prompt: {}",
                            name
                        ))))
                    }
                }
            }
            other => return Ok(Err(JsonRpcError::method_not_found(other))),
        };
        Ok(Ok(result))
    }

    fn initialize(&self) -> Value {
        json!({
            "protocolVersion": self.config.protocol_version,
            "capabilities": {
                "tools": {},
                "resources": {},
                "prompts": {},
                "logging": {},
            },
            "serverInfo": {
                "name": self.config.name,
                "version": self.config.version,
            },
        })
    }

    fn call_tool(&self, params: &Map<String, Value>) -> Value {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        let arguments = params
            .get("arguments")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let outcome = self.dispatcher.execute(name, arguments);
        let mut result = json!({
            "content": [{ "type": "text", "text": outcome.text() }],
        });
        if outcome.is_fault() {
            result["isError"] = Value::Bool(true);
        }
        result
    }

    /// Static descriptor served on `GET` of the MCP path.
    pub fn server_descriptor(&self) -> Value {
        json!({
            "name": self.config.name,
            "version": self.config.version,
            "description": self.config.description,
            "capabilities": { "tools": true, "resources": true, "prompts": true },
            "endpoints": {
                "mcp_protocol": self.config.mcp_path,
                "rest_api": self.config.rest_prefix,
            },
        })
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "handler panicked".to_string())
}
