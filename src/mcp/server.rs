use std::sync::Arc;

use rmcp::handler::server::ServerHandler;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParams, ServerCapabilities, ServerInfo, Tool, ToolsCapability,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer};
use serde_json::{Map, Value};
use tracing::debug;

use crud_mcp::rpc::McpHandler;
use crud_mcp::tool::ToolDescriptor;

/// MCP server over stdio, backed by the same catalog and dispatcher as HTTP.
#[derive(Clone)]
pub struct McpServer {
    handler: McpHandler,
}

impl McpServer {
    pub fn new(handler: McpHandler) -> Self {
        Self { handler }
    }
}

fn to_rmcp_tool(descriptor: ToolDescriptor) -> Tool {
    let input_schema = match descriptor.input_schema {
        Value::Object(map) => Arc::new(map),
        _ => Arc::new(Map::new()),
    };
    Tool {
        name: descriptor.name.into(),
        title: None,
        description: Some(descriptor.description.into()),
        input_schema,
        output_schema: None,
        annotations: None,
        icons: None,
        meta: None,
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        let config = self.handler.config();
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
                ..Default::default()
            },
            server_info: Implementation {
                name: config.name.clone(),
                title: Some("CRUD MCP".to_string()),
                version: config.version.clone(),
                icons: None,
                website_url: None,
            },
            instructions: Some(config.description.clone()),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let catalog = self.handler.catalog().clone();
        let descriptors = tokio::task::spawn_blocking(move || catalog.discover())
            .await
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        Ok(ListToolsResult {
            next_cursor: None,
            tools: descriptors.into_iter().map(to_rmcp_tool).collect(),
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let name = request.name.to_string();
        let arguments = request.arguments.unwrap_or_default();
        debug!(tool = %name, "stdio tools/call");

        let dispatcher = self.handler.dispatcher().clone();
        let outcome = tokio::task::spawn_blocking(move || dispatcher.execute(&name, arguments))
            .await
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        Ok(if outcome.is_fault() {
            CallToolResult::error(vec![Content::text(outcome.into_text())])
        } else {
            CallToolResult::success(vec![Content::text(outcome.into_text())])
        })
    }
}
