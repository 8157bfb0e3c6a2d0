//! HTTP transport: the MCP envelope endpoint plus REST routes for every ViewSet.

pub mod mcp;
pub mod rest;

use std::sync::Arc;

use axum::routing::{any, get};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::registry::Registry;
use crate::rpc::McpHandler;

#[derive(Clone)]
pub struct AppState {
    pub handler: McpHandler,
    pub registry: Arc<Registry>,
}

impl AppState {
    pub fn new(handler: McpHandler, registry: Arc<Registry>) -> Self {
        Self { handler, registry }
    }
}

pub fn router(state: AppState) -> Router {
    let config = state.handler.config();
    let mcp_path = config.mcp_path.clone();
    let mcp_bare = mcp_path.trim_end_matches('/').to_string();
    let rest = config.rest_prefix.trim_end_matches('/').to_string();

    let mut router = Router::new().route(
        &mcp_path,
        get(mcp::get_descriptor).post(mcp::post_envelope),
    );
    if !mcp_bare.is_empty() && mcp_bare != mcp_path {
        router = router.route(&mcp_bare, get(mcp::get_descriptor).post(mcp::post_envelope));
    }

    router
        .route(&format!("{}/:prefix/", rest), any(rest::collection))
        .route(&format!("{}/:prefix/:segment/", rest), any(rest::member))
        .route(&format!("{}/:prefix/:id/:action/", rest), any(rest::detail_action))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
