use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde_json::Value;
use tracing::error;

use crate::http::AppState;
use crate::rpc::{JsonRpcError, JsonRpcResponse};

/// `POST` on the MCP path: one JSON-RPC envelope per request, always HTTP 200.
pub async fn post_envelope(State(state): State<AppState>, body: Bytes) -> Json<JsonRpcResponse> {
    let handler = state.handler.clone();
    let response = tokio::task::spawn_blocking(move || handler.handle_bytes(&body))
        .await
        .unwrap_or_else(|e| {
            error!(error = %e, "Envelope handler task failed");
            JsonRpcResponse::failure(None, JsonRpcError::internal(e))
        });
    Json(response)
}

/// `GET` on the MCP path: discovery descriptor.
pub async fn get_descriptor(State(state): State<AppState>) -> Json<Value> {
    Json(state.handler.server_descriptor())
}
