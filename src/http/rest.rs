//! REST routes for registered ViewSets, mirroring router registration:
//! `/{prefix}/`, `/{prefix}/{id}/`, `/{prefix}/{extra}/` and `/{prefix}/{id}/{extra}/`.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};

use crate::error::{BridgeError, Result};
use crate::http::AppState;
use crate::viewset::{find_extra_action, Action, ActionCall, Payload, ViewSet};

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let status = match &self {
            BridgeError::NotFound { .. } | BridgeError::ViewSetNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            BridgeError::Validation(_)
            | BridgeError::MissingParameter { .. }
            | BridgeError::InvalidArgument(_)
            | BridgeError::Json(_) => StatusCode::BAD_REQUEST,
            BridgeError::UnsupportedAction(_) => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match self {
            BridgeError::Validation(errors) => (status, Json(errors)).into_response(),
            other => (status, Json(json!({ "detail": other.to_string() }))).into_response(),
        }
    }
}

fn payload_response(payload: Payload) -> Response {
    match payload {
        Payload::Data { status, data } => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::OK);
            (status, Json(data)).into_response()
        }
        Payload::Status(code) => StatusCode::from_u16(code)
            .unwrap_or(StatusCode::OK)
            .into_response(),
        Payload::Empty => StatusCode::OK.into_response(),
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response()
}

fn query_arguments(query: HashMap<String, String>) -> Map<String, Value> {
    query.into_iter().map(|(k, v)| (k, Value::String(v))).collect()
}

fn body_arguments(body: &Bytes) -> Result<Map<String, Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body)? {
        Value::Object(map) => Ok(map),
        _ => Err(BridgeError::InvalidArgument(
            "Invalid data. Expected a dictionary.".to_string(),
        )),
    }
}

fn ensure_supported(viewset: &dyn ViewSet, action: &Action) -> Result<()> {
    if viewset.supports(action) {
        Ok(())
    } else {
        Err(BridgeError::UnsupportedAction(action.as_str().to_string()))
    }
}

async fn execute(viewset: Arc<dyn ViewSet>, call: ActionCall) -> Response {
    let result = tokio::task::spawn_blocking(move || viewset.handle(&call))
        .await
        .map_err(|e| BridgeError::Transport(e.to_string()))
        .and_then(|r| r);
    match result {
        Ok(payload) => payload_response(payload),
        Err(e) => e.into_response(),
    }
}

/// `/{prefix}/`: list and create.
pub async fn collection(
    State(state): State<AppState>,
    Path(prefix): Path<String>,
    method: Method,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let Some(viewset) = state.registry.find_by_prefix(&prefix) else {
        return not_found();
    };

    let call = match method {
        Method::GET => ActionCall::new(Action::List).with_arguments(query_arguments(query)),
        Method::POST => match body_arguments(&body) {
            Ok(data) => ActionCall::new(Action::Create).with_arguments(data),
            Err(e) => return e.into_response(),
        },
        other => return BridgeError::UnsupportedAction(other.to_string()).into_response(),
    };

    if let Err(e) = ensure_supported(viewset.as_ref(), &call.action) {
        return e.into_response();
    }
    execute(viewset, call).await
}

/// `/{prefix}/{segment}/`: a list-scoped extra action, or a single object.
pub async fn member(
    State(state): State<AppState>,
    Path((prefix, segment)): Path<(String, String)>,
    method: Method,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let Some(viewset) = state.registry.find_by_prefix(&prefix) else {
        return not_found();
    };
    let method_name = method.as_str().to_lowercase();

    if let Some(extra) = find_extra_action(viewset.as_ref(), &segment).filter(|a| !a.detail) {
        if !extra.methods.iter().any(|m| *m == method_name) {
            return BridgeError::UnsupportedAction(method.to_string()).into_response();
        }
        let arguments = if method == Method::GET {
            query_arguments(query)
        } else {
            match body_arguments(&body) {
                Ok(data) => data,
                Err(e) => return e.into_response(),
            }
        };
        let call = ActionCall::new(Action::Extra(extra.name)).with_arguments(arguments);
        return execute(viewset, call).await;
    }

    let call = match method {
        Method::GET => ActionCall::new(Action::Retrieve),
        Method::PUT | Method::PATCH => match body_arguments(&body) {
            Ok(data) => ActionCall::new(Action::Update).with_arguments(data),
            Err(e) => return e.into_response(),
        },
        Method::DELETE => ActionCall::new(Action::Destroy),
        other => return BridgeError::UnsupportedAction(other.to_string()).into_response(),
    };

    if let Err(e) = ensure_supported(viewset.as_ref(), &call.action) {
        return e.into_response();
    }
    execute(viewset, call.with_pk(segment)).await
}

/// `/{prefix}/{id}/{action}/`: a detail-scoped extra action.
pub async fn detail_action(
    State(state): State<AppState>,
    Path((prefix, id, action)): Path<(String, String, String)>,
    method: Method,
    body: Bytes,
) -> Response {
    let Some(viewset) = state.registry.find_by_prefix(&prefix) else {
        return not_found();
    };
    let method_name = method.as_str().to_lowercase();

    let Some(extra) = find_extra_action(viewset.as_ref(), &action).filter(|a| a.detail) else {
        return not_found();
    };
    if !extra.methods.iter().any(|m| *m == method_name) {
        return BridgeError::UnsupportedAction(method.to_string()).into_response();
    }

    let arguments = match body_arguments(&body) {
        Ok(data) => data,
        Err(e) => return e.into_response(),
    };
    let call = ActionCall::new(Action::Extra(extra.name))
        .with_pk(id)
        .with_arguments(arguments);
    execute(viewset, call).await
}
