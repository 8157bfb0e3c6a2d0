//! Tool catalog: turns registered ViewSets and direct tools into tool descriptors.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::warn;

use crate::registry::Registry;
use crate::serializer::{empty_object_schema, serializer_schema};
use crate::tool::ToolDescriptor;
use crate::viewset::{model_name, Action, ExtraAction, ViewSet};

/// Tool name prefix for a ViewSet: `{app}_{model}`.
pub fn tool_prefix(app: &str, viewset: &dyn ViewSet) -> String {
    format!("{}_{}", app, model_name(viewset).to_lowercase())
}

#[derive(Clone)]
pub struct ToolCatalog {
    registry: Arc<Registry>,
}

impl ToolCatalog {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// All tools: direct tools first, then one per ViewSet action.
    pub fn discover(&self) -> Vec<ToolDescriptor> {
        let mut tools: Vec<ToolDescriptor> =
            self.registry.tools().iter().map(|t| t.descriptor()).collect();

        for (app, viewset) in self.registry.viewsets() {
            tools.extend(viewset_tools(&app, viewset.as_ref()));
        }

        tools
    }
}

/// Descriptors for every action a ViewSet exposes.
pub fn viewset_tools(app: &str, viewset: &dyn ViewSet) -> Vec<ToolDescriptor> {
    let prefix = tool_prefix(app, viewset);
    let model = model_name(viewset);
    let mut tools = Vec::new();

    for action in Action::STANDARD {
        if viewset.supports(&action) {
            tools.push(ToolDescriptor::new(
                format!("{}_{}", action.as_str(), prefix),
                format!("{} {} in {}", action.title(), model, app),
                action_schema(viewset, &action),
            ));
        }
    }

    for extra in viewset.extra_actions() {
        tools.push(ToolDescriptor::new(
            format!("{}_{}", extra.name, prefix),
            format!("{} {} in {}", extra.summary(), model, app),
            extra_action_schema(&extra),
        ));
    }

    tools
}

/// Input schema for a standard action.
pub fn action_schema(viewset: &dyn ViewSet, action: &Action) -> Value {
    match action {
        Action::List => json!({
            "type": "object",
            "properties": {
                "page": {
                    "type": "integer",
                    "description": "Page number (optional)",
                    "minimum": 1,
                },
            },
            "required": [],
        }),
        Action::Retrieve | Action::Destroy => json!({
            "type": "object",
            "properties": {
                "id": {
                    "type": "string",
                    "description": format!(
                        "ID of the {} to {}",
                        model_name(viewset).to_lowercase(),
                        action.as_str()
                    ),
                },
            },
            "required": ["id"],
        }),
        Action::Create | Action::Update => serializer_action_schema(viewset, action),
        Action::Extra(_) => empty_object_schema(),
    }
}

fn serializer_action_schema(viewset: &dyn ViewSet, action: &Action) -> Value {
    let fields = match viewset.serializer_fields(action) {
        Ok(fields) => fields,
        Err(e) => {
            warn!(viewset = viewset.name(), error = %e, "Failed to generate schema from serializer");
            return empty_object_schema();
        }
    };

    if *action == Action::Create {
        return serializer_schema(&fields, true);
    }

    let mut schema = serializer_schema(&fields, false);
    schema["properties"]["id"] = json!({
        "type": "string",
        "description": format!("ID of the {} to update", model_name(viewset).to_lowercase()),
    });
    schema["required"] = json!(["id"]);
    schema
}

fn extra_action_schema(extra: &ExtraAction) -> Value {
    if extra.detail {
        json!({
            "type": "object",
            "properties": {
                "id": {
                    "type": "string",
                    "description": "ID of the object to perform action on",
                },
            },
            "required": ["id"],
        })
    } else {
        empty_object_schema()
    }
}
