//! Resolves a tool name to a direct tool or a ViewSet action and executes it.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::error::{BridgeError, Result};
use crate::registry::Registry;
use crate::tool::ToolOutcome;
use crate::viewset::{find_extra_action, Action, ActionCall, Payload, ViewSet};

/// A generic tool name split into its parts: `{action}_{app}_{model}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolName {
    pub action: String,
    pub app: String,
    /// Lower-cased model name
    pub model: String,
}

/// Parses `{action}_{app}_{model}`. Tokens past the third are ignored.
pub fn parse_tool_name(name: &str) -> Result<ToolName> {
    let parts: Vec<&str> = name.split('_').collect();
    if parts.len() < 3 {
        return Err(BridgeError::InvalidToolName(name.to_string()));
    }
    Ok(ToolName {
        action: parts[0].to_string(),
        app: parts[1].to_string(),
        model: parts[2].to_lowercase(),
    })
}

#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Executes a tool. Errors never escape: they are folded into a fault.
    pub fn execute(&self, tool_name: &str, arguments: Map<String, Value>) -> ToolOutcome {
        if let Some(tool) = self.registry.find_tool(tool_name) {
            debug!(tool = tool_name, "Calling direct tool");
            return tool.call(arguments);
        }

        match self.execute_viewset_action(tool_name, arguments) {
            Ok(text) => ToolOutcome::Ok(text),
            Err(e) => {
                error!(tool = tool_name, error = %e, "Tool execution failed");
                ToolOutcome::Fault(format!("Error executing tool '{}': {}", tool_name, e))
            }
        }
    }

    fn execute_viewset_action(&self, tool_name: &str, arguments: Map<String, Value>) -> Result<String> {
        let parsed = parse_tool_name(tool_name)?;
        let viewset = self
            .registry
            .find_viewset(&parsed.app, &parsed.model)
            .ok_or_else(|| BridgeError::ViewSetNotFound {
                app: parsed.app.clone(),
                model: parsed.model.clone(),
            })?;

        debug!(
            action = %parsed.action,
            app = %parsed.app,
            viewset = viewset.name(),
            "Dispatching ViewSet action"
        );

        let call = build_call(viewset.as_ref(), &parsed.action, arguments)?;
        let payload = viewset.handle(&call)?;
        render_payload(&parsed.action, &payload)
    }
}

/// Builds the call for `action`, checking the `id` argument of detail actions.
pub fn build_call(viewset: &dyn ViewSet, action: &str, mut arguments: Map<String, Value>) -> Result<ActionCall> {
    let parsed = Action::parse(action);

    let unsupported = || BridgeError::UnsupportedAction(action.to_string());

    let detail = match &parsed {
        Action::Extra(name) => find_extra_action(viewset, name)
            .map(|extra| extra.detail)
            .ok_or_else(unsupported)?,
        standard if viewset.supports(standard) => standard.is_standard_detail(),
        _ => return Err(unsupported()),
    };

    let mut call = ActionCall::new(parsed);
    if detail {
        let pk = arguments
            .remove("id")
            .and_then(|id| id_to_string(&id))
            .ok_or_else(|| BridgeError::missing_parameter("id", action))?;
        call = call.with_pk(pk);
    }

    Ok(call.with_arguments(arguments))
}

fn id_to_string(id: &Value) -> Option<String> {
    let text = match id {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Renders a handler payload as the tool's text result.
pub fn render_payload(action: &str, payload: &Payload) -> Result<String> {
    let headline = format!("Action '{}' completed successfully.", action);
    Ok(match payload {
        Payload::Data { data, .. } => format!(
            "{}\n\nResponse data:\n{}",
            headline,
            serde_json::to_string_pretty(data)?
        ),
        Payload::Status(code) => format!("{}\n\nStatus: {}", headline, code),
        Payload::Empty => headline,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::FieldSpec;
    use crate::viewset::ExtraAction;
    use serde_json::json;

    struct Echo;

    impl ViewSet for Echo {
        fn name(&self) -> &str {
            "WidgetViewSet"
        }

        fn supports(&self, action: &Action) -> bool {
            *action != Action::Destroy
        }

        fn extra_actions(&self) -> Vec<ExtraAction> {
            vec![
                ExtraAction::new("spin", true, &["post"]),
                ExtraAction::new("recent", false, &["get"]),
            ]
        }

        fn serializer_fields(&self, _action: &Action) -> Result<Vec<FieldSpec>> {
            Ok(Vec::new())
        }

        fn handle(&self, call: &ActionCall) -> Result<Payload> {
            match &call.action {
                Action::Create => Ok(Payload::created(Value::Object(call.arguments.clone()))),
                Action::Update => Ok(Payload::Status(202)),
                Action::Extra(name) if name == "recent" => Ok(Payload::Empty),
                _ => Ok(Payload::ok(json!({"pk": call.pk}))),
            }
        }
    }

    fn dispatcher() -> Dispatcher {
        let mut registry = Registry::new();
        registry.register_viewset("shop", Arc::new(Echo));
        Dispatcher::new(Arc::new(registry))
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_parse_tool_name() {
        let parsed = parse_tool_name("retrieve_shop_Widget").unwrap();
        assert_eq!(parsed.action, "retrieve");
        assert_eq!(parsed.app, "shop");
        assert_eq!(parsed.model, "widget");

        let err = parse_tool_name("list_widgets").unwrap_err();
        assert_eq!(err.to_string(), "Invalid tool name format: list_widgets");
    }

    #[test]
    fn test_invalid_name_becomes_fault() {
        let outcome = dispatcher().execute("bogus", Map::new());
        assert!(outcome.is_fault());
        assert_eq!(
            outcome.text(),
            "Error executing tool 'bogus': Invalid tool name format: bogus"
        );
    }

    #[test]
    fn test_unknown_viewset() {
        let outcome = dispatcher().execute("list_shop_gadget", Map::new());
        assert_eq!(
            outcome.text(),
            "Error executing tool 'list_shop_gadget': ViewSet not found for shop.gadget"
        );
    }

    #[test]
    fn test_detail_action_requires_id() {
        let outcome = dispatcher().execute("retrieve_shop_widget", Map::new());
        assert!(outcome
            .text()
            .ends_with("Missing required parameter 'id' for action 'retrieve'"));

        let outcome = dispatcher().execute("spin_shop_widget", args(json!({"id": ""})));
        assert!(outcome
            .text()
            .ends_with("Missing required parameter 'id' for action 'spin'"));
    }

    #[test]
    fn test_unsupported_actions() {
        let outcome = dispatcher().execute("fly_shop_widget", Map::new());
        assert!(outcome.text().ends_with("Unsupported action: fly"));

        let outcome = dispatcher().execute("destroy_shop_widget", args(json!({"id": 1})));
        assert!(outcome.text().ends_with("Unsupported action: destroy"));
    }

    #[test]
    fn test_rendering() {
        let outcome = dispatcher().execute("retrieve_shop_widget", args(json!({"id": 7})));
        assert_eq!(
            outcome,
            ToolOutcome::Ok(
                "Action 'retrieve' completed successfully.\n\nResponse data:\n{\n  \"pk\": \"7\"\n}"
                    .into()
            )
        );

        let outcome = dispatcher().execute("update_shop_widget", args(json!({"id": "7"})));
        assert_eq!(
            outcome.text(),
            "Action 'update' completed successfully.\n\nStatus: 202"
        );

        let outcome = dispatcher().execute("recent_shop_widget", Map::new());
        assert_eq!(outcome.text(), "Action 'recent' completed successfully.");
    }

    #[test]
    fn test_create_passes_arguments_as_data() {
        let outcome = dispatcher().execute("create_shop_widget", args(json!({"name": "cog"})));
        assert!(!outcome.is_fault());
        assert!(outcome.text().contains("\"name\": \"cog\""));
    }
}
