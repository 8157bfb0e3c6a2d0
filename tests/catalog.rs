//! Integration tests for tool discovery and dispatch over the registry.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crud_mcp::error::{BridgeError, Result};
use crud_mcp::serializer::{FieldKind, FieldSpec};
use crud_mcp::{
    users, Action, ActionCall, Dispatcher, Payload, Registry, SqliteStore, ToolCatalog,
    ToolDescriptor, UserRepository, ViewSet,
};

fn users_registry() -> Registry {
    let store: Arc<dyn UserRepository> = Arc::new(SqliteStore::in_memory().expect("in-memory store"));
    let mut registry = Registry::new();
    users::register(&mut registry, store, 20);
    registry
}

fn find<'a>(tools: &'a [ToolDescriptor], name: &str) -> &'a ToolDescriptor {
    tools
        .iter()
        .find(|t| t.name == name)
        .unwrap_or_else(|| panic!("tool {} not found", name))
}

/// A ViewSet that answers every call with a fixed marker.
struct Marker {
    marker: &'static str,
}

impl ViewSet for Marker {
    fn name(&self) -> &str {
        "TaskViewSet"
    }

    fn model(&self) -> Option<&str> {
        Some("Task")
    }

    fn serializer_fields(&self, _action: &Action) -> Result<Vec<FieldSpec>> {
        Ok(vec![
            FieldSpec::new("title", FieldKind::Char).max_length(80),
            FieldSpec::new("priority", FieldKind::Choice(vec![
                ("low".into(), "Low".into()),
                ("high".into(), "High".into()),
            ]))
            .optional(),
        ])
    }

    fn handle(&self, _call: &ActionCall) -> Result<Payload> {
        Ok(Payload::ok(json!({ "marker": self.marker })))
    }
}

// ============================================================================
// Discovery Tests
// ============================================================================

mod discovery {
    use super::*;

    #[test]
    fn test_direct_tools_come_first() {
        let tools = ToolCatalog::new(Arc::new(users_registry())).discover();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();

        assert_eq!(&names[..2], ["list_users", "create_user"]);
        let first_generic = names.iter().position(|n| *n == "list_users_user").unwrap();
        assert_eq!(first_generic, 8);
    }

    #[test]
    fn test_user_viewset_tools() {
        let tools = ToolCatalog::new(Arc::new(users_registry())).discover();

        for name in [
            "list_users_user",
            "create_users_user",
            "retrieve_users_user",
            "update_users_user",
            "destroy_users_user",
            "activate_users_user",
            "active_users_user",
            "deactivate_users_user",
        ] {
            find(&tools, name);
        }
        assert_eq!(tools.len(), 16);

        assert_eq!(find(&tools, "list_users_user").description, "List User in users");
        assert_eq!(
            find(&tools, "active_users_user").description,
            "Get only active users User in users"
        );
    }

    #[test]
    fn test_user_create_and_update_schemas() {
        let tools = ToolCatalog::new(Arc::new(users_registry())).discover();

        let create = &find(&tools, "create_users_user").input_schema;
        assert_eq!(
            create["required"],
            json!(["username", "email", "first_name", "last_name", "password"])
        );
        assert!(create["properties"].get("id").is_none());
        assert!(create["properties"].get("created_at").is_none());
        assert_eq!(create["properties"]["email"]["format"], "email");
        assert_eq!(create["properties"]["email"]["maxLength"], 254);
        assert_eq!(create["properties"]["birth_date"]["format"], "date");
        assert_eq!(create["properties"]["is_active"]["type"], "boolean");

        let update = &find(&tools, "update_users_user").input_schema;
        assert_eq!(update["required"], json!(["id"]));
        assert_eq!(update["properties"]["id"]["type"], "string");
        assert!(update["properties"].get("username").is_some());

        let deactivate = &find(&tools, "deactivate_users_user").input_schema;
        assert_eq!(deactivate["required"], json!(["id"]));
        let active = &find(&tools, "active_users_user").input_schema;
        assert_eq!(active["required"], json!([]));
    }

    #[test]
    fn test_choice_field_becomes_enum() {
        let mut registry = Registry::new();
        registry.register_viewset("todo", Arc::new(Marker { marker: "a" }));
        let tools = ToolCatalog::new(Arc::new(registry)).discover();

        let create = &find(&tools, "create_todo_task").input_schema;
        assert_eq!(create["properties"]["priority"]["enum"], json!(["low", "high"]));
        assert_eq!(create["required"], json!(["title"]));
    }

    #[test]
    fn test_failing_app_is_skipped() {
        let mut registry = users_registry();
        registry.register_app("broken", || {
            Err(BridgeError::InvalidArgument("module has no views".into()))
        });
        let tools = ToolCatalog::new(Arc::new(registry)).discover();
        assert_eq!(tools.len(), 16);
    }

    #[test]
    fn test_allowed_apps_filter() {
        let mut registry = users_registry();
        registry.register_viewset("todo", Arc::new(Marker { marker: "a" }));
        registry.retain_apps(&["todo".to_string()]);

        let tools = ToolCatalog::new(Arc::new(registry)).discover();
        assert!(tools.iter().all(|t| !t.name.ends_with("_users_user")));
        assert!(tools.iter().any(|t| t.name == "list_todo_task"));
    }
}

// ============================================================================
// Duplicate Registration Tests
// ============================================================================

mod duplicates {
    use super::*;

    #[test]
    fn test_duplicate_names_listed_and_last_registered_dispatched() {
        let mut registry = Registry::new();
        registry.register_viewset("todo", Arc::new(Marker { marker: "first" }));
        registry.register_viewset("todo", Arc::new(Marker { marker: "second" }));
        let registry = Arc::new(registry);

        let tools = ToolCatalog::new(Arc::clone(&registry)).discover();
        let count = tools.iter().filter(|t| t.name == "list_todo_task").count();
        assert_eq!(count, 2);

        let outcome = Dispatcher::new(registry).execute("list_todo_task", Map::new());
        assert!(outcome.text().contains("\"marker\": \"second\""));
    }
}

// ============================================================================
// Dispatch Tests
// ============================================================================

mod dispatch {
    use super::*;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_generic_user_round_trip() {
        let dispatcher = Dispatcher::new(Arc::new(users_registry()));

        let created = dispatcher.execute(
            "create_users_user",
            args(json!({
                "username": "grace",
                "email": "grace@example.com",
                "first_name": "Grace",
                "last_name": "Hopper",
                "password": "cobol",
            })),
        );
        assert!(created
            .text()
            .starts_with("Action 'create' completed successfully.\n\nResponse data:\n"));

        let fetched = dispatcher.execute("retrieve_users_user", args(json!({"id": "1"})));
        assert!(fetched.text().contains("\"full_name\": \"Grace Hopper\""));

        let deleted = dispatcher.execute("destroy_users_user", args(json!({"id": 1})));
        assert_eq!(
            deleted.text(),
            "Action 'destroy' completed successfully.\n\nStatus: 204"
        );

        let missing = dispatcher.execute("retrieve_users_user", args(json!({"id": 1})));
        assert!(missing.is_fault());
        assert_eq!(
            missing.text(),
            "Error executing tool 'retrieve_users_user': User with ID 1 not found"
        );
    }

    #[test]
    fn test_generic_create_validation_error_mentions_field() {
        let dispatcher = Dispatcher::new(Arc::new(users_registry()));
        let outcome = dispatcher.execute("create_users_user", args(json!({"username": "x"})));
        assert!(outcome.is_fault());
        assert!(outcome.text().contains("\"email\""));
        assert!(outcome.text().contains("This field is required."));
    }

    #[test]
    fn test_unknown_viewset() {
        let dispatcher = Dispatcher::new(Arc::new(users_registry()));
        let outcome = dispatcher.execute("list_users_group", Map::new());
        assert_eq!(
            outcome.text(),
            "Error executing tool 'list_users_group': ViewSet not found for users.group"
        );
    }
}
