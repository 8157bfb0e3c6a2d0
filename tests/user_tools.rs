//! Integration tests for the direct user tools, called through `tools/call`.

use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;

use crud_mcp::{users, McpHandler, Registry, ServerConfig, SqliteStore, UserRepository};

fn handler_with_store(store: SqliteStore) -> McpHandler {
    let store: Arc<dyn UserRepository> = Arc::new(store);
    let mut registry = Registry::new();
    users::register(&mut registry, store, 20);
    McpHandler::new(Arc::new(registry), ServerConfig::default())
}

fn handler() -> McpHandler {
    handler_with_store(SqliteStore::in_memory().expect("in-memory store"))
}

/// Calls a tool and returns `(text, is_error)`.
fn call_tool(handler: &McpHandler, name: &str, arguments: Value) -> (String, bool) {
    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments},
    });
    let response = serde_json::to_value(handler.handle_value(request)).unwrap();
    assert!(response.get("error").is_none(), "unexpected RPC error: {}", response);

    let result = &response["result"];
    let text = result["content"][0]["text"].as_str().unwrap().to_string();
    (text, result["isError"] == true)
}

/// Parses the JSON document that follows a `"Title:\n\n"` header.
fn body_json(text: &str) -> Value {
    let (_, body) = text.split_once("\n\n").expect("text has a body");
    serde_json::from_str(body).expect("body is JSON")
}

fn user_args(username: &str) -> Value {
    json!({
        "username": username,
        "email": format!("{}@example.com", username),
        "first_name": "Test",
        "last_name": username,
        "password": "secret123",
    })
}

fn create(handler: &McpHandler, username: &str) -> Value {
    let (text, is_error) = call_tool(handler, "create_user", user_args(username));
    assert!(!is_error, "create failed: {}", text);
    assert!(text.starts_with("User created successfully!\n\n"));
    body_json(&text)
}

// ============================================================================
// Create / Get Tests
// ============================================================================

mod create_and_get {
    use super::*;

    #[test]
    fn test_create_without_email_reports_field() {
        let mut args = user_args("noemail");
        args.as_object_mut().unwrap().remove("email");

        let (text, is_error) = call_tool(&handler(), "create_user", args);
        assert!(is_error);
        assert!(text.starts_with("Failed to create user. Validation errors: "));
        assert!(text.contains("email"));
    }

    #[test]
    fn test_get_unknown_user() {
        let (text, _) = call_tool(&handler(), "get_user", json!({"user_id": 4242}));
        assert_eq!(text, "User with ID 4242 not found");
    }

    #[test]
    fn test_round_trip() {
        let handler = handler();
        let mut args = user_args("roundtrip");
        args["bio"] = json!("Writes tests");
        args["birth_date"] = json!("1991-07-04");
        let (text, _) = call_tool(&handler, "create_user", args);
        let created = body_json(&text);

        let (text, is_error) = call_tool(&handler, "get_user", json!({"user_id": created["id"]}));
        assert!(!is_error);
        assert!(text.starts_with("User details:\n\n"));
        let fetched = body_json(&text);

        assert_eq!(fetched, created);
        assert_eq!(fetched["username"], "roundtrip");
        assert_eq!(fetched["bio"], "Writes tests");
        assert_eq!(fetched["birth_date"], "1991-07-04");
        assert_eq!(fetched["full_name"], "Test roundtrip");
        assert_eq!(fetched["is_active"], true);
        assert!(fetched.get("password").is_none());
    }

    #[test]
    fn test_duplicate_username() {
        let handler = handler();
        create(&handler, "taken");
        let (text, is_error) = call_tool(&handler, "create_user", user_args("taken"));
        assert!(is_error);
        assert!(text.contains("A user with that username already exists."));
        assert!(text.contains("user with this email already exists."));
    }

    #[test]
    fn test_get_requires_user_id() {
        let (text, is_error) = call_tool(&handler(), "get_user", json!({}));
        assert!(is_error);
        assert_eq!(text, "Error getting user: user_id is required");
    }
}

// ============================================================================
// Update / Delete / Activation Tests
// ============================================================================

mod mutations {
    use super::*;

    #[test]
    fn test_partial_update() {
        let handler = handler();
        let user = create(&handler, "upd");

        let (text, is_error) = call_tool(
            &handler,
            "update_user",
            json!({"user_id": user["id"], "first_name": "Changed"}),
        );
        assert!(!is_error);
        assert!(text.starts_with("User updated successfully!\n\n"));
        let updated = body_json(&text);
        assert_eq!(updated["first_name"], "Changed");
        assert_eq!(updated["email"], "upd@example.com");
    }

    #[test]
    fn test_delete() {
        let handler = handler();
        let id = create(&handler, "gone")["id"].as_i64().unwrap();

        let (text, _) = call_tool(&handler, "delete_user", json!({"user_id": id}));
        assert_eq!(text, format!("User {} deleted successfully!", id));

        let (text, _) = call_tool(&handler, "delete_user", json!({"user_id": id}));
        assert_eq!(text, format!("User with ID {} not found", id));
    }

    #[test]
    fn test_activation_and_active_listing() {
        let handler = handler();
        let id = create(&handler, "sleepy")["id"].as_i64().unwrap();
        create(&handler, "awake");

        let (text, _) = call_tool(&handler, "deactivate_user", json!({"user_id": id}));
        assert_eq!(text, format!("User {} deactivated successfully!", id));

        let (text, _) = call_tool(&handler, "list_active_users", json!({}));
        assert!(text.starts_with("Active users list:\n\n"));
        let page = body_json(&text);
        assert_eq!(page["count"], 1);
        assert_eq!(page["results"][0]["username"], "awake");

        let (text, _) = call_tool(&handler, "activate_user", json!({"user_id": id}));
        assert_eq!(text, format!("User {} activated successfully!", id));
        let (text, _) = call_tool(&handler, "list_active_users", json!({}));
        assert_eq!(body_json(&text)["count"], 2);
    }
}

// ============================================================================
// Pagination Tests
// ============================================================================

mod pagination {
    use super::*;

    #[test]
    fn test_list_users_pages() {
        let handler = handler();
        for i in 0..25 {
            create(&handler, &format!("user{:02}", i));
        }

        let (text, _) = call_tool(&handler, "list_users", json!({}));
        assert!(text.starts_with("Users list:\n\n"));
        let first = body_json(&text);
        assert_eq!(first["count"], 25);
        assert_eq!(first["next"], 2);
        assert_eq!(first["previous"], Value::Null);
        assert_eq!(first["results"].as_array().unwrap().len(), 20);
        // newest first
        assert_eq!(first["results"][0]["username"], "user24");
        assert!(first["results"][0].get("bio").is_none());

        let (text, _) = call_tool(&handler, "list_users", json!({"page": 2}));
        let second = body_json(&text);
        assert_eq!(second["results"].as_array().unwrap().len(), 5);
        assert_eq!(second["next"], Value::Null);
        assert_eq!(second["previous"], 1);
    }

    #[test]
    fn test_page_past_the_end() {
        let handler = handler();
        create(&handler, "only");

        let (text, is_error) = call_tool(&handler, "list_users", json!({"page": 7}));
        assert!(!is_error);
        let page = body_json(&text);
        assert_eq!(page["count"], 1);
        assert_eq!(page["results"], json!([]));
        assert_eq!(page["next"], Value::Null);
    }

    #[test]
    fn test_huge_page_numbers_are_past_the_end() {
        let handler = handler();
        create(&handler, "only");

        for page in [json!(9_223_372_036_854_775_809u64), json!(u64::MAX)] {
            let (text, is_error) = call_tool(&handler, "list_users", json!({ "page": page }));
            assert!(!is_error);
            let body = body_json(&text);
            assert_eq!(body["count"], 1);
            assert_eq!(body["results"], json!([]));
            assert_eq!(body["next"], Value::Null);
        }
    }

    #[test]
    fn test_invalid_page_means_first() {
        let handler = handler();
        create(&handler, "first");
        let (text, _) = call_tool(&handler, "list_users", json!({"page": "abc"}));
        assert_eq!(body_json(&text)["results"][0]["username"], "first");
    }
}

// ============================================================================
// Persistence Tests
// ============================================================================

mod persistence {
    use super::*;

    #[test]
    fn test_users_survive_restart() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = dir.path().join(".crud-mcp.db");

        let id = {
            let handler = handler_with_store(SqliteStore::new(&db_path).unwrap());
            create(&handler, "durable")["id"].clone()
        };

        let handler = handler_with_store(SqliteStore::new(&db_path).unwrap());
        let (text, _) = call_tool(&handler, "get_user", json!({"user_id": id}));
        assert_eq!(body_json(&text)["username"], "durable");
    }
}
