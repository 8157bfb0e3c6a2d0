//! Static MCP prompts.

use serde_json::{json, Map, Value};

pub const USER_MANAGEMENT_GUIDE: &str = "user-management-guide";

pub fn list_prompts() -> Value {
    json!([{
        "name": USER_MANAGEMENT_GUIDE,
        "description": "Provides guidance on using the user management tools",
        "arguments": [{
            "name": "operation",
            "description": "Specific operation (create/read/update/delete/list)",
            "required": false,
        }],
    }])
}

const OVERVIEW: &str = "Users can be managed with these tools:\n\
- list_users / list_active_users: paginated listings (20 per page, optional `page`)\n\
- create_user: requires username, email, first_name, last_name and password\n\
- get_user: fetch one user by `user_id`\n\
- update_user: partial update, only `user_id` is required\n\
- delete_user: remove a user by `user_id`\n\
- activate_user / deactivate_user: toggle `is_active`";

fn operation_hint(operation: &str) -> Option<&'static str> {
    Some(match operation {
        "create" => {
            "To create a user call create_user with username, email, first_name, last_name \
             and password. bio and birth_date (YYYY-MM-DD) are optional. Usernames and emails \
             must be unique."
        }
        "read" => "To read a user call get_user with its numeric user_id.",
        "update" => {
            "To update a user call update_user with user_id and only the fields to change. \
             Passing is_active toggles the account."
        }
        "delete" => "To delete a user call delete_user with its user_id. This cannot be undone.",
        "list" => {
            "To list users call list_users (or list_active_users) with an optional page number. \
             Results are ordered newest first and include count, next and previous."
        }
        _ => return None,
    })
}

/// Renders a prompt, or `None` when no prompt has that name.
pub fn get_prompt(name: &str, arguments: &Map<String, Value>) -> Option<Value> {
    if name != USER_MANAGEMENT_GUIDE {
        return None;
    }

    let operation = arguments
        .get("operation")
        .and_then(Value::as_str)
        .map(|op| op.trim().to_lowercase());

    let text = match operation.as_deref().and_then(operation_hint) {
        Some(hint) => format!("{}\n\n{}", hint, OVERVIEW),
        None => OVERVIEW.to_string(),
    };

    Some(json!({
        "description": "Guidance for the user management tools",
        "messages": [{
            "role": "user",
            "content": {"type": "text", "text": text},
        }],
    }))
}
