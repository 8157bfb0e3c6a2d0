//! Direct user tools. These bypass ViewSet dispatch and talk to the repository.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::{BridgeError, Result};
use crate::pagination::PageRequest;
use crate::store::{UserFilter, UserRepository};
use crate::tool::{FnTool, Tool, ToolDescriptor, ToolOutcome};
use crate::users::serializers::{validate_create, validate_update, UserDetail};
use crate::users::views::{list_page, parse_id};

#[derive(Debug, Clone, Copy)]
enum Op {
    List,
    ListActive,
    Create,
    Get,
    Update,
    Delete,
    Activate,
    Deactivate,
}

impl Op {
    fn error_prefix(self) -> &'static str {
        match self {
            Op::List => "Error listing users",
            Op::ListActive => "Error listing active users",
            Op::Create => "Error creating user",
            Op::Get => "Error getting user",
            Op::Update => "Error updating user",
            Op::Delete => "Error deleting user",
            Op::Activate => "Error activating user",
            Op::Deactivate => "Error deactivating user",
        }
    }

    /// Folds an error into the tool's failure text.
    fn failure(self, err: BridgeError) -> ToolOutcome {
        let text = match (&err, self) {
            (BridgeError::NotFound { .. }, _) => err.to_string(),
            (BridgeError::Validation(errors), Op::Create) => {
                format!("Failed to create user. Validation errors: {}", errors)
            }
            (BridgeError::Validation(errors), Op::Update) => {
                format!("Failed to update user. Validation errors: {}", errors)
            }
            _ => format!("{}: {}", self.error_prefix(), err),
        };
        ToolOutcome::Fault(text)
    }
}

struct UserTools {
    repo: Arc<dyn UserRepository>,
    page_size: usize,
}

impl UserTools {
    fn run(&self, op: Op, arguments: Map<String, Value>) -> ToolOutcome {
        debug!(?op, "Running direct user tool");
        let result = match op {
            Op::List => self.list(&arguments, UserFilter::default(), "Users list"),
            Op::ListActive => self.list(&arguments, UserFilter::active(), "Active users list"),
            Op::Create => self.create(&arguments),
            Op::Get => self.get(&arguments),
            Op::Update => self.update(arguments),
            Op::Delete => self.delete(&arguments),
            Op::Activate => self.set_active(&arguments, true),
            Op::Deactivate => self.set_active(&arguments, false),
        };
        match result {
            Ok(text) => ToolOutcome::Ok(text),
            Err(e) => op.failure(e),
        }
    }

    fn list(&self, arguments: &Map<String, Value>, filter: UserFilter, title: &str) -> Result<String> {
        let request = PageRequest::from_arguments(arguments, self.page_size);
        let page = list_page(self.repo.as_ref(), &filter, request)?;
        Ok(format!("{}:\n\n{}", title, pretty(&page)?))
    }

    fn create(&self, arguments: &Map<String, Value>) -> Result<String> {
        let new_user = validate_create(self.repo.as_ref(), arguments)?;
        let user = self.repo.create_user(&new_user)?;
        Ok(format!(
            "User created successfully!\n\n{}",
            pretty(&UserDetail::from(&user))?
        ))
    }

    fn get(&self, arguments: &Map<String, Value>) -> Result<String> {
        let id = user_id(arguments)?;
        let user = self
            .repo
            .get_user(id.value)?
            .ok_or_else(|| BridgeError::not_found("User", &id.raw))?;
        Ok(format!("User details:\n\n{}", pretty(&UserDetail::from(&user))?))
    }

    fn update(&self, mut arguments: Map<String, Value>) -> Result<String> {
        let id = user_id(&arguments)?;
        arguments.remove("user_id");
        if self.repo.get_user(id.value)?.is_none() {
            return Err(BridgeError::not_found("User", &id.raw));
        }

        let changes = validate_update(self.repo.as_ref(), id.value, &arguments)?;
        let user = self
            .repo
            .update_user(id.value, &changes)?
            .ok_or_else(|| BridgeError::not_found("User", &id.raw))?;
        Ok(format!(
            "User updated successfully!\n\n{}",
            pretty(&UserDetail::from(&user))?
        ))
    }

    fn delete(&self, arguments: &Map<String, Value>) -> Result<String> {
        let id = user_id(arguments)?;
        if !self.repo.delete_user(id.value)? {
            return Err(BridgeError::not_found("User", &id.raw));
        }
        Ok(format!("User {} deleted successfully!", id.raw))
    }

    fn set_active(&self, arguments: &Map<String, Value>, is_active: bool) -> Result<String> {
        let id = user_id(arguments)?;
        if !self.repo.set_active(id.value, is_active)? {
            return Err(BridgeError::not_found("User", &id.raw));
        }
        let verb = if is_active { "activated" } else { "deactivated" };
        Ok(format!("User {} {} successfully!", id.raw, verb))
    }
}

fn pretty<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// A parsed `user_id` together with the text the caller sent, which is what
/// messages echo back.
struct UserId {
    value: i64,
    raw: String,
}

/// Reads `user_id`. Absent, null, empty or zero counts as missing.
fn user_id(arguments: &Map<String, Value>) -> Result<UserId> {
    let missing = || BridgeError::InvalidArgument("user_id is required".to_string());
    let raw = match arguments.get("user_id") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => return Err(missing()),
        Some(Value::String(s)) if s.is_empty() => return Err(missing()),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => return Err(missing()),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    Ok(UserId {
        value: parse_id(&raw)?,
        raw,
    })
}

fn page_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "page": {
                "type": "integer",
                "minimum": 1,
                "description": "Page number (optional)",
            },
        },
    })
}

fn user_id_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "user_id": {
                "type": "integer",
                "description": "User ID",
                "minimum": 1,
            },
        },
        "required": ["user_id"],
    })
}

fn create_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "username": {"type": "string", "description": "Unique username"},
            "email": {"type": "string", "format": "email", "description": "User's email address"},
            "first_name": {"type": "string", "description": "User's first name"},
            "last_name": {"type": "string", "description": "User's last name"},
            "password": {"type": "string", "description": "User's password"},
            "bio": {"type": "string", "description": "User's bio (optional)"},
            "birth_date": {
                "type": "string",
                "format": "date",
                "description": "Birth date (YYYY-MM-DD, optional)",
            },
        },
        "required": ["username", "email", "first_name", "last_name", "password"],
    })
}

fn update_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "user_id": {"type": "integer", "description": "User ID", "minimum": 1},
            "username": {"type": "string", "description": "Username"},
            "email": {"type": "string", "format": "email", "description": "Email"},
            "first_name": {"type": "string", "description": "First name"},
            "last_name": {"type": "string", "description": "Last name"},
            "bio": {"type": "string", "description": "Bio"},
            "birth_date": {"type": "string", "format": "date", "description": "Birth date (YYYY-MM-DD)"},
            "is_active": {"type": "boolean", "description": "Active status"},
        },
        "required": ["user_id"],
    })
}

/// The eight direct user tools, in catalog order.
pub fn user_tools(repo: Arc<dyn UserRepository>, page_size: usize) -> Vec<Arc<dyn Tool>> {
    let tools = Arc::new(UserTools { repo, page_size });

    let specs = [
        ("list_users", "List all users with pagination", page_schema(), Op::List),
        ("create_user", "Create a new user", create_schema(), Op::Create),
        ("get_user", "Get a specific user by ID", user_id_schema(), Op::Get),
        ("update_user", "Update an existing user", update_schema(), Op::Update),
        ("delete_user", "Delete a user by ID", user_id_schema(), Op::Delete),
        ("list_active_users", "List only active users", page_schema(), Op::ListActive),
        ("activate_user", "Activate a user", user_id_schema(), Op::Activate),
        ("deactivate_user", "Deactivate a user", user_id_schema(), Op::Deactivate),
    ];

    specs
        .into_iter()
        .map(|(name, description, schema, op)| {
            let tools = Arc::clone(&tools);
            Arc::new(FnTool::new(
                ToolDescriptor::new(name, description, schema),
                move |arguments| tools.run(op, arguments),
            )) as Arc<dyn Tool>
        })
        .collect()
}
