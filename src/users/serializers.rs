//! User field descriptors, output projections and write validation.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::serializer::{validate, FieldKind, FieldSpec, ValidationErrors};
use crate::store::{format_timestamp, NewUser, User, UserChanges, UserRepository};
use crate::users::password::hash_password;

pub const USERNAME_INVALID: &str = "Enter a valid username. This value may contain only \
                                    letters, numbers, and @/./+/-/_ characters.";
pub const USERNAME_TAKEN: &str = "A user with that username already exists.";
pub const EMAIL_TAKEN: &str = "user with this email already exists.";

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username regex"));

/// Fields of the full user serializer, used for everything except `list`.
pub fn detail_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("id", FieldKind::Integer).read_only().label("ID"),
        FieldSpec::new("username", FieldKind::Char)
            .max_length(150)
            .help_text("Required. 150 characters or fewer. Letters, digits and @/./+/-/_ only."),
        FieldSpec::new("email", FieldKind::Email)
            .max_length(254)
            .label("Email address"),
        FieldSpec::new("first_name", FieldKind::Char)
            .max_length(150)
            .label("First name"),
        FieldSpec::new("last_name", FieldKind::Char)
            .max_length(150)
            .label("Last name"),
        FieldSpec::new("full_name", FieldKind::Char).read_only(),
        FieldSpec::new("bio", FieldKind::Char)
            .optional()
            .allow_blank()
            .label("Bio"),
        FieldSpec::new("birth_date", FieldKind::Date)
            .optional()
            .allow_null()
            .label("Birth date"),
        FieldSpec::new("password", FieldKind::Char)
            .write_only()
            .max_length(128)
            .label("Password"),
        FieldSpec::new("created_at", FieldKind::DateTime).read_only(),
        FieldSpec::new("updated_at", FieldKind::DateTime).read_only(),
        FieldSpec::new("is_active", FieldKind::Boolean)
            .optional()
            .label("Active")
            .help_text("Designates whether this user should be treated as active."),
    ]
}

/// Fields of the simplified list serializer.
pub fn list_fields() -> Vec<FieldSpec> {
    const LISTED: [&str; 8] = [
        "id",
        "username",
        "email",
        "first_name",
        "last_name",
        "full_name",
        "created_at",
        "is_active",
    ];
    detail_fields()
        .into_iter()
        .filter(|f| LISTED.contains(&f.name.as_str()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserListItem {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub created_at: String,
    pub is_active: bool,
}

impl From<&User> for UserListItem {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            full_name: user.full_name(),
            created_at: format_timestamp(&user.created_at),
            is_active: user.is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserDetail {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub bio: String,
    pub birth_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub is_active: bool,
}

impl From<&User> for UserDetail {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            full_name: user.full_name(),
            bio: user.bio.clone(),
            birth_date: user.birth_date.map(|d| d.format("%Y-%m-%d").to_string()),
            created_at: format_timestamp(&user.created_at),
            updated_at: format_timestamp(&user.updated_at),
            is_active: user.is_active,
        }
    }
}

/// Validates a create payload and hashes the password.
pub fn validate_create(repo: &dyn UserRepository, data: &Map<String, Value>) -> Result<NewUser> {
    let validated = validate(&detail_fields(), data, false)?;
    check_constraints(repo, &validated, None)?;

    Ok(NewUser {
        username: text(&validated, "username").unwrap_or_default(),
        email: text(&validated, "email").unwrap_or_default(),
        first_name: text(&validated, "first_name").unwrap_or_default(),
        last_name: text(&validated, "last_name").unwrap_or_default(),
        bio: text(&validated, "bio").unwrap_or_default(),
        birth_date: date(&validated, "birth_date").flatten(),
        password: hash_password(&text(&validated, "password").unwrap_or_default()),
        is_active: validated
            .get("is_active")
            .and_then(Value::as_bool)
            .unwrap_or(true),
    })
}

/// Validates a partial update of user `id`.
pub fn validate_update(
    repo: &dyn UserRepository,
    id: i64,
    data: &Map<String, Value>,
) -> Result<UserChanges> {
    let validated = validate(&detail_fields(), data, true)?;
    check_constraints(repo, &validated, Some(id))?;

    Ok(UserChanges {
        username: text(&validated, "username"),
        email: text(&validated, "email"),
        first_name: text(&validated, "first_name"),
        last_name: text(&validated, "last_name"),
        bio: text(&validated, "bio"),
        birth_date: date(&validated, "birth_date"),
        password: text(&validated, "password").map(|raw| hash_password(&raw)),
        is_active: validated.get("is_active").and_then(Value::as_bool),
    })
}

/// Username pattern and uniqueness checks on already coerced values.
fn check_constraints(
    repo: &dyn UserRepository,
    validated: &Map<String, Value>,
    exclude: Option<i64>,
) -> Result<()> {
    let mut errors = ValidationErrors::new();

    if let Some(username) = validated.get("username").and_then(Value::as_str) {
        if !USERNAME_RE.is_match(username) {
            errors.add("username", USERNAME_INVALID);
        } else if repo.username_taken(username, exclude)? {
            errors.add("username", USERNAME_TAKEN);
        }
    }

    if let Some(email) = validated.get("email").and_then(Value::as_str) {
        if repo.email_taken(email, exclude)? {
            errors.add("email", EMAIL_TAKEN);
        }
    }

    Ok(errors.into_result(())?)
}

fn text(validated: &Map<String, Value>, key: &str) -> Option<String> {
    validated.get(key).and_then(Value::as_str).map(str::to_string)
}

/// `None` when absent, `Some(None)` when explicitly null.
fn date(validated: &Map<String, Value>, key: &str) -> Option<Option<NaiveDate>> {
    validated.get(key).map(|value| {
        value
            .as_str()
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
    })
}
