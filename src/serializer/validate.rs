//! Input validation against field descriptors.
//!
//! Error messages follow the wording clients of REST serializers expect, so that
//! validation failures can be reported verbatim as `field -> [messages]`.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use super::fields::{FieldKind, FieldSpec};

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const NULL: &str = "This field may not be null.";
pub const INVALID_STRING: &str = "Not a valid string.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const INVALID_INTEGER: &str = "A valid integer is required.";
pub const INVALID_NUMBER: &str = "A valid number is required.";
pub const INVALID_BOOLEAN: &str = "Must be a valid boolean.";
pub const INVALID_DATE: &str =
    "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";
pub const INVALID_DATETIME: &str = "Datetime has wrong format. Use one of these formats instead: YYYY-MM-DDThh:mm[:ss[.uuuuuu]][+HH:MM|-HH:MM|Z].";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("valid email regex"));

/// Validation errors keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns `Err(self)` when any error was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string_pretty(&self.0).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// Validates `data` against `fields`.
///
/// Read-only and unknown keys are dropped. With `partial` set, absent fields are
/// not reported as missing. On success the normalized values are returned.
pub fn validate(
    fields: &[FieldSpec],
    data: &Map<String, Value>,
    partial: bool,
) -> Result<Map<String, Value>, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut validated = Map::new();

    for field in fields.iter().filter(|f| !f.read_only) {
        match data.get(&field.name) {
            None => {
                if field.required && !partial {
                    errors.add(&field.name, REQUIRED);
                }
            }
            Some(Value::Null) => {
                if field.allow_null {
                    validated.insert(field.name.clone(), Value::Null);
                } else {
                    errors.add(&field.name, NULL);
                }
            }
            Some(value) => match coerce(field, value) {
                Ok(value) => {
                    validated.insert(field.name.clone(), value);
                }
                Err(message) => errors.add(&field.name, message),
            },
        }
    }

    errors.into_result(validated)
}

fn coerce(field: &FieldSpec, value: &Value) -> Result<Value, String> {
    match &field.kind {
        FieldKind::Char | FieldKind::Email => coerce_text(field, value),
        FieldKind::Integer => coerce_integer(value),
        FieldKind::Float => coerce_float(value),
        FieldKind::Boolean => coerce_boolean(value),
        FieldKind::Date => {
            let text = value.as_str().ok_or(INVALID_DATE)?.trim();
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map(|date| Value::String(date.format("%Y-%m-%d").to_string()))
                .map_err(|_| INVALID_DATE.to_string())
        }
        FieldKind::DateTime => {
            let text = value.as_str().ok_or(INVALID_DATETIME)?.trim();
            DateTime::parse_from_rfc3339(text)
                .map(|dt| Value::String(dt.to_rfc3339()))
                .map_err(|_| INVALID_DATETIME.to_string())
        }
        FieldKind::Choice(choices) => {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => String::new(),
            };
            if choices.iter().any(|(choice, _)| *choice == text) {
                Ok(Value::String(text))
            } else {
                Err(format!("\"{}\" is not a valid choice.", text))
            }
        }
    }
}

fn coerce_text(field: &FieldSpec, value: &Value) -> Result<Value, String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return Err(INVALID_STRING.to_string()),
    };

    if text.is_empty() {
        return if field.allow_blank {
            Ok(Value::String(text))
        } else {
            Err(BLANK.to_string())
        };
    }

    if let Some(max_length) = field.max_length {
        if text.chars().count() > max_length {
            return Err(format!(
                "Ensure this field has no more than {} characters.",
                max_length
            ));
        }
    }

    if field.kind == FieldKind::Email && !EMAIL_RE.is_match(&text) {
        return Err(INVALID_EMAIL.to_string());
    }

    Ok(Value::String(text))
}

fn coerce_integer(value: &Value) -> Result<Value, String> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 => Ok(Value::from(f as i64)),
            _ => Err(INVALID_INTEGER.to_string()),
        },
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| INVALID_INTEGER.to_string()),
        _ => Err(INVALID_INTEGER.to_string()),
    }
}

fn coerce_float(value: &Value) -> Result<Value, String> {
    match value {
        Value::Number(_) => Ok(value.clone()),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| INVALID_NUMBER.to_string()),
        _ => Err(INVALID_NUMBER.to_string()),
    }
}

fn coerce_boolean(value: &Value) -> Result<Value, String> {
    match value {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Ok(Value::Bool(true)),
            Some(0) => Ok(Value::Bool(false)),
            _ => Err(INVALID_BOOLEAN.to_string()),
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "t" | "y" | "yes" | "true" | "on" | "1" => Ok(Value::Bool(true)),
            "f" | "n" | "no" | "false" | "off" | "0" => Ok(Value::Bool(false)),
            _ => Err(INVALID_BOOLEAN.to_string()),
        },
        _ => Err(INVALID_BOOLEAN.to_string()),
    }
}
