//! JSON Schema generation from field descriptors.

use serde_json::{json, Map, Value};

use super::fields::{FieldKind, FieldSpec};

/// An object schema with no properties.
pub fn empty_object_schema() -> Value {
    json!({
        "type": "object",
        "properties": {},
        "required": [],
    })
}

/// Schema for a single field.
pub fn field_schema(field: &FieldSpec) -> Value {
    let mut schema = Map::new();
    schema.insert("type".into(), json!(field.kind.json_type()));

    if let Some(format) = field.kind.format() {
        schema.insert("format".into(), json!(format));
    }
    if let Some(max_length) = field.max_length {
        schema.insert("maxLength".into(), json!(max_length));
    }
    if let FieldKind::Choice(choices) = &field.kind {
        let values: Vec<Value> = choices
            .iter()
            .map(|(value, _)| Value::String(value.clone()))
            .collect();
        schema.insert("enum".into(), Value::Array(values));
    }
    schema.insert("description".into(), json!(field.description()));

    Value::Object(schema)
}

/// Object schema with one property per writable field.
///
/// When `collect_required` is set, writable fields flagged as required are listed
/// under `required`.
pub fn serializer_schema(fields: &[FieldSpec], collect_required: bool) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in fields.iter().filter(|f| !f.read_only) {
        properties.insert(field.name.clone(), field_schema(field));
        if collect_required && field.required {
            required.push(Value::String(field.name.clone()));
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}
