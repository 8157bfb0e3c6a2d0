//! Serializer field descriptors, schema generation and validation.

pub mod fields;
pub mod schema;
pub mod validate;

pub use fields::{FieldKind, FieldSpec};
pub use schema::{empty_object_schema, field_schema, serializer_schema};
pub use validate::{validate, ValidationErrors};
