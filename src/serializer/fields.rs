//! Field descriptors for serializers.
//!
//! A serializer is described by an ordered list of [`FieldSpec`]s. The same list
//! drives input schema generation and input validation.

/// The kind of a serializer field, mirroring the common REST serializer field classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Char,
    Email,
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
    /// Choice field with `(value, display)` pairs
    Choice(Vec<(String, String)>),
}

impl FieldKind {
    /// Serializer class name for this kind (e.g. `CharField`).
    pub fn class_name(&self) -> &'static str {
        match self {
            FieldKind::Char => "CharField",
            FieldKind::Email => "EmailField",
            FieldKind::Integer => "IntegerField",
            FieldKind::Float => "FloatField",
            FieldKind::Boolean => "BooleanField",
            FieldKind::Date => "DateField",
            FieldKind::DateTime => "DateTimeField",
            FieldKind::Choice(_) => "ChoiceField",
        }
    }

    /// JSON Schema `type` for this kind.
    pub fn json_type(&self) -> &'static str {
        match self {
            FieldKind::Integer => "integer",
            FieldKind::Float => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Char
            | FieldKind::Email
            | FieldKind::Date
            | FieldKind::DateTime
            | FieldKind::Choice(_) => "string",
        }
    }

    /// JSON Schema `format` for this kind, if any.
    pub fn format(&self) -> Option<&'static str> {
        match self {
            FieldKind::Email => Some("email"),
            FieldKind::Date => Some("date"),
            FieldKind::DateTime => Some("date-time"),
            _ => None,
        }
    }
}

/// Descriptor of one serializer field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub read_only: bool,
    pub write_only: bool,
    pub allow_blank: bool,
    pub allow_null: bool,
    pub max_length: Option<usize>,
    pub help_text: Option<String>,
    pub label: Option<String>,
}

impl FieldSpec {
    /// Creates a required, writable field.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            read_only: false,
            write_only: false,
            allow_blank: false,
            allow_null: false,
            max_length: None,
            help_text: None,
            label: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Marks the field read-only. Read-only fields are never required.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self.required = false;
        self
    }

    pub fn write_only(mut self) -> Self {
        self.write_only = true;
        self
    }

    pub fn allow_blank(mut self) -> Self {
        self.allow_blank = true;
        self
    }

    pub fn allow_null(mut self) -> Self {
        self.allow_null = true;
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = Some(help_text.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Description used in generated schemas: help text, then label, then a generic default.
    pub fn description(&self) -> String {
        self.help_text
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.label.as_deref().filter(|s| !s.is_empty()))
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!(
                    "The {} value",
                    self.kind.class_name().replace("Field", "").to_lowercase()
                )
            })
    }
}
