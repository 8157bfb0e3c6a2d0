//! The ViewSet handler interface.
//!
//! A ViewSet bundles the standard CRUD handlers for one entity type plus any
//! extra actions. Callers never go through routing: they build an [`ActionCall`]
//! and invoke [`ViewSet::handle`] directly.

use serde_json::{Map, Value};

use crate::error::Result;
use crate::serializer::FieldSpec;

/// An action that can be invoked on a ViewSet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    List,
    Create,
    Retrieve,
    Update,
    Destroy,
    /// A custom action registered by the ViewSet (e.g. `activate`)
    Extra(String),
}

impl Action {
    /// The five standard actions, in catalog order.
    pub const STANDARD: [Action; 5] = [
        Action::List,
        Action::Create,
        Action::Retrieve,
        Action::Update,
        Action::Destroy,
    ];

    pub fn parse(s: &str) -> Self {
        match s {
            "list" => Action::List,
            "create" => Action::Create,
            "retrieve" => Action::Retrieve,
            "update" => Action::Update,
            "destroy" => Action::Destroy,
            other => Action::Extra(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Action::List => "list",
            Action::Create => "create",
            Action::Retrieve => "retrieve",
            Action::Update => "update",
            Action::Destroy => "destroy",
            Action::Extra(name) => name,
        }
    }

    /// Action name with the first letter upper-cased (`list` -> `List`).
    pub fn title(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Whether the action targets a single object and needs an id.
    pub fn is_standard_detail(&self) -> bool {
        matches!(self, Action::Retrieve | Action::Update | Action::Destroy)
    }
}

/// Identity attached to an action call. MCP calls carry no credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Principal {
    #[default]
    Anonymous,
}

/// A fully resolved invocation of one ViewSet action.
#[derive(Debug, Clone)]
pub struct ActionCall {
    pub action: Action,
    /// Object id for detail-scoped actions
    pub pk: Option<String>,
    /// Query parameters for reads, payload for writes
    pub arguments: Map<String, Value>,
    pub principal: Principal,
}

impl ActionCall {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            pk: None,
            arguments: Map::new(),
            principal: Principal::Anonymous,
        }
    }

    pub fn with_pk(mut self, pk: impl Into<String>) -> Self {
        self.pk = Some(pk.into());
        self
    }

    pub fn with_arguments(mut self, arguments: Map<String, Value>) -> Self {
        self.arguments = arguments;
        self
    }
}

/// What a ViewSet handler returns.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Response body with its status code
    Data { status: u16, data: Value },
    /// Status code only (e.g. `204` after a delete)
    Status(u16),
    Empty,
}

impl Payload {
    pub fn ok(data: Value) -> Self {
        Payload::Data { status: 200, data }
    }

    pub fn created(data: Value) -> Self {
        Payload::Data { status: 201, data }
    }
}

/// A custom routable action declared by a ViewSet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraAction {
    pub name: String,
    /// First line of the action's documentation, if any
    pub description: Option<String>,
    /// Detail-scoped actions operate on a single object and need an id
    pub detail: bool,
    pub methods: Vec<&'static str>,
}

impl ExtraAction {
    pub fn new(name: impl Into<String>, detail: bool, methods: &[&'static str]) -> Self {
        Self {
            name: name.into(),
            description: None,
            detail,
            methods: methods.to_vec(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Description used in the tool catalog.
    pub fn summary(&self) -> String {
        self.description
            .as_deref()
            .and_then(|doc| doc.trim().lines().next())
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Custom action: {}", self.name))
    }
}

/// CRUD handler bundle for one entity type.
pub trait ViewSet: Send + Sync {
    /// Type name of the ViewSet (e.g. `UserViewSet`).
    fn name(&self) -> &str;

    /// Model served by the ViewSet's queryset.
    fn queryset_model(&self) -> Option<&str> {
        None
    }

    /// Explicitly declared model, used when there is no queryset.
    fn model(&self) -> Option<&str> {
        None
    }

    /// URL prefix the ViewSet is routed under in the REST API.
    fn route_prefix(&self) -> String {
        format!("{}s", model_name(self).to_lowercase())
    }

    /// Whether a standard action is implemented.
    fn supports(&self, _action: &Action) -> bool {
        true
    }

    fn extra_actions(&self) -> Vec<ExtraAction> {
        Vec::new()
    }

    /// Serializer fields used for `action`.
    fn serializer_fields(&self, action: &Action) -> Result<Vec<FieldSpec>>;

    fn handle(&self, call: &ActionCall) -> Result<Payload>;
}

/// Resolves the model name: queryset model, then explicit model, then the
/// ViewSet name without its `ViewSet` suffix.
pub fn model_name<V: ViewSet + ?Sized>(viewset: &V) -> String {
    viewset
        .queryset_model()
        .or_else(|| viewset.model())
        .map(str::to_string)
        .unwrap_or_else(|| viewset.name().replace("ViewSet", ""))
}

/// Looks up an extra action by name.
pub fn find_extra_action<V: ViewSet + ?Sized>(viewset: &V, name: &str) -> Option<ExtraAction> {
    viewset.extra_actions().into_iter().find(|a| a.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bare;

    impl ViewSet for Bare {
        fn name(&self) -> &str {
            "ArticleViewSet"
        }

        fn serializer_fields(&self, _action: &Action) -> Result<Vec<FieldSpec>> {
            Ok(Vec::new())
        }

        fn handle(&self, _call: &ActionCall) -> Result<Payload> {
            Ok(Payload::Empty)
        }
    }

    struct Explicit;

    impl ViewSet for Explicit {
        fn name(&self) -> &str {
            "Whatever"
        }

        fn model(&self) -> Option<&str> {
            Some("Order")
        }

        fn serializer_fields(&self, _action: &Action) -> Result<Vec<FieldSpec>> {
            Ok(Vec::new())
        }

        fn handle(&self, _call: &ActionCall) -> Result<Payload> {
            Ok(Payload::Empty)
        }
    }

    #[test]
    fn test_model_name_fallbacks() {
        assert_eq!(model_name(&Bare), "Article");
        assert_eq!(model_name(&Explicit), "Order");
        assert_eq!(Bare.route_prefix(), "articles");
    }

    #[test]
    fn test_action_parse_and_title() {
        assert_eq!(Action::parse("list"), Action::List);
        assert_eq!(Action::parse("activate"), Action::Extra("activate".into()));
        assert_eq!(Action::Destroy.title(), "Destroy");
        assert_eq!(Action::Extra("active".into()).title(), "Active");
    }

    #[test]
    fn test_extra_action_summary() {
        let action = ExtraAction::new("active", false, &["get"]).describe("Get only active users\nMore.");
        assert_eq!(action.summary(), "Get only active users");

        let action = ExtraAction::new("archive", true, &["post"]);
        assert_eq!(action.summary(), "Custom action: archive");
    }
}
