use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Catalog entry advertising one callable tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Result of executing a tool. Both variants are delivered to the client as
/// successful RPC results; a fault only changes the text and the error flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    Ok(String),
    Fault(String),
}

impl ToolOutcome {
    pub fn text(&self) -> &str {
        match self {
            ToolOutcome::Ok(text) | ToolOutcome::Fault(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            ToolOutcome::Ok(text) | ToolOutcome::Fault(text) => text,
        }
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, ToolOutcome::Fault(_))
    }
}

/// A tool that is called directly by name, bypassing ViewSet dispatch.
pub trait Tool: Send + Sync {
    fn descriptor(&self) -> ToolDescriptor;

    fn call(&self, arguments: Map<String, Value>) -> ToolOutcome;
}

type ToolFn = Box<dyn Fn(Map<String, Value>) -> ToolOutcome + Send + Sync>;

/// A [`Tool`] backed by a closure.
pub struct FnTool {
    descriptor: ToolDescriptor,
    handler: ToolFn,
}

impl FnTool {
    pub fn new<F>(descriptor: ToolDescriptor, handler: F) -> Self
    where
        F: Fn(Map<String, Value>) -> ToolOutcome + Send + Sync + 'static,
    {
        Self {
            descriptor,
            handler: Box::new(handler),
        }
    }
}

impl Tool for FnTool {
    fn descriptor(&self) -> ToolDescriptor {
        self.descriptor.clone()
    }

    fn call(&self, arguments: Map<String, Value>) -> ToolOutcome {
        (self.handler)(arguments)
    }
}
