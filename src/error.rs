use thiserror::Error;

use crate::serializer::ValidationErrors;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("{entity} with ID {id} not found")]
    NotFound { entity: String, id: String },

    #[error("Missing required parameter '{param}' for action '{action}'")]
    MissingParameter { param: String, action: String },

    #[error("Invalid tool name format: {0}")]
    InvalidToolName(String),

    #[error("ViewSet not found for {app}.{model}")]
    ViewSetNotFound { app: String, model: String },

    #[error("Unsupported action: {0}")]
    UnsupportedAction(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Handler panicked: {0}")]
    Internal(String),

    #[error("Store lock poisoned")]
    LockPoisoned,

    #[error("Transport error: {0}")]
    Transport(String),
}

impl BridgeError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn missing_parameter(param: impl Into<String>, action: impl Into<String>) -> Self {
        Self::MissingParameter {
            param: param.into(),
            action: action.into(),
        }
    }
}

impl From<ValidationErrors> for BridgeError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
