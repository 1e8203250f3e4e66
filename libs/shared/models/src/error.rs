use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum AppError {
    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Internal Error: {0}")]
    Internal(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl AppError {
    /// Whether the user can fix the input and try again without anything else changing.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::BadRequest(_) | AppError::ValidationError(_) | AppError::Conflict(_))
    }

    /// Emit the error at a level that matches its severity.
    pub fn log(&self) {
        match self {
            AppError::Internal(msg) => tracing::error!("Error: {}", msg),
            other => tracing::warn!("Error: {}", other),
        }
    }
}
