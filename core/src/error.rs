use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("could not write field '{field}': {message}")]
    FieldWrite { field: String, message: String },

    #[error("could not attach file '{path}': {message}")]
    Attachment { path: String, message: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("launch error: {0}")]
    Launch(String),

    #[error("workflow transition error: {0}")]
    WorkflowTransition(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
