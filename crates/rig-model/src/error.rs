use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid image reference '{reference}': {reason}")]
    InvalidImageRef { reference: String, reason: String },

    #[error("invalid container id '{0}': missing runtime scheme")]
    InvalidContainerId(String),

    #[error("malformed cluster document: {0}")]
    MalformedDocument(String),

    #[error("cluster object is missing field: {0}")]
    MissingField(&'static str),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ModelResult<T> = Result<T, ModelError>;
