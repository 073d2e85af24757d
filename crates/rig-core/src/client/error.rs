use thiserror::Error;

use crate::context::ContextError;

/// Failure reported by a cluster or compose backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Backend-reported failure, message kept verbatim.
    #[error("{0}")]
    Backend(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with {status}: {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Context(#[from] ContextError),
}

impl ClientError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ClientError::Context(_))
    }
}
