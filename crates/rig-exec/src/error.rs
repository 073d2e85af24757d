use thiserror::Error;

/// Errors raised while setting up a subprocess-backed client.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}
