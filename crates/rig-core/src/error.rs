use thiserror::Error;

use rig_model::{ManifestName, ModelError};

use crate::{client::ClientError, context::ContextError};

#[derive(Debug, Error)]
pub enum CoreError {
    /// The container reached a state it cannot recover from.
    #[error("Container will never be ready: {0}")]
    NeverReady(String),

    #[error("container watch closed before {0} became ready")]
    WatchClosed(String),

    #[error("watching workload: {0}")]
    Watch(#[source] ClientError),

    #[error("listing workloads: {0}")]
    List(#[source] ClientError),

    #[error("deleting cluster entities: {0}")]
    ClusterDelete(#[source] ClientError),

    #[error("running compose down for project '{project}': {source}")]
    ComposeDown {
        project: String,
        #[source]
        source: ClientError,
    },

    #[error("parsing manifest '{name}': {source}")]
    Manifest {
        name: ManifestName,
        #[source]
        source: ModelError,
    },

    #[error("operation aborted: {0}")]
    Context(#[from] ContextError),
}

impl CoreError {
    /// Returns `true` if the error was caused by cancellation or an elapsed deadline,
    /// either directly or through a client call.
    pub fn is_cancellation(&self) -> bool {
        match self {
            CoreError::Context(_) => true,
            CoreError::Watch(e) | CoreError::List(e) | CoreError::ClusterDelete(e) => {
                e.is_cancellation()
            }
            CoreError::ComposeDown { source, .. } => source.is_cancellation(),
            _ => false,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
