//! Backend capabilities consumed by the core.
//!
//! Implementations live outside this crate (see `rig-exec`); the core only needs
//! the narrow surface declared here.
mod error;
pub use error::ClientError;

mod stream;
pub use stream::{SnapshotEvent, SnapshotSender, SnapshotStream, WATCH_BUFFER};

use std::path::PathBuf;

use async_trait::async_trait;
use rig_model::{ClusterEntity, WorkloadRef, WorkloadSnapshot};

use crate::context::OpContext;

/// Access to the cluster control plane.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Backend name used in logs.
    fn name(&self) -> &'static str;

    /// Current snapshot of one workload.
    async fn get_workload(
        &self,
        ctx: &OpContext,
        workload: &WorkloadRef,
    ) -> Result<WorkloadSnapshot, ClientError>;

    /// Current snapshots of all workloads in a namespace.
    async fn list_workloads(
        &self,
        ctx: &OpContext,
        namespace: &str,
    ) -> Result<Vec<WorkloadSnapshot>, ClientError>;

    /// Subscribe to changes of one workload.
    ///
    /// Implementations must be delivering before this returns: any change made
    /// after the call completes has to show up on the stream. A backend failure
    /// after subscribing is delivered as an `Err` event.
    async fn watch_workload(
        &self,
        ctx: &OpContext,
        workload: &WorkloadRef,
    ) -> Result<SnapshotStream, ClientError>;

    /// Delete the given entities in one request. Missing entities are not an error.
    async fn delete(&self, ctx: &OpContext, entities: &[ClusterEntity]) -> Result<(), ClientError>;
}

/// Access to the local compose backend.
#[async_trait]
pub trait ComposeClient: Send + Sync {
    fn name(&self) -> &'static str;

    /// Bring down a compose project described by `config_paths`.
    async fn down(
        &self,
        ctx: &OpContext,
        project: &str,
        config_paths: &[PathBuf],
    ) -> Result<(), ClientError>;
}
