pub mod client;
pub mod context;
pub mod error;
pub mod readiness;
pub mod teardown;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

pub use client::{
    ClientError, ClusterClient, ComposeClient, SnapshotEvent, SnapshotSender, SnapshotStream,
};
pub use context::{ContextError, OpContext};
pub use error::{CoreError, CoreResult};
pub use readiness::{Readiness, wait_for_container_ready, workloads_with_image};
pub use teardown::{TearDown, TeardownPlan};

pub mod prelude {
    pub use crate::client::{ClientError, ClusterClient, ComposeClient};
    pub use crate::context::OpContext;
    pub use crate::error::CoreError;
    pub use crate::readiness::wait_for_container_ready;
    pub use crate::teardown::TearDown;
}
