//! Subprocess-backed implementations of the cluster and compose clients.
//!
//! - [`KubectlClient`]: [`rig_core::ClusterClient`] over the `kubectl` binary.
//! - [`ComposeCli`]: [`rig_core::ComposeClient`] over `docker compose`.
mod error;
pub use error::ExecError;

mod command;
pub use command::CommandLine;

pub mod compose;
pub use compose::{ComposeCli, ComposeConfig};

pub mod kubectl;
pub use kubectl::{KubectlClient, KubectlConfig};
