//! Waiting for a scheduled container to become ready.
//!
//! The watcher subscribes to workload changes *before* it looks at the snapshot it
//! was handed, so an update landing between the two cannot be missed. If that
//! snapshot is already ready it returns without consuming an event; otherwise it
//! evaluates each delivered snapshot until a terminal state or the context ends.
use rig_model::{ContainerStatus, ImageRef, WorkloadSnapshot};
use tracing::{debug, instrument, trace};

use crate::{client::ClusterClient, context::OpContext, error::CoreError};

/// Phases after which no container of the workload will run again.
const FINISHED_PHASES: [&str; 2] = ["Succeeded", "Failed"];

/// Outcome of evaluating one snapshot that did not end in failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// Keep waiting.
    Pending,
    /// The container of interest is ready.
    Ready(ContainerStatus),
}

/// Block until the container running `image` in `workload` is ready.
///
/// Fails with [`CoreError::NeverReady`] when the container terminates or the
/// workload is unschedulable, with [`CoreError::Context`] when `ctx` is cancelled
/// or its deadline elapses, with [`CoreError::Watch`] when the subscription
/// fails, and with [`CoreError::WatchClosed`] if it ends quietly first. The
/// subscription is dropped on every return path.
#[instrument(
    level = "debug",
    skip_all,
    fields(workload = %workload.reference(), image = %image)
)]
pub async fn wait_for_container_ready(
    ctx: &OpContext,
    client: &dyn ClusterClient,
    workload: &WorkloadSnapshot,
    image: &ImageRef,
) -> Result<ContainerStatus, CoreError> {
    if let Some(err) = ctx.err() {
        return Err(err.into());
    }

    let mut watch = client
        .watch_workload(ctx, &workload.reference())
        .await
        .map_err(CoreError::Watch)?;

    if let Readiness::Ready(status) = evaluate(workload, image)? {
        debug!("container already ready");
        return Ok(status);
    }

    loop {
        let snapshot = tokio::select! {
            biased;
            err = ctx.done() => {
                debug!(reason = %err, "stopped waiting for container");
                return Err(err.into());
            }
            next = watch.next() => match next {
                Some(Ok(snapshot)) => snapshot,
                Some(Err(e)) => return Err(CoreError::Watch(e)),
                None => return Err(CoreError::WatchClosed(image.to_string())),
            },
        };

        match evaluate(&snapshot, image)? {
            Readiness::Ready(status) => {
                debug!("container became ready");
                return Ok(status);
            }
            Readiness::Pending => trace!("container not ready yet"),
        }
    }
}

/// Classify one snapshot for the container running `image`.
///
/// Checked in order: workload unschedulable, workload finished, container
/// terminated, container ready. Otherwise a snapshot without a matching container
/// is [`Readiness::Pending`].
pub fn evaluate(snapshot: &WorkloadSnapshot, image: &ImageRef) -> Result<Readiness, CoreError> {
    if let Some(msg) = snapshot.unschedulable() {
        return Err(CoreError::NeverReady(msg.to_string()));
    }

    // a workload can fail or be evicted before any container status is reported
    if let Some(phase) = snapshot
        .status
        .phase
        .as_deref()
        .filter(|p| FINISHED_PHASES.contains(p))
    {
        return Err(CoreError::NeverReady(format!(
            "container {image} exited, workload phase is {phase}"
        )));
    }

    let Some(status) = container_matching(snapshot, image) else {
        return Ok(Readiness::Pending);
    };

    if let Some(terminated) = &status.state.terminated {
        return Err(CoreError::NeverReady(format!(
            "container {image} terminated (exit code {})",
            terminated.exit_code
        )));
    }

    trace!(state = status.state.as_str(), ready = status.ready, "container status");
    if status.ready {
        Ok(Readiness::Ready(status.clone()))
    } else {
        Ok(Readiness::Pending)
    }
}

/// First container status whose reported image equals `image`.
///
/// Statuses with an image that does not parse are skipped.
pub fn container_matching<'a>(
    snapshot: &'a WorkloadSnapshot,
    image: &ImageRef,
) -> Option<&'a ContainerStatus> {
    snapshot.container_statuses().iter().find(|status| {
        match ImageRef::parse(&status.image) {
            Ok(reported) => reported == *image,
            Err(e) => {
                debug!(image = %status.image, error = %e, "skipping container with unparseable image");
                false
            }
        }
    })
}

/// Workloads in `namespace` that run or declare a container with `image`.
#[instrument(level = "debug", skip_all, fields(namespace = %namespace, image = %image))]
pub async fn workloads_with_image(
    ctx: &OpContext,
    client: &dyn ClusterClient,
    namespace: &str,
    image: &ImageRef,
) -> Result<Vec<WorkloadSnapshot>, CoreError> {
    if let Some(err) = ctx.err() {
        return Err(err.into());
    }

    let workloads = client
        .list_workloads(ctx, namespace)
        .await
        .map_err(CoreError::List)?;

    let matches = |reported: &str| ImageRef::parse(reported).is_ok_and(|r| r == *image);
    let found: Vec<_> = workloads
        .into_iter()
        .filter(|w| {
            w.container_statuses().iter().any(|s| matches(&s.image))
                || w.spec.containers.iter().any(|c| matches(&c.image))
        })
        .collect();

    debug!(count = found.len(), "workloads running image");
    Ok(found)
}
