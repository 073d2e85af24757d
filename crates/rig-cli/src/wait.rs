use anyhow::{Context, bail};
use tracing::info;

use rig_core::{ClusterClient, OpContext, wait_for_container_ready, workloads_with_image};
use rig_model::{ContainerStatus, ImageRef, WorkloadRef, WorkloadSnapshot};

/// Find the workload to watch: by name when given, otherwise the first one running `image`.
pub async fn locate(
    ctx: &OpContext,
    client: &dyn ClusterClient,
    namespace: &str,
    workload: Option<&str>,
    image: &ImageRef,
) -> anyhow::Result<WorkloadSnapshot> {
    if let Some(name) = workload {
        let reference = WorkloadRef::new(namespace, name);
        return client
            .get_workload(ctx, &reference)
            .await
            .with_context(|| format!("looking up workload {reference}"));
    }

    let found = workloads_with_image(ctx, client, namespace, image).await?;
    match found.into_iter().next() {
        Some(w) => Ok(w),
        None => bail!("no workload in namespace '{namespace}' runs {image}"),
    }
}

pub async fn run(
    ctx: &OpContext,
    client: &dyn ClusterClient,
    namespace: &str,
    workload: Option<&str>,
    image: &str,
) -> anyhow::Result<ContainerStatus> {
    let image: ImageRef = image
        .parse()
        .with_context(|| format!("invalid image reference '{image}'"))?;
    let snapshot = locate(ctx, client, namespace, workload, &image).await?;

    let status = wait_for_container_ready(ctx, client, &snapshot, &image).await?;
    info!(workload = %snapshot.reference(), image = %image, "container ready");
    Ok(status)
}
