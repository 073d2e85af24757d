use std::{sync::Arc, time::Duration};

use rig_core::{
    ClientError, CoreError, OpContext, testkit::FakeClusterClient, wait_for_container_ready,
    workloads_with_image,
};
use rig_model::{
    ContainerState, ContainerStatus, ImageRef, WorkloadCondition, WorkloadSnapshot,
};
use tokio::task::JoinHandle;

const BLORG_DEV_IMG: &str = "gcr.io/blorg-dev/blorg-backend:devel-nick";
const POD_NAME: &str = "blorg-be-7d8f9c6b5-x2x2x";

struct Fixture {
    client: Arc<FakeClusterClient>,
    image: ImageRef,
}

impl Fixture {
    fn new() -> Self {
        let image: ImageRef = BLORG_DEV_IMG.parse().unwrap();
        let client = Arc::new(FakeClusterClient::new());
        client.add_workload(fake_pod(BLORG_DEV_IMG));
        Self { client, image }
    }

    fn ctx(&self) -> OpContext {
        OpContext::new().with_timeout(Duration::from_secs(1))
    }

    async fn pod(&self) -> WorkloadSnapshot {
        let pods = workloads_with_image(&OpContext::new(), self.client.as_ref(), "default", &self.image)
            .await
            .unwrap();
        assert_eq!(pods.len(), 1);
        pods.into_iter().next().unwrap()
    }

    fn spawn_wait(
        &self,
        ctx: OpContext,
        pod: WorkloadSnapshot,
    ) -> JoinHandle<Result<ContainerStatus, CoreError>> {
        let client = self.client.clone();
        let image = self.image.clone();
        tokio::spawn(async move { wait_for_container_ready(&ctx, client.as_ref(), &pod, &image).await })
    }
}

fn fake_pod(image: &str) -> WorkloadSnapshot {
    WorkloadSnapshot::new("default", POD_NAME)
        .with_container("blorg-backend", image)
        .with_phase("Pending")
}

fn ready_status(image: &ImageRef) -> ContainerStatus {
    ContainerStatus::new(image.to_string())
        .with_container_id("docker://container-id")
        .with_ready(true)
        .with_state(ContainerState::running())
}

#[tokio::test]
async fn already_alive_resolves_without_waiting() {
    let f = Fixture::new();
    f.client
        .add_workload(fake_pod(BLORG_DEV_IMG).with_container_status(ready_status(&f.image)));
    let pod = f.pod().await;

    let status = wait_for_container_ready(&f.ctx(), f.client.as_ref(), &pod, &f.image)
        .await
        .unwrap();

    let id = status.container_id().unwrap().unwrap();
    assert_eq!(id.to_string(), "container-id");
    assert_eq!(f.client.live_watches(), 0);
}

#[tokio::test]
async fn ready_update_resolves_wait() {
    let f = Fixture::new();
    let pod = f.pod().await;
    let wait = f.spawn_wait(f.ctx(), pod);

    f.client.watch_started().await;
    f.client
        .update_workload(fake_pod(BLORG_DEV_IMG).with_container_status(ready_status(&f.image)));

    let status = wait.await.unwrap().unwrap();
    assert!(status.ready);
    assert_eq!(f.client.live_watches(), 0);
}

#[tokio::test]
async fn non_matching_updates_do_not_resolve() {
    let f = Fixture::new();
    let pod = f.pod().await;
    let wait = f.spawn_wait(f.ctx(), pod);

    f.client.watch_started().await;
    // sidecar with another image, terminated: must be ignored
    f.client.update_workload(
        fake_pod(BLORG_DEV_IMG).with_container_status(
            ContainerStatus::new("gcr.io/blorg-dev/log-shipper:v1")
                .with_state(ContainerState::terminated(1)),
        ),
    );
    // matching container still starting
    f.client.update_workload(
        fake_pod(BLORG_DEV_IMG).with_container_status(
            ContainerStatus::new(BLORG_DEV_IMG).with_state(ContainerState::waiting("ContainerCreating")),
        ),
    );
    f.client.update_workload(
        fake_pod(BLORG_DEV_IMG).with_container_status(
            ContainerStatus::new(BLORG_DEV_IMG)
                .with_container_id("docker://container-id")
                .with_state(ContainerState::running()),
        ),
    );
    f.client
        .update_workload(fake_pod(BLORG_DEV_IMG).with_container_status(ready_status(&f.image)));

    let status = wait.await.unwrap().unwrap();
    assert!(status.ready);
}

#[tokio::test]
async fn terminated_container_fails() {
    let f = Fixture::new();
    let pod = f.pod().await;
    let wait = f.spawn_wait(f.ctx(), pod);

    f.client.watch_started().await;
    f.client.update_workload(
        fake_pod(BLORG_DEV_IMG).with_container_status(
            ContainerStatus::new(f.image.to_string()).with_state(ContainerState::terminated(0)),
        ),
    );

    let err = wait.await.unwrap().unwrap_err();
    let expected = "Container will never be ready";
    assert!(
        err.to_string().contains(expected),
        "expected error {expected:?}, actual: {err}"
    );
    assert!(!err.is_cancellation());
}

#[tokio::test]
async fn unschedulable_workload_fails_with_scheduler_message() {
    let f = Fixture::new();
    let pod = f.pod().await;
    let wait = f.spawn_wait(f.ctx(), pod);

    f.client.watch_started().await;
    f.client.update_workload(
        fake_pod(BLORG_DEV_IMG)
            .with_condition(WorkloadCondition::unschedulable("0/4 nodes are available: 4 Insufficient cpu.")),
    );

    let err = wait.await.unwrap().unwrap_err();
    let expected = "Container will never be ready: 0/4 nodes are available: 4 Insufficient cpu.";
    assert!(
        err.to_string().contains(expected),
        "expected error {expected:?}, actual: {err}"
    );
}

#[tokio::test]
async fn external_cancel_unblocks_wait() {
    let f = Fixture::new();
    let pod = f.pod().await;
    let ctx = OpContext::new();
    let wait = f.spawn_wait(ctx.clone(), pod);

    f.client.watch_started().await;
    ctx.cancel();

    let err = wait.await.unwrap().unwrap_err();
    assert!(err.is_cancellation());
    assert_eq!(f.client.live_watches(), 0);
}

#[tokio::test]
async fn closed_watch_is_reported() {
    let f = Fixture::new();
    let pod = f.pod().await;
    let wait = f.spawn_wait(f.ctx(), pod);

    f.client.watch_started().await;
    f.client.close_watches();

    let err = wait.await.unwrap().unwrap_err();
    assert!(matches!(err, CoreError::WatchClosed(_)));
}

#[tokio::test]
async fn update_landing_while_subscribing_is_seen() {
    let f = Fixture::new();
    let pod = f.pod().await;
    f.client.preload_watch(Ok(
        fake_pod(BLORG_DEV_IMG).with_container_status(ready_status(&f.image)),
    ));

    // nothing is pushed after the watch opens
    let status = wait_for_container_ready(&f.ctx(), f.client.as_ref(), &pod, &f.image)
        .await
        .unwrap();
    assert!(status.ready);
}

#[tokio::test]
async fn already_alive_consumes_no_event() {
    let f = Fixture::new();
    f.client
        .add_workload(fake_pod(BLORG_DEV_IMG).with_container_status(ready_status(&f.image)));
    let pod = f.pod().await;
    f.client.preload_watch(Ok(fake_pod(BLORG_DEV_IMG).with_container_status(
        ContainerStatus::new(BLORG_DEV_IMG).with_state(ContainerState::terminated(1)),
    )));

    let status = wait_for_container_ready(&f.ctx(), f.client.as_ref(), &pod, &f.image)
        .await
        .unwrap();
    assert_eq!(status.container_id().unwrap().unwrap().to_string(), "container-id");
}

#[tokio::test]
async fn watch_failure_keeps_backend_message() {
    let f = Fixture::new();
    let pod = f.pod().await;
    f.client.preload_watch(Err(ClientError::Backend(
        "Error from server (Forbidden): pods is forbidden".into(),
    )));

    let err = wait_for_container_ready(&f.ctx(), f.client.as_ref(), &pod, &f.image)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Watch(ClientError::Backend(_))));
    assert!(err.to_string().contains("Forbidden"), "actual: {err}");
    assert!(!err.is_cancellation());
}
