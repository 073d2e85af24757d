use std::{collections::BTreeMap, sync::Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use rig_model::{ClusterEntity, WorkloadRef, WorkloadSnapshot};

use crate::{
    client::{
        ClientError, ClusterClient, SnapshotEvent, SnapshotSender, SnapshotStream, WATCH_BUFFER,
    },
    context::OpContext,
    testkit::{CallJournal, lock},
};

/// In-memory cluster with live watch subscriptions.
#[derive(Default)]
pub struct FakeClusterClient {
    workloads: Mutex<BTreeMap<(String, String), WorkloadSnapshot>>,
    watchers: Mutex<Vec<(WorkloadRef, SnapshotSender)>>,
    watch_started: Notify,
    preloaded: Mutex<Vec<SnapshotEvent>>,
    deleted: Mutex<Vec<Vec<ClusterEntity>>>,
    delete_error: Mutex<Option<String>>,
    journal: Option<CallJournal>,
}

impl FakeClusterClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record calls into a shared journal.
    pub fn with_journal(mut self, journal: CallJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Store a workload without notifying watchers.
    pub fn add_workload(&self, snapshot: WorkloadSnapshot) {
        lock(&self.workloads).insert(key(&snapshot.reference()), snapshot);
    }

    /// Store a workload and deliver it to every live watcher of that workload.
    pub fn update_workload(&self, snapshot: WorkloadSnapshot) {
        let reference = snapshot.reference();
        lock(&self.workloads).insert(key(&reference), snapshot.clone());

        let mut watchers = lock(&self.watchers);
        watchers.retain(|(_, tx)| !tx.is_closed());
        for (watched, tx) in watchers.iter() {
            if *watched == reference {
                let _ = tx.try_send(Ok(snapshot.clone()));
            }
        }
    }

    /// Queue `event` onto the next subscription before `watch_workload` returns,
    /// as if the change happened while the watch was being opened.
    pub fn preload_watch(&self, event: SnapshotEvent) {
        lock(&self.preloaded).push(event);
    }

    /// Resolves once a watch has been opened (immediately if one was opened earlier
    /// and not yet awaited).
    pub async fn watch_started(&self) {
        self.watch_started.notified().await;
    }

    /// Number of subscriptions whose consumer is still alive.
    pub fn live_watches(&self) -> usize {
        lock(&self.watchers)
            .iter()
            .filter(|(_, tx)| !tx.is_closed())
            .count()
    }

    /// Drop every producer, ending all open streams.
    pub fn close_watches(&self) {
        lock(&self.watchers).clear();
    }

    /// Make every following `delete` fail with `msg`.
    pub fn fail_deletes(&self, msg: impl Into<String>) {
        *lock(&self.delete_error) = Some(msg.into());
    }

    /// Entity sets passed to each `delete` call, in call order.
    pub fn delete_calls(&self) -> Vec<Vec<ClusterEntity>> {
        lock(&self.deleted).clone()
    }

    /// Names of every entity passed to `delete`.
    pub fn deleted_names(&self) -> Vec<String> {
        lock(&self.deleted)
            .iter()
            .flatten()
            .map(|e| e.name().to_string())
            .collect()
    }
}

fn key(reference: &WorkloadRef) -> (String, String) {
    (reference.namespace.clone(), reference.name.clone())
}

#[async_trait]
impl ClusterClient for FakeClusterClient {
    fn name(&self) -> &'static str {
        "fake-cluster"
    }

    async fn get_workload(
        &self,
        _ctx: &OpContext,
        workload: &WorkloadRef,
    ) -> Result<WorkloadSnapshot, ClientError> {
        lock(&self.workloads)
            .get(&key(workload))
            .cloned()
            .ok_or_else(|| ClientError::NotFound(workload.to_string()))
    }

    async fn list_workloads(
        &self,
        _ctx: &OpContext,
        namespace: &str,
    ) -> Result<Vec<WorkloadSnapshot>, ClientError> {
        Ok(lock(&self.workloads)
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, s)| s.clone())
            .collect())
    }

    async fn watch_workload(
        &self,
        _ctx: &OpContext,
        workload: &WorkloadRef,
    ) -> Result<SnapshotStream, ClientError> {
        let (tx, stream) = SnapshotStream::channel(WATCH_BUFFER);
        for event in lock(&self.preloaded).drain(..) {
            let _ = tx.try_send(event);
        }
        lock(&self.watchers).push((workload.clone(), tx));
        self.watch_started.notify_one();
        Ok(stream)
    }

    async fn delete(&self, _ctx: &OpContext, entities: &[ClusterEntity]) -> Result<(), ClientError> {
        if let Some(journal) = &self.journal {
            journal.record(format!("cluster.delete({})", entities.len()));
        }
        if let Some(msg) = lock(&self.delete_error).clone() {
            return Err(ClientError::Backend(msg));
        }
        lock(&self.deleted).push(entities.to_vec());
        Ok(())
    }
}
