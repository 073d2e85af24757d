//! Selective teardown of resources this tool created.
//!
//! Manifests are partitioned by deploy target. Cluster entities are flattened and
//! filtered down to those carrying the ownership marker, then deleted in a single
//! request; compose projects are brought down one by one. Dispatch is sequential
//! and fail-fast, cluster first, then compose. Nothing is rolled back.
use std::sync::Arc;

use rig_model::{ClusterEntity, ComposeTarget, DeployTarget, LabelPair, Manifest, managed_by_marker};
use tracing::{debug, info, instrument, trace};

use crate::{
    client::{ClusterClient, ComposeClient},
    context::OpContext,
    error::CoreError,
};

/// What a teardown pass is going to do, computed before any backend is called.
#[derive(Debug, Default)]
pub struct TeardownPlan<'a> {
    /// Owned entities across every cluster manifest; `None` if there were no cluster manifests.
    cluster: Option<Vec<ClusterEntity>>,
    /// Entities left alone because they lack the ownership marker.
    skipped: Vec<ClusterEntity>,
    /// Compose projects in manifest order.
    compose: Vec<&'a ComposeTarget>,
}

impl<'a> TeardownPlan<'a> {
    /// Partition manifests and filter cluster entities by `marker`.
    pub fn build(manifests: &'a [Manifest], marker: &LabelPair) -> Result<Self, CoreError> {
        let mut plan = TeardownPlan::default();

        for manifest in manifests {
            match &manifest.deploy_target {
                DeployTarget::Cluster(target) => {
                    let entities = target.entities().map_err(|source| CoreError::Manifest {
                        name: manifest.name.clone(),
                        source,
                    })?;
                    let owned = plan.cluster.get_or_insert_with(Vec::new);
                    for entity in entities {
                        if entity.has_label(marker) {
                            owned.push(entity);
                        } else {
                            trace!(manifest = %manifest.name, entity = %entity, "entity not owned, skipping");
                            plan.skipped.push(entity);
                        }
                    }
                }
                DeployTarget::Compose(target) => plan.compose.push(target),
            }
        }
        Ok(plan)
    }

    /// Entities that will be passed to the cluster delete, if a delete is issued.
    pub fn owned_entities(&self) -> Option<&[ClusterEntity]> {
        self.cluster.as_deref()
    }

    pub fn skipped_entities(&self) -> &[ClusterEntity] {
        &self.skipped
    }

    pub fn compose_targets(&self) -> &[&'a ComposeTarget] {
        &self.compose
    }

    /// Returns `true` if no backend call would be made.
    pub fn is_empty(&self) -> bool {
        self.cluster.is_none() && self.compose.is_empty()
    }
}

/// Teardown coordinator over a cluster and a compose backend.
pub struct TearDown {
    cluster: Arc<dyn ClusterClient>,
    compose: Arc<dyn ComposeClient>,
    marker: LabelPair,
}

impl TearDown {
    /// Create a coordinator that deletes entities carrying the standard ownership marker.
    pub fn new(cluster: Arc<dyn ClusterClient>, compose: Arc<dyn ComposeClient>) -> Self {
        Self {
            cluster,
            compose,
            marker: managed_by_marker(),
        }
    }

    /// Build the plan for `manifests` without touching any backend.
    pub fn plan<'a>(&self, manifests: &'a [Manifest]) -> Result<TeardownPlan<'a>, CoreError> {
        TeardownPlan::build(manifests, &self.marker)
    }

    /// Delete everything this tool created for `manifests`.
    ///
    /// Returns the first backend error, wrapped with the backend it came from.
    /// Deletions issued before the failure stay in effect.
    #[instrument(level = "debug", skip_all, fields(manifests = manifests.len()))]
    pub async fn tear_down(&self, ctx: &OpContext, manifests: &[Manifest]) -> Result<(), CoreError> {
        let plan = self.plan(manifests)?;
        if plan.is_empty() {
            debug!("nothing to tear down");
            return Ok(());
        }

        if let Some(owned) = plan.owned_entities() {
            self.delete_owned(ctx, owned, plan.skipped_entities().len())
                .await?;
        }
        for target in plan.compose_targets() {
            self.compose_down(ctx, target).await?;
        }

        info!(
            deleted = plan.owned_entities().map_or(0, <[_]>::len),
            skipped = plan.skipped_entities().len(),
            compose_projects = plan.compose_targets().len(),
            "teardown complete"
        );
        Ok(())
    }

    async fn delete_owned(
        &self,
        ctx: &OpContext,
        owned: &[ClusterEntity],
        skipped: usize,
    ) -> Result<(), CoreError> {
        if let Some(err) = ctx.err() {
            return Err(err.into());
        }
        debug!(
            backend = self.cluster.name(),
            owned = owned.len(),
            skipped,
            "deleting owned cluster entities"
        );
        self.cluster
            .delete(ctx, owned)
            .await
            .map_err(CoreError::ClusterDelete)
    }

    async fn compose_down(&self, ctx: &OpContext, target: &ComposeTarget) -> Result<(), CoreError> {
        if let Some(err) = ctx.err() {
            return Err(err.into());
        }
        debug!(
            backend = self.compose.name(),
            project = %target.project,
            configs = target.config_paths.len(),
            "bringing down compose project"
        );
        self.compose
            .down(ctx, &target.project, &target.config_paths)
            .await
            .map_err(|source| CoreError::ComposeDown {
                project: target.project.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use rig_model::{ClusterTarget, ComposeTarget};

    use super::*;
    use crate::testkit::{CallJournal, FakeClusterClient, FakeComposeClient};

    fn entity(kind: &str, name: &str, labels: &[(&str, &str)]) -> serde_json::Value {
        let labels: serde_json::Map<_, _> = labels
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::from(*v)))
            .collect();
        serde_json::json!({"kind": kind, "metadata": {"name": name, "labels": labels}})
    }

    fn cluster_manifest(name: &str, objects: Vec<serde_json::Value>) -> Manifest {
        Manifest::new(
            name,
            ClusterTarget::new(serde_json::Value::Array(objects).to_string()),
        )
    }

    fn fixture() -> (Arc<FakeClusterClient>, Arc<FakeComposeClient>, TearDown) {
        let cluster = Arc::new(FakeClusterClient::new());
        let compose = Arc::new(FakeComposeClient::new());
        let td = TearDown::new(cluster.clone(), compose.clone());
        (cluster, compose, td)
    }

    const OWNED: (&str, &str) = ("app.kubernetes.io/managed-by", "rig");

    #[test]
    fn plan_partitions_and_filters() {
        let manifests = vec![
            cluster_manifest(
                "a",
                vec![entity("Deployment", "a", &[OWNED]), entity("Service", "a", &[])],
            ),
            Manifest::new("fe", ComposeTarget::new("fe", ["dc.yaml"])),
            cluster_manifest("b", vec![entity("ConfigMap", "b", &[OWNED])]),
        ];
        let plan = TeardownPlan::build(&manifests, &managed_by_marker()).unwrap();

        let owned: Vec<_> = plan
            .owned_entities()
            .unwrap()
            .iter()
            .map(|e| format!("{}/{}", e.kind(), e.name()))
            .collect();
        assert_eq!(owned, vec!["Deployment/a", "ConfigMap/b"]);
        assert_eq!(plan.skipped_entities().len(), 1);
        assert_eq!(plan.compose_targets().len(), 1);
    }

    #[test]
    fn plan_rejects_marker_with_wrong_value() {
        let manifests = vec![cluster_manifest(
            "a",
            vec![entity("Deployment", "a", &[("app.kubernetes.io/managed-by", "helm")])],
        )];
        let plan = TeardownPlan::build(&manifests, &managed_by_marker()).unwrap();
        assert_eq!(plan.owned_entities().unwrap().len(), 0);
        assert_eq!(plan.skipped_entities().len(), 1);
    }

    #[tokio::test]
    async fn no_manifests_is_a_no_op() {
        let (cluster, compose, td) = fixture();
        td.tear_down(&OpContext::new(), &[]).await.unwrap();
        assert!(cluster.delete_calls().is_empty());
        assert!(compose.down_calls().is_empty());
    }

    #[tokio::test]
    async fn bad_documents_fail_before_any_backend_call() {
        let (cluster, compose, td) = fixture();
        let manifests = vec![
            Manifest::new("fe", ComposeTarget::new("fe", ["dc.yaml"])),
            Manifest::new("broken", ClusterTarget::new("{not json")),
        ];

        let err = td.tear_down(&OpContext::new(), &manifests).await.unwrap_err();
        assert!(matches!(err, CoreError::Manifest { ref name, .. } if name == "broken"));
        assert!(cluster.delete_calls().is_empty());
        assert!(compose.down_calls().is_empty());
    }

    #[tokio::test]
    async fn cancelled_context_dispatches_nothing() {
        let (cluster, compose, td) = fixture();
        let manifests = vec![
            cluster_manifest("a", vec![entity("Deployment", "a", &[OWNED])]),
            Manifest::new("fe", ComposeTarget::new("fe", ["dc.yaml"])),
        ];
        let ctx = OpContext::new();
        ctx.cancel();

        let err = td.tear_down(&ctx, &manifests).await.unwrap_err();
        assert!(err.is_cancellation());
        assert!(cluster.delete_calls().is_empty());
        assert!(compose.down_calls().is_empty());
    }

    #[tokio::test]
    async fn cluster_runs_before_compose_and_failure_stops_compose() {
        let journal = CallJournal::new();
        let cluster = Arc::new(FakeClusterClient::new().with_journal(journal.clone()));
        let compose = Arc::new(FakeComposeClient::new().with_journal(journal.clone()));
        let td = TearDown::new(cluster.clone(), compose.clone());

        let manifests = vec![
            Manifest::new("fe", ComposeTarget::new("fe", ["dc.yaml"])),
            cluster_manifest("a", vec![entity("Deployment", "a", &[OWNED])]),
        ];

        td.tear_down(&OpContext::new(), &manifests).await.unwrap();
        assert_eq!(journal.entries(), vec!["cluster.delete(1)", "compose.down(fe)"]);

        cluster.fail_deletes("connection refused");
        let err = td.tear_down(&OpContext::new(), &manifests).await.unwrap_err();
        assert!(matches!(err, CoreError::ClusterDelete(_)));
        assert_eq!(
            journal.entries(),
            vec!["cluster.delete(1)", "compose.down(fe)", "cluster.delete(1)"]
        );
    }

    #[tokio::test]
    async fn compose_failure_stops_remaining_projects() {
        let (_, compose, td) = fixture();
        compose.fail_downs("no such file");
        let manifests = vec![
            Manifest::new("fe", ComposeTarget::new("fe", ["fe.yaml"])),
            Manifest::new("be", ComposeTarget::new("be", ["be.yaml"])),
        ];

        let err = td.tear_down(&OpContext::new(), &manifests).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "running compose down for project 'fe': no such file"
        );
    }
}
