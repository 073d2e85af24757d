mod target;
pub use target::{ClusterTarget, ComposeTarget, DeployTarget};

use serde::{Deserialize, Serialize};

use crate::domain::ManifestName;

/// Named deployable unit produced by configuration loading.
///
/// A manifest always has exactly one [`DeployTarget`]; setting a new one replaces the old.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Manifest name, unique within one load result.
    pub name: ManifestName,
    /// Backend this manifest deploys to.
    pub deploy_target: DeployTarget,
}

impl Manifest {
    pub fn new(name: impl Into<ManifestName>, target: impl Into<DeployTarget>) -> Self {
        Self {
            name: name.into(),
            deploy_target: target.into(),
        }
    }

    /// Replace the deploy target, builder-style.
    ///
    /// ```rust
    /// # use rig_model::{ClusterTarget, ComposeTarget, Manifest};
    /// let m = Manifest::new("fe", ComposeTarget::new("fe", ["dc.yaml"]))
    ///     .with_deploy_target(ClusterTarget::new("[]"));
    /// assert_eq!(m.deploy_target.kind(), "cluster");
    /// ```
    pub fn with_deploy_target(mut self, target: impl Into<DeployTarget>) -> Self {
        self.deploy_target = target.into();
        self
    }

    pub fn is_cluster(&self) -> bool {
        matches!(self.deploy_target, DeployTarget::Cluster(_))
    }

    pub fn is_compose(&self) -> bool {
        matches!(self.deploy_target, DeployTarget::Compose(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_deploy_target_replaces_kind() {
        let m = Manifest::new("sancho", ClusterTarget::new("{}"));
        assert!(m.is_cluster());

        let m = m.with_deploy_target(ComposeTarget::new("sancho", ["dc.yaml"]));
        assert!(m.is_compose());
        assert!(!m.is_cluster());
        assert_eq!(
            m.deploy_target.as_compose().unwrap().config_paths,
            vec![std::path::PathBuf::from("dc.yaml")]
        );
    }

    #[test]
    fn deserializes_tagged_targets() {
        let json = r#"[
            {"name": "fe", "deployTarget": {"compose": {"project": "fe", "configPaths": ["dc.yaml"]}}},
            {"name": "be", "deployTarget": {"cluster": {"documents": "[]"}}}
        ]"#;
        let manifests: Vec<Manifest> = serde_json::from_str(json).unwrap();

        assert_eq!(manifests[0].deploy_target.kind(), "compose");
        assert_eq!(manifests[1].deploy_target.kind(), "cluster");
        assert!(manifests[1].deploy_target.as_cluster().unwrap().entities().unwrap().is_empty());
    }

    #[test]
    fn cluster_target_from_entities_roundtrips() {
        let entities = crate::parse_entities(
            r#"{"kind": "Service", "metadata": {"name": "a", "namespace": "x"}}"#,
        )
        .unwrap();
        let target = ClusterTarget::from_entities(&entities).unwrap();
        assert_eq!(target.entities().unwrap(), entities);
    }
}
