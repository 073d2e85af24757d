use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{
    entity::{ClusterEntity, parse_entities},
    error::ModelResult,
};

/// Cluster objects to apply, as serialized JSON documents.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterTarget {
    /// Object documents (single object, array, list object, or a stream of them).
    pub documents: String,
}

impl ClusterTarget {
    pub fn new(documents: impl Into<String>) -> Self {
        Self {
            documents: documents.into(),
        }
    }

    /// Build a target from already-decoded entities.
    pub fn from_entities(entities: &[ClusterEntity]) -> ModelResult<Self> {
        Ok(Self {
            documents: serde_json::to_string(entities)?,
        })
    }

    /// Extract the entities described by this target.
    pub fn entities(&self) -> ModelResult<Vec<ClusterEntity>> {
        parse_entities(&self.documents)
    }
}

/// Local compose project.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeTarget {
    /// Compose project name (`-p`).
    pub project: String,
    /// Compose configuration files (`-f`), in the order given.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub config_paths: Vec<PathBuf>,
}

impl ComposeTarget {
    pub fn new<I, P>(project: impl Into<String>, config_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            project: project.into(),
            config_paths: config_paths.into_iter().map(Into::into).collect(),
        }
    }
}

/// Backend a manifest deploys to. Exactly one per manifest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeployTarget {
    /// Objects applied through the cluster API.
    Cluster(ClusterTarget),
    /// Services run by a local compose project.
    Compose(ComposeTarget),
}

impl DeployTarget {
    /// Returns the target kind as a static string.
    pub fn kind(&self) -> &'static str {
        match self {
            DeployTarget::Cluster(_) => "cluster",
            DeployTarget::Compose(_) => "compose",
        }
    }

    pub fn as_cluster(&self) -> Option<&ClusterTarget> {
        match self {
            DeployTarget::Cluster(t) => Some(t),
            DeployTarget::Compose(_) => None,
        }
    }

    pub fn as_compose(&self) -> Option<&ComposeTarget> {
        match self {
            DeployTarget::Compose(t) => Some(t),
            DeployTarget::Cluster(_) => None,
        }
    }
}

impl From<ClusterTarget> for DeployTarget {
    fn from(t: ClusterTarget) -> Self {
        DeployTarget::Cluster(t)
    }
}

impl From<ComposeTarget> for DeployTarget {
    fn from(t: ComposeTarget) -> Self {
        DeployTarget::Compose(t)
    }
}
