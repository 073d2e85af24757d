use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_NAMESPACE, Labels, domain::Namespace, workload::ContainerStatus};

/// Condition type reporting whether the workload was placed on a node.
pub const CONDITION_SCHEDULED: &str = "PodScheduled";

/// Reason set on [`CONDITION_SCHEDULED`] when no node can take the workload.
pub const REASON_UNSCHEDULABLE: &str = "Unschedulable";

const STATUS_FALSE: &str = "False";

/// Identity of one running workload instance.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkloadRef {
    pub namespace: Namespace,
    pub name: String,
}

impl WorkloadRef {
    pub fn new(namespace: impl Into<Namespace>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for WorkloadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Point-in-time report for one workload instance (pod-equivalent).
///
/// Decodes from the cluster's JSON object; unknown fields are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadSnapshot {
    #[serde(default)]
    pub metadata: WorkloadMeta,
    #[serde(default)]
    pub spec: WorkloadSpec,
    #[serde(default)]
    pub status: WorkloadStatus,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_namespace")]
    pub namespace: Namespace,
    #[serde(default, skip_serializing_if = "Labels::is_empty")]
    pub labels: Labels,
}

impl Default for WorkloadMeta {
    fn default() -> Self {
        Self {
            name: String::new(),
            namespace: default_namespace(),
            labels: Labels::new(),
        }
    }
}

fn default_namespace() -> Namespace {
    DEFAULT_NAMESPACE.to_string()
}

/// Declared containers of the workload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub containers: Vec<ContainerSpec>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSpec {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<WorkloadCondition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub container_statuses: Vec<ContainerStatus>,
}

/// Workload-level condition, e.g. scheduling.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadCondition {
    #[serde(rename = "type")]
    pub type_: String,
    /// `True`, `False` or `Unknown`.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WorkloadCondition {
    /// Scheduling condition reporting that no node can take the workload.
    pub fn unschedulable(message: impl Into<String>) -> Self {
        Self {
            type_: CONDITION_SCHEDULED.to_string(),
            status: STATUS_FALSE.to_string(),
            reason: Some(REASON_UNSCHEDULABLE.to_string()),
            message: Some(message.into()),
        }
    }
}

impl WorkloadSnapshot {
    /// Create an empty snapshot for `namespace/name`.
    pub fn new(namespace: impl Into<Namespace>, name: impl Into<String>) -> Self {
        Self {
            metadata: WorkloadMeta {
                name: name.into(),
                namespace: namespace.into(),
                labels: Labels::new(),
            },
            ..Default::default()
        }
    }

    pub fn with_container(mut self, name: impl Into<String>, image: impl Into<String>) -> Self {
        self.spec.containers.push(ContainerSpec {
            name: name.into(),
            image: image.into(),
        });
        self
    }

    pub fn with_container_status(mut self, status: ContainerStatus) -> Self {
        self.status.container_statuses.push(status);
        self
    }

    pub fn with_condition(mut self, condition: WorkloadCondition) -> Self {
        self.status.conditions.push(condition);
        self
    }

    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.status.phase = Some(phase.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    /// Identity of this workload.
    pub fn reference(&self) -> WorkloadRef {
        WorkloadRef::new(self.metadata.namespace.clone(), self.metadata.name.clone())
    }

    pub fn container_statuses(&self) -> &[ContainerStatus] {
        &self.status.container_statuses
    }

    /// Scheduler diagnostic if the workload is currently unschedulable.
    ///
    /// Only a scheduling condition whose status is `False` with reason
    /// `Unschedulable` counts; the message is returned verbatim (empty if absent).
    pub fn unschedulable(&self) -> Option<&str> {
        self.status
            .conditions
            .iter()
            .find(|c| {
                c.type_ == CONDITION_SCHEDULED
                    && c.status == STATUS_FALSE
                    && c.reason.as_deref() == Some(REASON_UNSCHEDULABLE)
            })
            .map(|c| c.message.as_deref().unwrap_or(""))
    }
}
