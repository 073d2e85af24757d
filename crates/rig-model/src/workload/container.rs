use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Point-in-time status of one container inside a workload.
///
/// Field names follow the cluster's JSON shape so statuses decode directly from API output.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerStatus {
    /// Container name inside the workload.
    #[serde(default)]
    pub name: String,
    /// Image reference the runtime reports for this container.
    #[serde(default)]
    pub image: String,
    /// Running-instance id as `<runtime>://<id>`; absent until the container starts.
    #[serde(rename = "containerID", default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    /// Readiness probe result.
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub restart_count: u32,
    /// Current lifecycle state.
    #[serde(default)]
    pub state: ContainerState,
}

impl ContainerStatus {
    /// Create a status for a container running `image`.
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_container_id(mut self, id: impl Into<String>) -> Self {
        self.container_id = Some(id.into());
        self
    }

    pub fn with_ready(mut self, ready: bool) -> Self {
        self.ready = ready;
        self
    }

    pub fn with_state(mut self, state: ContainerState) -> Self {
        self.state = state;
        self
    }

    /// Running-instance id with the runtime scheme stripped.
    ///
    /// Returns `Ok(None)` while the container has not started.
    pub fn container_id(&self) -> ModelResult<Option<ContainerId>> {
        match self.container_id.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => ContainerId::parse(raw).map(Some),
        }
    }
}

/// Opaque id of a started container, without the runtime scheme.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContainerId(String);

impl ContainerId {
    /// Parse `<runtime>://<id>`.
    pub fn parse(raw: &str) -> ModelResult<Self> {
        match raw.split_once("://") {
            Some((scheme, id)) if !scheme.is_empty() && !id.is_empty() => {
                Ok(Self(id.to_string()))
            }
            _ => Err(ModelError::InvalidContainerId(raw.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state as reported by the cluster. At most one field is set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waiting: Option<StateWaiting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running: Option<StateRunning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminated: Option<StateTerminated>,
}

impl ContainerState {
    pub fn waiting(reason: impl Into<String>) -> Self {
        Self {
            waiting: Some(StateWaiting {
                reason: Some(reason.into()),
                message: None,
            }),
            ..Default::default()
        }
    }

    pub fn running() -> Self {
        Self {
            running: Some(StateRunning::default()),
            ..Default::default()
        }
    }

    pub fn terminated(exit_code: i32) -> Self {
        Self {
            terminated: Some(StateTerminated {
                exit_code,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.is_some()
    }

    /// Short name of the current state, for logs.
    pub fn as_str(&self) -> &'static str {
        if self.terminated.is_some() {
            "terminated"
        } else if self.running.is_some() {
            "running"
        } else if self.waiting.is_some() {
            "waiting"
        } else {
            "unknown"
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateWaiting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRunning {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateTerminated {
    #[serde(default)]
    pub exit_code: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
