//! [`ClusterClient`] backed by the `kubectl` binary.
mod watch;
pub use watch::JsonStreamDecoder;
use watch::WatchEnd;

use std::{path::PathBuf, process::Stdio};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::io::AsyncReadExt;
use tracing::{debug, instrument, trace};

use rig_core::{ClientError, ClusterClient, OpContext, SnapshotStream, client::WATCH_BUFFER};
use rig_model::{ClusterEntity, WorkloadRef, WorkloadSnapshot};

use crate::{CommandLine, ExecError};

/// How to reach the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KubectlConfig {
    /// Program to run. Looked up in `PATH` unless absolute.
    pub binary: String,
    /// `--context` passed to every invocation.
    pub context: Option<String>,
    /// `--kubeconfig` passed to every invocation.
    pub kubeconfig: Option<PathBuf>,
}

impl Default for KubectlConfig {
    fn default() -> Self {
        Self {
            binary: "kubectl".to_string(),
            context: None,
            kubeconfig: None,
        }
    }
}

impl KubectlConfig {
    pub fn validate(&self) -> Result<(), ExecError> {
        if self.binary.trim().is_empty() {
            return Err(ExecError::InvalidConfig("kubectl binary is empty".into()));
        }
        if self.context.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(ExecError::InvalidConfig("kubectl context is empty".into()));
        }
        Ok(())
    }
}

/// Cluster client that shells out to `kubectl`.
#[derive(Debug, Clone)]
pub struct KubectlClient {
    config: KubectlConfig,
}

impl KubectlClient {
    pub fn new(config: KubectlConfig) -> Result<Self, ExecError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &KubectlConfig {
        &self.config
    }

    /// Base invocation carrying the connection flags.
    fn kubectl(&self) -> CommandLine {
        let mut line = CommandLine::new(&self.config.binary);
        if let Some(context) = &self.config.context {
            line = line.args(["--context", context.as_str()]);
        }
        if let Some(kubeconfig) = &self.config.kubeconfig {
            line = line.arg("--kubeconfig").arg(kubeconfig);
        }
        line
    }

    pub fn get_command(&self, workload: &WorkloadRef) -> CommandLine {
        self.kubectl()
            .args(["get", "pod", workload.name.as_str(), "-n", workload.namespace.as_str(), "-o", "json"])
    }

    pub fn list_command(&self, namespace: &str) -> CommandLine {
        self.kubectl()
            .args(["get", "pods", "-n", namespace, "-o", "json"])
    }

    pub fn watch_command(&self, workload: &WorkloadRef) -> CommandLine {
        self.kubectl().args([
            "get",
            "pod",
            workload.name.as_str(),
            "-n",
            workload.namespace.as_str(),
            "--watch",
            "-o",
            "json",
        ])
    }

    pub fn delete_command(&self) -> CommandLine {
        self.kubectl()
            .args(["delete", "--ignore-not-found", "-f", "-"])
    }
}

/// Entities wrapped into a `List` document for `kubectl delete -f -`.
pub fn delete_payload(entities: &[ClusterEntity]) -> Result<Vec<u8>, ClientError> {
    let doc = json!({
        "apiVersion": "v1",
        "kind": "List",
        "items": entities,
    });
    serde_json::to_vec(&doc).map_err(|e| ClientError::Decode(e.to_string()))
}

#[derive(Deserialize)]
struct PodList {
    #[serde(default)]
    items: Vec<WorkloadSnapshot>,
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, ClientError> {
    serde_json::from_slice(bytes).map_err(|e| ClientError::Decode(e.to_string()))
}

#[async_trait]
impl ClusterClient for KubectlClient {
    fn name(&self) -> &'static str {
        "kubectl"
    }

    #[instrument(level = "debug", skip_all, fields(workload = %workload))]
    async fn get_workload(
        &self,
        ctx: &OpContext,
        workload: &WorkloadRef,
    ) -> Result<WorkloadSnapshot, ClientError> {
        match self.get_command(workload).output(ctx, None).await {
            Ok(out) => decode(&out),
            Err(ClientError::Command { stderr, .. }) if stderr.contains("NotFound") => {
                Err(ClientError::NotFound(workload.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(level = "debug", skip_all, fields(namespace = %namespace))]
    async fn list_workloads(
        &self,
        ctx: &OpContext,
        namespace: &str,
    ) -> Result<Vec<WorkloadSnapshot>, ClientError> {
        let out = self.list_command(namespace).output(ctx, None).await?;
        let list: PodList = decode(&out)?;
        trace!(count = list.items.len(), "listed workloads");
        Ok(list.items)
    }

    #[instrument(level = "debug", skip_all, fields(workload = %workload))]
    async fn watch_workload(
        &self,
        ctx: &OpContext,
        workload: &WorkloadRef,
    ) -> Result<SnapshotStream, ClientError> {
        if let Some(err) = ctx.err() {
            return Err(err.into());
        }

        let line = self.watch_command(workload);
        let mut cmd = line.to_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|source| ClientError::Spawn {
            program: line.program().to_string(),
            source,
        })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ClientError::Backend(format!("'{line}' has no stdout")))?;
        // drained concurrently so a chatty child never blocks on a full pipe
        let stderr = child.stderr.take().map(|mut pipe| {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                if let Err(e) = pipe.read_to_end(&mut buf).await {
                    trace!(error = %e, "failed to read watch stderr");
                }
                buf
            })
        });

        // kubectl prints the current object first, so nothing after this point is lost.
        let (tx, stream) = SnapshotStream::channel(WATCH_BUFFER);
        let ctx = ctx.clone();
        tokio::spawn(async move {
            if watch::pump(&ctx, stdout, &tx).await == WatchEnd::Eof {
                let status = tokio::select! {
                    biased;
                    _ = ctx.done() => None,
                    _ = tx.closed() => None,
                    status = child.wait() => status.ok(),
                };
                if let Some(status) = status.filter(|s| !s.success()) {
                    let stderr = match stderr {
                        Some(task) => task.await.unwrap_or_default(),
                        None => Vec::new(),
                    };
                    let err = line.failure(status, &stderr);
                    debug!(error = %err, "watch process failed");
                    let _ = tx.send(Err(err)).await;
                }
            }
            if let Err(e) = child.kill().await {
                trace!(error = %e, "watch process already gone");
            }
            debug!("watch process stopped");
        });
        Ok(stream)
    }

    #[instrument(level = "debug", skip_all, fields(entities = entities.len()))]
    async fn delete(&self, ctx: &OpContext, entities: &[ClusterEntity]) -> Result<(), ClientError> {
        if entities.is_empty() {
            debug!("no entities to delete");
            return Ok(());
        }
        let payload = delete_payload(entities)?;
        let out = self.delete_command().output(ctx, Some(payload)).await?;
        trace!(output = %String::from_utf8_lossy(&out).trim(), "kubectl delete");
        Ok(())
    }
}
