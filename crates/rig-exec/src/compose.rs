//! [`ComposeClient`] backed by `docker compose`.
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use rig_core::{ClientError, ComposeClient, OpContext};

use crate::{CommandLine, ExecError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// Program providing the `compose` subcommand.
    pub binary: String,
    /// Also remove containers for services not in the config files.
    pub remove_orphans: bool,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            binary: "docker".to_string(),
            remove_orphans: false,
        }
    }
}

impl ComposeConfig {
    pub fn validate(&self) -> Result<(), ExecError> {
        if self.binary.trim().is_empty() {
            return Err(ExecError::InvalidConfig("compose binary is empty".into()));
        }
        Ok(())
    }
}

/// Compose client that shells out to `docker compose`.
#[derive(Debug, Clone)]
pub struct ComposeCli {
    config: ComposeConfig,
}

impl ComposeCli {
    pub fn new(config: ComposeConfig) -> Result<Self, ExecError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn down_command(&self, project: &str, config_paths: &[PathBuf]) -> CommandLine {
        let mut line = CommandLine::new(&self.config.binary).args(["compose", "-p", project]);
        for path in config_paths {
            line = line.arg("-f").arg(path);
        }
        line = line.arg("down");
        if self.config.remove_orphans {
            line = line.arg("--remove-orphans");
        }
        line
    }
}

#[async_trait]
impl ComposeClient for ComposeCli {
    fn name(&self) -> &'static str {
        "docker-compose"
    }

    #[instrument(level = "debug", skip_all, fields(project = %project))]
    async fn down(
        &self,
        ctx: &OpContext,
        project: &str,
        config_paths: &[PathBuf],
    ) -> Result<(), ClientError> {
        self.down_command(project, config_paths)
            .output(ctx, None)
            .await?;
        debug!("compose project down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn down_command_lists_every_config() {
        let cli = ComposeCli::new(ComposeConfig::default()).unwrap();
        let line = cli.down_command("fe", &["dc.yaml".into(), "dc.override.yaml".into()]);
        assert_eq!(
            line.to_string(),
            "docker compose -p fe -f dc.yaml -f dc.override.yaml down"
        );
    }

    #[test]
    fn remove_orphans_flag() {
        let cfg: ComposeConfig = serde_json::from_str(r#"{"remove_orphans": true}"#).unwrap();
        assert_eq!(cfg.binary, "docker");
        let line = ComposeCli::new(cfg).unwrap().down_command("fe", &["dc.yaml".into()]);
        assert_eq!(line.to_string(), "docker compose -p fe -f dc.yaml down --remove-orphans");
    }

    #[test]
    fn rejects_empty_binary() {
        let cfg = ComposeConfig {
            binary: String::new(),
            ..Default::default()
        };
        assert!(ComposeCli::new(cfg).is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_down_reports_stderr() {
        let cli = ComposeCli::new(ComposeConfig {
            binary: "false".into(),
            ..Default::default()
        })
        .unwrap();
        let err = cli
            .down(&OpContext::new(), "fe", &["dc.yaml".into()])
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Command { ref status, .. } if status == "exit code 1"));
    }
}
