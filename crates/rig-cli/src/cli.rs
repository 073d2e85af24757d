use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use rig_exec::{ComposeConfig, KubectlConfig};
use rig_model::DEFAULT_NAMESPACE;
use rig_observe::{LoggerConfig, LoggerFormat, LoggerLevel};

/// Tear down what rig deployed, or wait for a container to come up.
#[derive(Parser, Debug)]
#[command(name = "rig", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Log output: text, json or journald
    #[arg(long, global = true, default_value = "text")]
    pub log_format: LoggerFormat,

    /// Log filter directives (overridden by RIG_LOG)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: LoggerLevel,

    /// kubectl binary
    #[arg(long, global = true, default_value = "kubectl", env = "RIG_KUBECTL")]
    pub kubectl: String,

    /// kubectl context to use instead of the current one
    #[arg(long, global = true)]
    pub kube_context: Option<String>,

    /// Binary providing `compose`
    #[arg(long, global = true, default_value = "docker", env = "RIG_COMPOSE_BINARY")]
    pub compose_binary: String,
}

impl GlobalArgs {
    pub fn logger(&self) -> LoggerConfig {
        LoggerConfig {
            format: self.log_format,
            level: self.log_level.clone(),
            ..Default::default()
        }
    }

    pub fn kubectl(&self) -> KubectlConfig {
        KubectlConfig {
            binary: self.kubectl.clone(),
            context: self.kube_context.clone(),
            ..Default::default()
        }
    }

    pub fn compose(&self, remove_orphans: bool) -> ComposeConfig {
        ComposeConfig {
            binary: self.compose_binary.clone(),
            remove_orphans,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Delete cluster objects and compose projects created for the given manifests
    Down(DownArgs),
    /// Block until the container running an image is ready
    Wait(WaitArgs),
}

#[derive(Args, Debug)]
pub struct DownArgs {
    /// JSON file holding the manifest list
    #[arg(short, long)]
    pub manifests: PathBuf,

    /// Print what would be deleted without calling any backend
    #[arg(long)]
    pub dry_run: bool,

    /// Pass --remove-orphans to compose down
    #[arg(long)]
    pub remove_orphans: bool,
}

#[derive(Args, Debug)]
pub struct WaitArgs {
    #[arg(short, long, default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// Image reference of the container to wait for
    #[arg(short, long)]
    pub image: String,

    /// Workload name; defaults to the first one running the image
    #[arg(short, long)]
    pub workload: Option<String>,

    /// Give up after this many seconds
    #[arg(short, long, default_value_t = 120)]
    pub timeout: u64,
}
