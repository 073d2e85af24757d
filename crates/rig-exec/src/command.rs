use std::{
    ffi::{OsStr, OsString},
    fmt,
    process::{ExitStatus, Stdio},
};

use tokio::{io::AsyncWriteExt, process::Command};
use tracing::{debug, trace, warn};

use rig_core::{ClientError, OpContext};

/// Program plus arguments for one backend invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<OsString>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for a in args {
            self = self.arg(a);
        }
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    /// Build a `tokio::process::Command` with no stdio configured.
    ///
    /// The child is killed if the handle is dropped before it exits.
    pub(crate) fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.kill_on_drop(true);
        cmd
    }

    /// Run to completion and return stdout.
    ///
    /// `stdin`, when given, is written to the child and then closed. A non-zero
    /// exit becomes [`ClientError::Command`] with the trimmed stderr. If `ctx`
    /// fires first the child is killed and the context error is returned.
    pub(crate) async fn output(
        &self,
        ctx: &OpContext,
        stdin: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, ClientError> {
        if let Some(err) = ctx.err() {
            return Err(err.into());
        }

        let mut cmd = self.to_command();
        cmd.stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() });
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        trace!(command = %self, "spawning");
        let mut child = cmd.spawn().map_err(|source| ClientError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            // the child may fill stdout before it drains stdin
            tokio::spawn(async move {
                if let Err(e) = pipe.write_all(&input).await {
                    warn!(error = %e, "failed to write child stdin");
                }
            });
        }

        let output = tokio::select! {
            biased;
            err = ctx.done() => {
                // dropping the wait future drops the child, which kills it
                debug!(command = %self, reason = %err, "killing subprocess");
                return Err(err.into());
            }
            out = child.wait_with_output() => out?,
        };

        if !output.status.success() {
            return Err(self.failure(output.status, &output.stderr));
        }
        debug!(command = %self, bytes = output.stdout.len(), "subprocess exited successfully");
        Ok(output.stdout)
    }

    /// Error for a run of this command that exited with `status`.
    pub(crate) fn failure(&self, status: ExitStatus, stderr: &[u8]) -> ClientError {
        let status = match status.code() {
            Some(code) => format!("exit code {code}"),
            None => "signal".to_string(),
        };
        ClientError::Command {
            command: self.to_string(),
            status,
            stderr: String::from_utf8_lossy(stderr).trim().to_string(),
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for a in &self.args {
            write!(f, " {}", a.to_string_lossy())?;
        }
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::time::Duration;

    use rig_core::ContextError;

    use super::*;

    fn sh(script: &str) -> CommandLine {
        CommandLine::new("sh").args(["-c", script])
    }

    #[test]
    fn display_joins_program_and_args() {
        let line = CommandLine::new("kubectl").args(["get", "pods"]).arg("-o");
        assert_eq!(line.to_string(), "kubectl get pods -o");
        assert_eq!(line.program(), "kubectl");
        assert_eq!(line.get_args().len(), 3);
    }

    #[tokio::test]
    async fn non_utf8_args_pass_through_unchanged() {
        use std::os::unix::ffi::OsStrExt;

        let path = OsStr::from_bytes(b"/srv/compose-\xff.yaml");
        let line = sh("printf %s \"$1\"").arg("sh").arg(path);
        assert_eq!(line.get_args()[3].as_os_str(), path);
        assert!(line.to_string().ends_with("/srv/compose-\u{FFFD}.yaml"));

        let out = line.output(&OpContext::new(), None).await.unwrap();
        assert_eq!(out, path.as_bytes());
    }

    #[tokio::test]
    async fn returns_stdout() {
        let out = sh("printf hello").output(&OpContext::new(), None).await.unwrap();
        assert_eq!(out, b"hello");
    }

    #[tokio::test]
    async fn feeds_stdin() {
        let out = CommandLine::new("cat")
            .output(&OpContext::new(), Some(b"{\"kind\":\"List\"}".to_vec()))
            .await
            .unwrap();
        assert_eq!(out, b"{\"kind\":\"List\"}");
    }

    #[tokio::test]
    async fn non_zero_exit_carries_status_and_stderr() {
        let err = sh("echo ' GARBLEGARBLE ' >&2; exit 3")
            .output(&OpContext::new(), None)
            .await
            .unwrap_err();
        match err {
            ClientError::Command { status, stderr, .. } => {
                assert_eq!(status, "exit code 3");
                assert_eq!(stderr, "GARBLEGARBLE");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_binary_is_spawn_error() {
        let err = CommandLine::new("rig-definitely-not-installed")
            .output(&OpContext::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Spawn { .. }));
    }

    #[tokio::test]
    async fn deadline_kills_long_running_child() {
        let ctx = OpContext::new().with_timeout(Duration::from_millis(50));
        let err = sh("sleep 5").output(&ctx, None).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Context(ContextError::DeadlineExceeded)
        ));
    }

    #[tokio::test]
    async fn cancelled_context_spawns_nothing() {
        let ctx = OpContext::new();
        ctx.cancel();
        let err = CommandLine::new("rig-definitely-not-installed")
            .output(&ctx, None)
            .await
            .unwrap_err();
        assert!(err.is_cancellation());
    }
}
