//! Command execution.
//!
//! `CommandRunner` is the seam between tool handlers and the `p4` binary:
//! handlers only ever see `CommandOutput` or a `P4Error`. `ProcessRunner`
//! is the real implementation, one child process per call, no retry and no
//! timeout.

use std::future::Future;
use std::path::Path;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::p4::{P4Command, P4Context, P4Error};

/// Captured text of a finished, successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    #[cfg(test)]
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// stderr when it has content, stdout otherwise.
    ///
    /// Mixed output loses the stdout half; `p4` puts its warnings and
    /// per-file complaints on stderr and those are what callers need to see.
    pub fn stderr_or_stdout(&self) -> String {
        if self.stderr.trim().is_empty() {
            self.stdout.clone()
        } else {
            self.stderr.clone()
        }
    }

    /// stdout, or `fallback` when it is blank.
    pub fn stdout_or(&self, fallback: &str) -> String {
        if self.stdout.trim().is_empty() {
            fallback.to_string()
        } else {
            self.stdout.clone()
        }
    }
}

/// Runs a `p4` command in an optional working directory.
pub trait CommandRunner: Send + Sync + 'static {
    fn run(
        &self,
        command: &P4Command,
        working_dir: Option<&Path>,
    ) -> impl Future<Output = Result<CommandOutput, P4Error>> + Send;

    /// Client passed as `-c` to every command, if one is configured.
    fn configured_client(&self) -> Option<&str>;
}

/// Spawns the configured `p4` binary through `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    context: P4Context,
}

impl ProcessRunner {
    pub fn new(context: P4Context) -> Self {
        Self { context }
    }

    fn build(&self, command: &P4Command, working_dir: Option<&Path>) -> Command {
        let mut cmd = Command::new(&self.context.program);
        cmd.args(self.context.argv(command))
            .env("P4CONFIG", &self.context.config_file)
            // Client comes from `-c` or the config file, never the inherited env.
            .env_remove("P4CLIENT")
            .stdin(if command.stdin().is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl CommandRunner for ProcessRunner {
    fn configured_client(&self) -> Option<&str> {
        self.context.client.as_deref()
    }

    async fn run(
        &self,
        command: &P4Command,
        working_dir: Option<&Path>,
    ) -> Result<CommandOutput, P4Error> {
        if let Some(dir) = working_dir
            && !dir.is_dir()
        {
            return Err(P4Error::MissingWorkingDirectory(dir.to_path_buf()));
        }

        let rendered = self.context.render(command);
        debug!(command = %rendered, cwd = ?working_dir, "spawning p4");

        let mut child = self
            .build(command, working_dir)
            .spawn()
            .map_err(|source| P4Error::Spawn {
                program: self.context.program.clone(),
                source,
            })?;

        let stdin = child.stdin.take();
        let feed = async {
            if let (Some(mut pipe), Some(document)) = (stdin, command.stdin()) {
                pipe.write_all(document.as_bytes()).await?;
                pipe.shutdown().await?;
            }
            Ok::<_, std::io::Error>(())
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            let status = match output.status.code() {
                Some(code) => format!("exit code {code}"),
                None => "terminated by signal".to_string(),
            };
            return Err(P4Error::CommandFailed {
                command: rendered,
                status,
                stderr: if stderr.trim().is_empty() { stdout } else { stderr },
            });
        }
        // A broken pipe only matters if the process also reported success.
        fed?;

        debug!(
            stdout_bytes = stdout.len(),
            stderr_bytes = stderr.len(),
            "p4 finished"
        );
        Ok(CommandOutput { stdout, stderr })
    }
}
