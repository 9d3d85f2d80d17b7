//! Tool handlers, one module per command family.
//!
//! Handlers take an `Invocation` (runner + working directory) and their decoded arguments, run one or more `p4` commands and
//! return the response text. They never build envelopes themselves.

use std::path::Path;

use crate::p4::spec::{UNKNOWN_OWNER, parse_owner};
use crate::p4::{CommandOutput, CommandRunner, P4Command, P4Error};

pub mod changelist;
pub mod client;
pub mod file;
pub mod info;
pub mod stream;

/// Everything a handler needs for one call.
pub struct Invocation<'a, R> {
    runner: &'a R,
    working_dir: Option<&'a Path>,
}

impl<'a, R: CommandRunner> Invocation<'a, R> {
    pub fn new(runner: &'a R, working_dir: Option<&'a Path>) -> Self {
        Self { runner, working_dir }
    }

    pub async fn run(&self, command: P4Command) -> Result<CommandOutput, P4Error> {
        self.runner.run(&command, self.working_dir).await
    }

    /// Client selected by configuration, if any.
    pub fn default_client(&self) -> Option<&'a str> {
        let runner: &'a R = self.runner;
        runner.configured_client()
    }

    /// Current Perforce user, read from `p4 user -o`.
    pub async fn owner(&self) -> Result<String, P4Error> {
        let out = self.run(P4Command::new("user").arg("-o")).await?;
        Ok(parse_owner(&out.stdout).unwrap_or(UNKNOWN_OWNER).to_string())
    }
}

/// Show-or-apply flow shared by client and stream editing.
async fn edit_spec<R: CommandRunner>(
    inv: &Invocation<'_, R>,
    object: &str,
    tool: &str,
    target: &str,
    spec: Option<String>,
) -> Result<String, P4Error> {
    match spec {
        Some(document) if !document.trim().is_empty() => {
            let out = inv
                .run(P4Command::new(object).arg("-i").input(document))
                .await?;
            Ok(out.stderr_or_stdout())
        }
        _ => {
            let out = inv
                .run(P4Command::new(object).arg("-o").arg(target))
                .await?;
            Ok(format!(
                "Current {object} spec for {target}:\n\n{}\n\nTo edit, use {tool} with the 'spec' parameter containing the modified specification.",
                out.stdout
            ))
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted runner: records every command and replays queued results.

    use std::collections::VecDeque;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use crate::p4::{CommandOutput, CommandRunner, P4Command, P4Context, P4Error};

    #[derive(Debug, Clone)]
    pub struct Recorded {
        pub command: P4Command,
        pub working_dir: Option<PathBuf>,
    }

    #[derive(Default)]
    pub struct ScriptedRunner {
        context: P4Context,
        replies: Mutex<VecDeque<Result<CommandOutput, String>>>,
        calls: Mutex<Vec<Recorded>>,
    }

    impl ScriptedRunner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Behave as if started with `--client client`.
        pub fn with_client(mut self, client: &str) -> Self {
            self.context = self.context.with_client(client);
            self
        }

        pub fn reply(self, stdout: &str, stderr: &str) -> Self {
            self.push(Ok(CommandOutput::new(stdout, stderr)))
        }

        /// Queue a non-zero exit with `stderr`.
        pub fn fail(self, stderr: &str) -> Self {
            self.push(Err(stderr.to_string()))
        }

        fn push(self, r: Result<CommandOutput, String>) -> Self {
            self.replies.lock().unwrap().push_back(r);
            self
        }

        pub fn calls(&self) -> Vec<Recorded> {
            self.calls.lock().unwrap().clone()
        }

        /// argv of every call as the process would receive it.
        pub fn argvs(&self) -> Vec<Vec<String>> {
            self.calls()
                .iter()
                .map(|c| self.context.argv(&c.command))
                .collect()
        }
    }

    impl CommandRunner for ScriptedRunner {
        async fn run(
            &self,
            command: &P4Command,
            working_dir: Option<&Path>,
        ) -> Result<CommandOutput, P4Error> {
            self.calls.lock().unwrap().push(Recorded {
                command: command.clone(),
                working_dir: working_dir.map(Path::to_path_buf),
            });
            let next = self.replies.lock().unwrap().pop_front();
            match next {
                Some(Ok(out)) => Ok(out),
                Some(Err(stderr)) => Err(P4Error::CommandFailed {
                    command: self.context.render(command),
                    status: "exit code 1".into(),
                    stderr,
                }),
                None => Ok(CommandOutput::default()),
            }
        }

        fn configured_client(&self) -> Option<&str> {
            self.context.client.as_deref()
        }
    }

    pub fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }
}
