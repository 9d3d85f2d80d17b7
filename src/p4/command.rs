//! `p4` invocations as argument vectors.
//!
//! P4Command  -> subcommand + args (+ optional stdin document)
//! P4Context  -> binary, P4CONFIG name, configured client; turns a command into argv
//! parse_raw  -> shell-style split of a user-supplied "p4 ..." line
//!
//! Commands never pass through a shell. User-supplied values (descriptions,
//! file paths, filters) stay single argv entries no matter what they contain.

use std::fmt;

use shell_words::{join as shell_join, split as shell_split};

/// Default config file name exported as `P4CONFIG` to every child.
pub const DEFAULT_P4CONFIG: &str = ".p4config";

/// Global option `p4` uses to select a client workspace.
const CLIENT_FLAG: &str = "-c";

/// A single `p4` invocation, without the program name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct P4Command {
    args: Vec<String>,
    input: Option<String>,
}

impl P4Command {
    /// Start a command with its subcommand, e.g. `P4Command::new("add")`.
    pub fn new(subcommand: impl Into<String>) -> Self {
        Self {
            args: vec![subcommand.into()],
            ..Default::default()
        }
    }

    /// Build from a complete argument list (global options included).
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append `flag` only when `enabled`.
    pub fn flag_if(self, enabled: bool, flag: &str) -> Self {
        if enabled { self.arg(flag) } else { self }
    }

    /// Append `flag value` when a value is present.
    pub fn opt(self, flag: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.arg(flag).arg(v),
            None => self,
        }
    }

    /// Attach a specification document fed to the process on stdin.
    pub fn input(mut self, document: impl Into<String>) -> Self {
        self.input = Some(document.into());
        self
    }

    pub fn argv(&self) -> &[String] {
        &self.args
    }

    pub fn stdin(&self) -> Option<&str> {
        self.input.as_deref()
    }

    /// Whether the caller already put a `-c` global option in front.
    fn selects_client(&self) -> bool {
        self.args.first().is_some_and(|a| a == CLIENT_FLAG)
    }
}

impl fmt::Display for P4Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p4 {}", shell_join(&self.args))
    }
}

/// Parse a raw command line such as `p4 describe -s 1234`.
///
/// The line is split with shell quoting rules; the first token must be `p4`.
/// Pipes, redirections and other shell syntax are not interpreted, they
/// simply become literal arguments.
pub fn parse_raw(line: &str) -> Result<P4Command, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err("command is empty".into());
    }
    let mut parts =
        shell_split(trimmed).map_err(|e| format!("cannot split command line: {e}"))?;
    if parts.first().map(String::as_str) != Some("p4") {
        return Err("command must start with 'p4'".into());
    }
    parts.remove(0);
    if parts.is_empty() {
        return Err("no p4 subcommand given".into());
    }
    Ok(P4Command::from_args(parts))
}

/// Process-wide Perforce settings, resolved once at startup.
///
/// Client selection: a configured client is passed as `-c <client>`;
/// without one, `p4` resolves the workspace from the config file named by
/// `config_file`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct P4Context {
    pub program: String,
    pub config_file: String,
    pub client: Option<String>,
}

impl Default for P4Context {
    fn default() -> Self {
        Self {
            program: "p4".to_string(),
            config_file: DEFAULT_P4CONFIG.to_string(),
            client: None,
        }
    }
}

impl P4Context {
    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = Some(client.into());
        self
    }

    /// Client that will be injected for `command`, if any.
    pub fn effective_client(&self, command: &P4Command) -> Option<&str> {
        if command.selects_client() {
            return None;
        }
        self.client.as_deref()
    }

    /// Full argument vector handed to the `p4` binary.
    pub fn argv(&self, command: &P4Command) -> Vec<String> {
        let mut argv = Vec::with_capacity(command.argv().len() + 2);
        if let Some(client) = self.effective_client(command) {
            argv.push(CLIENT_FLAG.to_string());
            argv.push(client.to_string());
        }
        argv.extend(command.argv().iter().cloned());
        argv
    }

    /// Shell-quoted rendering used in logs and error messages.
    pub fn render(&self, command: &P4Command) -> String {
        let argv = self.argv(command);
        if argv.is_empty() {
            return self.program.clone();
        }
        format!("{} {}", self.program, shell_join(&argv))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_values_as_single_args() {
        let cmd = P4Command::new("submit")
            .args(["-c", "42"])
            .opt("-d", Some("fix 'quoted'; rm -rf /"));
        assert_eq!(
            cmd.argv(),
            &["submit", "-c", "42", "-d", "fix 'quoted'; rm -rf /"]
        );
    }

    #[test]
    fn flag_if_and_opt_skip_absent_values() {
        let cmd = P4Command::new("sync")
            .flag_if(false, "-f")
            .opt("-u", None);
        assert_eq!(cmd.argv(), &["sync"]);
    }

    #[test]
    fn context_injects_client_flag() {
        let ctx = P4Context::default().with_client("ws_main");
        let cmd = P4Command::new("add").arg("a.txt");
        assert_eq!(ctx.argv(&cmd), vec!["-c", "ws_main", "add", "a.txt"]);
        assert!(ctx.render(&cmd).starts_with("p4 -c ws_main add"));
    }

    #[test]
    fn without_client_config_file_resolution_applies() {
        let ctx = P4Context::default();
        let cmd = P4Command::new("opened");
        assert_eq!(ctx.argv(&cmd), vec!["opened"]);
        assert_eq!(ctx.render(&cmd), "p4 opened");
    }

    #[test]
    fn explicit_client_option_is_not_doubled() {
        let ctx = P4Context::default().with_client("ws_main");
        let cmd = parse_raw("p4 -c other opened").unwrap();
        assert_eq!(ctx.argv(&cmd), vec!["-c", "other", "opened"]);
    }

    #[test]
    fn render_quotes_arguments() {
        let ctx = P4Context::default();
        let cmd = P4Command::new("add").arg("my file.txt");
        assert_eq!(ctx.render(&cmd), "p4 add 'my file.txt'");
    }

    #[test]
    fn parse_raw_splits_quoted() {
        let cmd = parse_raw(r#"p4 describe -s "12 34""#).unwrap();
        assert_eq!(cmd.argv(), &["describe", "-s", "12 34"]);
    }

    #[test]
    fn parse_raw_rejects_other_programs() {
        assert!(parse_raw("rm -rf /").unwrap_err().contains("must start with 'p4'"));
        assert!(parse_raw("   ").unwrap_err().contains("empty"));
        assert!(parse_raw("p4").unwrap_err().contains("subcommand"));
        assert!(parse_raw("p4 'unterminated").is_err());
    }

    #[test]
    fn shell_metacharacters_stay_literal() {
        let cmd = parse_raw("p4 info | cat").unwrap();
        assert_eq!(cmd.argv(), &["info", "|", "cat"]);
    }
}
