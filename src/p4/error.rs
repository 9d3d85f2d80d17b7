use std::io;
use std::path::PathBuf;

/// Every failure a tool call can hit, from argument decoding to a rejected `p4` invocation.
///
/// The dispatcher renders these into the response envelope; none of them
/// escape to the transport.
#[derive(Debug, thiserror::Error)]
pub enum P4Error {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("working directory does not exist: {}", .0.display())]
    MissingWorkingDirectory(PathBuf),

    #[error("failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Command failed: {command} ({status})\n{}", .stderr.trim_end())]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl P4Error {
    pub fn invalid(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        P4Error::InvalidArguments {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// True for failures detected before any process was spawned.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            P4Error::UnknownTool(_)
                | P4Error::InvalidArguments { .. }
                | P4Error::MissingWorkingDirectory(_)
        )
    }
}
