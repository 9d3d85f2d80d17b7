//! Perforce command layer.
//!
//! command -> argument-vector builder + `P4Context` (binary, config file, client selection)
//! exec    -> `CommandRunner` trait and the tokio-backed `ProcessRunner`
//! spec    -> changelist / client / stream specification text builders
//! error   -> `P4Error`, the single error type that flows up to the dispatcher

pub mod command;
pub mod error;
pub mod exec;
pub mod spec;

pub use command::{P4Command, P4Context};
pub use error::P4Error;
pub use exec::{CommandOutput, CommandRunner, ProcessRunner};
