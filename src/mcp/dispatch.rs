//! Tool call routing.
//!
//! `Dispatcher::dispatch` is the single entry point for both the MCP server
//! and the `call` subcommand: decode, run the handler, wrap the outcome in
//! an `Envelope`. Errors never escape; they become failure envelopes.

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::mcp::envelope::Envelope;
use crate::mcp::handlers::{Invocation, changelist, client, file, info as p4info, stream};
use crate::mcp::request::{Operation, Request};
use crate::p4::{CommandRunner, P4Error};

/// The configured client lives in the runner; handlers read it from there.
pub struct Dispatcher<R> {
    runner: R,
}

impl<R: CommandRunner> Dispatcher<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    #[cfg(test)]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub async fn dispatch(&self, name: &str, arguments: Option<Map<String, Value>>) -> Envelope {
        let outcome = match Request::parse(name, arguments) {
            Ok(request) => self.execute(request).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(text) => Envelope::text(text),
            Err(e) => {
                warn!(
                    tool = name,
                    validation = e.is_validation(),
                    error = %e,
                    "tool call failed"
                );
                Envelope::failure(&e)
            }
        }
    }

    async fn execute(&self, request: Request) -> Result<String, P4Error> {
        let Request {
            operation,
            working_dir,
        } = request;
        info!(
            tool = operation.tool_name(),
            path = ?working_dir,
            "tool call"
        );

        let inv = Invocation::new(&self.runner, working_dir.as_deref());

        match operation {
            Operation::Add(args) => file::open_files(&inv, "add", args).await,
            Operation::Edit(args) => file::open_files(&inv, "edit", args).await,
            Operation::Delete(args) => file::open_files(&inv, "delete", args).await,
            Operation::Revert(args) => file::revert(&inv, args).await,
            Operation::Sync(args) => file::sync(&inv, args).await,
            Operation::Diff(args) => file::diff(&inv, args).await,
            Operation::ChangelistCreate(args) => changelist::create(&inv, args).await,
            Operation::ChangelistSubmit(args) => changelist::submit(&inv, args).await,
            Operation::MoveToChangelist(args) => changelist::move_files(&inv, args).await,
            Operation::Status => p4info::status(&inv).await,
            Operation::Info => p4info::info(&inv).await,
            Operation::Version => Ok(p4info::version()),
            Operation::RawCommand(args) => p4info::raw_command(&inv, args).await,
            Operation::StreamList(args) => stream::list(&inv, args).await,
            Operation::StreamInfo(args) => stream::info(&inv, args).await,
            Operation::StreamSwitch(args) => stream::switch(&inv, args).await,
            Operation::StreamCreate(args) => stream::create(&inv, args).await,
            Operation::StreamEdit(args) => stream::edit(&inv, args).await,
            Operation::StreamGraph(args) => stream::graph(&inv, args).await,
            Operation::ClientList(args) => client::list(&inv, args).await,
            Operation::ClientInfo(args) => client::info(&inv, args).await,
            Operation::ClientCreate(args) => client::create(&inv, args).await,
            Operation::ClientEdit(args) => client::edit(&inv, args).await,
            Operation::ClientDelete(args) => client::delete(&inv, args).await,
            Operation::ClientSwitch(args) => client::switch(&inv, args).await,
        }
    }
}
