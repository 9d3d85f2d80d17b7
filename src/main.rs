use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

mod cmd;
mod mcp;
mod p4;
mod utils;

use cmd::{CallArgs, ToolsArgs};
use mcp::Dispatcher;
use p4::{P4Context, ProcessRunner};

/// MCP Perforce - Perforce (p4) operations as Model Context Protocol tools.
///
/// Commands:
///   mcp-perforce [serve]                 run the MCP server on stdio (default)
///   mcp-perforce tools [NAME] [--json]   show the tool catalog
///   mcp-perforce call <TOOL> [--param k=v ...] [--param-file F] [--path DIR] [--json]
///
/// Global flags / env:
///   -v / -vv          Increase verbosity (logs go to stderr; RUST_LOG overrides)
///   -q / --quiet      Errors only
///   --p4-bin PATH     p4 executable (or P4_BIN env, default "p4")
///   --p4config NAME   config file name exported as P4CONFIG (or P4CONFIG env, default ".p4config")
///   --client NAME     client passed to every command as `-c NAME` (or P4CLIENT env)
///
/// Without a client, p4 resolves the workspace from the P4CONFIG file found
/// in the working directory or its parents.
///
/// Examples:
///   mcp-perforce --client alice_ws
///   mcp-perforce tools p4_changelist_submit
///   mcp-perforce call p4_status --path ~/ws
///   mcp-perforce call p4_sync --param files=//depot/main/... --param force=true
#[derive(Parser, Debug)]
#[command(
    name = "mcp-perforce",
    version,
    author,
    about = "MCP Perforce - Perforce (p4) operations as MCP tools",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// p4 executable (falls back to P4_BIN env)
    #[arg(long = "p4-bin", global = true, value_name = "PATH")]
    p4_bin: Option<String>,

    /// Config file name exported as P4CONFIG (falls back to P4CONFIG env)
    #[arg(long = "p4config", global = true, value_name = "NAME")]
    p4config: Option<String>,

    /// Client workspace for every command (falls back to P4CLIENT env)
    #[arg(long, global = true, value_name = "NAME")]
    client: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the MCP server on stdio (default)
    Serve,

    /// Show the tool catalog
    Tools(ToolsArgs),

    /// Run a single tool and print its response
    Call(CallArgs),
}

impl Cli {
    /// Flag > env > default, resolved once.
    fn p4_context(&mut self) -> P4Context {
        let mut context = P4Context::default();
        if let Some(program) = utils::env_fallback(self.p4_bin.take(), "P4_BIN") {
            context.program = program;
        }
        if let Some(config) = utils::env_fallback(self.p4config.take(), "P4CONFIG") {
            context.config_file = config;
        }
        match utils::env_fallback(self.client.take(), "P4CLIENT") {
            Some(client) => context.with_client(client),
            None => context,
        }
    }
}

fn main() -> Result<()> {
    let mut cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    let context = cli.p4_context();
    debug!(
        program = %context.program,
        p4config = %context.config_file,
        client = ?context.client,
        "perforce settings"
    );
    let dispatcher = Dispatcher::new(ProcessRunner::new(context));

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
            rt.block_on(mcp::serve_stdio(dispatcher))
        }
        Commands::Tools(args) => cmd::execute_tools(args),
        Commands::Call(args) => cmd::execute_call(args, dispatcher),
    }
}
