/*!
`call.rs`

`call` subcommand: run one tool through the same dispatcher the MCP server
uses, without an MCP client.

  mcp-perforce call p4_add --param files=a.txt,b.txt --path /ws
  mcp-perforce call p4_changelist_submit --param-file submit.yaml --json

Parameters:
  --param KEY=VALUE     repeatable; typed by the tool's declared parameters
  --param-file FILE     JSON or YAML object; --param entries win
  --path DIR            shorthand for --param path=DIR

Output: the response text, or with --json the envelope itself
({"content":[{"type":"text","text":...}],"isError":bool}).
A failed tool call exits non-zero.
*/

use anyhow::{Context, Result, bail};
use clap::Args;
use serde_json::json;

use crate::cmd::format::{Role, StyleOptions, color, status_mark};
use crate::cmd::shared::{build_arguments, load_param_file_into_map, lookup_tool, parse_params};
use crate::mcp::Dispatcher;
use crate::mcp::envelope::Envelope;
use crate::mcp::request::PATH_ARG;
use crate::p4::CommandRunner;

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Tool name to invoke
    #[arg(value_name = "TOOL")]
    pub tool: String,

    /// Provide parameter (KEY=VALUE), repeatable
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Load parameters from file (JSON or YAML). CLI --param overrides file entries
    #[arg(long = "param-file", value_name = "PATH")]
    pub param_file: Option<String>,

    /// Working directory for p4
    #[arg(long, value_name = "DIR")]
    pub path: Option<String>,

    /// Output the response envelope as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute_call<R: CommandRunner>(args: CallArgs, dispatcher: Dispatcher<R>) -> Result<()> {
    let tool = lookup_tool(args.tool.trim())?;

    let mut provided = parse_params(&args.params)?;
    if let Some(dir) = args.path.as_deref().filter(|d| !d.trim().is_empty()) {
        provided.insert(PATH_ARG.to_string(), dir.trim().to_string());
    }
    if let Some(ref pf) = args.param_file {
        load_param_file_into_map(pf, &mut provided)?;
    }
    let arguments = build_arguments(tool, &provided).context("Failed to build arguments")?;

    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    let envelope = rt.block_on(dispatcher.dispatch(tool.name, Some(arguments)));

    print_envelope(tool.name, &envelope, args.json)?;
    if envelope.is_error {
        bail!("tool '{}' failed", tool.name);
    }
    Ok(())
}

fn print_envelope(tool: &str, envelope: &Envelope, json_mode: bool) -> Result<()> {
    if json_mode {
        let mut out = serde_json::to_value(envelope)?;
        out["isError"] = json!(envelope.is_error);
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let style = StyleOptions::detect();
    let role = if envelope.is_error { Role::Error } else { Role::Primary };
    println!(
        "{} {}",
        status_mark(!envelope.is_error, &style),
        color(role, tool, &style)
    );
    println!("{}", envelope.body().trim_end());
    Ok(())
}
