/*!
`tools.rs`

`tools` subcommand: print the tool catalog the server advertises.

  mcp-perforce tools                 table of every tool
  mcp-perforce tools p4_sync         parameters of one tool
  mcp-perforce tools [NAME] --json   same data as JSON (input schemas included)

JSON Output Shape (all tools):
{
  "status": "ok",
  "count": 25,
  "tools": [ { "name": "...", "description": "...", "inputSchema": { ... } } ]
}
*/

use anyhow::Result;
use clap::Args;
use serde_json::{Value, json};

use crate::cmd::format::{Role, StyleOptions, color, table};
use crate::cmd::shared::lookup_tool;
use crate::mcp::registry::{TOOLS, ToolDef};
use crate::mcp::request::PATH_ARG;

#[derive(Args, Debug)]
pub struct ToolsArgs {
    /// Show the parameters of a single tool
    #[arg(value_name = "TOOL")]
    pub name: Option<String>,

    /// Output JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,
}

pub fn execute_tools(args: ToolsArgs) -> Result<()> {
    match args.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => show_tool(lookup_tool(name)?, args.json),
        None => list_tools(args.json),
    }
}

fn tool_json(tool: &ToolDef) -> Value {
    json!({
        "name": tool.name,
        "description": tool.description,
        "inputSchema": Value::Object(tool.input_schema()),
    })
}

fn list_tools(json_mode: bool) -> Result<()> {
    if json_mode {
        let out = json!({
            "status": "ok",
            "count": TOOLS.len(),
            "tools": TOOLS.iter().map(tool_json).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let style = StyleOptions::detect();
    let rows: Vec<Vec<String>> = TOOLS
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let required: Vec<&str> = t.required().collect();
            vec![
                (i + 1).to_string(),
                t.name.to_string(),
                if required.is_empty() {
                    "-".to_string()
                } else {
                    required.join(",")
                },
                t.description.to_string(),
            ]
        })
        .collect();
    println!("{}", color(Role::Primary, format!("Tools ({})", TOOLS.len()), &style));
    println!("{}", table(&["#", "NAME", "REQUIRED", "DESCRIPTION"], &rows, &style));
    Ok(())
}

fn show_tool(tool: &ToolDef, json_mode: bool) -> Result<()> {
    if json_mode {
        let mut out = tool_json(tool);
        out["status"] = json!("ok");
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let style = StyleOptions::detect();
    println!("{}", color(Role::Primary, tool.name, &style));
    println!("{}\n", tool.description);

    let mut rows: Vec<Vec<String>> = tool
        .params
        .iter()
        .map(|p| {
            vec![
                p.name.to_string(),
                p.kind.as_str().to_string(),
                (if p.required { "yes" } else { "no" }).to_string(),
                p.description.to_string(),
            ]
        })
        .collect();
    if tool.takes_path {
        rows.push(vec![
            PATH_ARG.to_string(),
            "string".to_string(),
            "no".to_string(),
            "Working directory path".to_string(),
        ]);
    }
    if rows.is_empty() {
        println!("{}", color(Role::Dim, "No parameters", &style));
    } else {
        println!("{}", table(&["PARAM", "TYPE", "REQUIRED", "DESCRIPTION"], &rows, &style));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::request::names;

    #[test]
    fn tool_json_carries_schema() {
        let tool = lookup_tool(names::STREAM_CREATE).unwrap();
        let v = tool_json(tool);
        assert_eq!(v["name"], names::STREAM_CREATE);
        assert_eq!(v["inputSchema"]["type"], "object");
        assert!(v["inputSchema"]["properties"]["type"]["enum"].is_array());
    }
}
