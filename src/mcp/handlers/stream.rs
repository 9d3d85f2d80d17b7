//! Stream operations, including the parent/child graph view.

use std::collections::{BTreeMap, HashSet};

use crate::mcp::handlers::{Invocation, edit_spec};
use crate::mcp::request::{
    SpecEditArgs, StreamCreateArgs, StreamGraphArgs, StreamInfoArgs, StreamListArgs,
    StreamSwitchArgs, names,
};
use crate::p4::spec::StreamSpec;
use crate::p4::{CommandRunner, P4Command, P4Error};

const NO_STREAMS: &str = "No streams found";

pub async fn list<R: CommandRunner>(
    inv: &Invocation<'_, R>,
    args: StreamListArgs,
) -> Result<String, P4Error> {
    let filter = args
        .filter
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(|f| format!("Stream~={f}"));
    let depot = args.depot.as_deref().map(str::trim).filter(|d| !d.is_empty());

    let cmd = P4Command::new("streams")
        .opt("-F", filter.as_deref())
        .args(depot);
    let out = inv.run(cmd).await?;
    Ok(out.stdout_or(NO_STREAMS))
}

pub async fn info<R: CommandRunner>(
    inv: &Invocation<'_, R>,
    args: StreamInfoArgs,
) -> Result<String, P4Error> {
    let out = inv
        .run(P4Command::new("stream").arg("-o").arg(args.stream))
        .await?;
    Ok(out.stdout)
}

pub async fn switch<R: CommandRunner>(
    inv: &Invocation<'_, R>,
    args: StreamSwitchArgs,
) -> Result<String, P4Error> {
    let cmd = P4Command::new("switch")
        .flag_if(args.force, "-f")
        .arg(args.stream);
    let out = inv.run(cmd).await?;
    Ok(out.stderr_or_stdout())
}

pub async fn create<R: CommandRunner>(
    inv: &Invocation<'_, R>,
    args: StreamCreateArgs,
) -> Result<String, P4Error> {
    let owner = inv.owner().await?;
    let spec = StreamSpec {
        path: args.stream.trim().to_string(),
        stream_type: args.stream_type,
        parent: args.parent,
        description: args.description,
        owner,
        options: args.options,
    };
    let out = inv
        .run(P4Command::new("stream").arg("-i").input(spec.render()))
        .await?;
    Ok(out.stderr_or_stdout())
}

pub async fn edit<R: CommandRunner>(
    inv: &Invocation<'_, R>,
    args: SpecEditArgs,
) -> Result<String, P4Error> {
    edit_spec(inv, "stream", names::STREAM_EDIT, &args.target, args.spec).await
}

pub async fn graph<R: CommandRunner>(
    inv: &Invocation<'_, R>,
    args: StreamGraphArgs,
) -> Result<String, P4Error> {
    let depot = args
        .depot
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or("//...");
    let cmd = P4Command::from_args(["-ztag", "streams", "-T", "Stream Parent Type", depot]);
    let out = inv.run(cmd).await?;
    Ok(render_graph(&out.stdout).unwrap_or_else(|| NO_STREAMS.to_string()))
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct StreamNode {
    stream: String,
    parent: String,
    kind: String,
}

/// Records from `p4 -ztag streams` output (`... Field value` lines).
fn parse_tagged(output: &str) -> Vec<StreamNode> {
    let mut nodes = Vec::new();
    let mut current: Option<StreamNode> = None;

    for line in output.lines() {
        let Some(tagged) = line.strip_prefix("... ") else {
            continue;
        };
        let (key, value) = tagged.split_once(' ').unwrap_or((tagged, ""));
        match key {
            "Stream" => {
                if let Some(done) = current.take() {
                    nodes.push(done);
                }
                current = Some(StreamNode {
                    stream: value.trim().to_string(),
                    ..Default::default()
                });
            }
            "Parent" => {
                if let Some(node) = current.as_mut() {
                    node.parent = value.trim().to_string();
                }
            }
            "Type" => {
                if let Some(node) = current.as_mut() {
                    node.kind = value.trim().to_string();
                }
            }
            _ => {}
        }
    }
    if let Some(done) = current {
        nodes.push(done);
    }
    nodes
}

/// Indented parent/child tree; `None` when there are no streams.
///
/// Streams whose parent is `none` or not part of the listing are roots.
fn render_graph(tagged: &str) -> Option<String> {
    let nodes = parse_tagged(tagged);
    if nodes.is_empty() {
        return None;
    }

    let known: HashSet<&str> = nodes.iter().map(|n| n.stream.as_str()).collect();
    let mut children: BTreeMap<&str, Vec<&StreamNode>> = BTreeMap::new();
    let mut roots: Vec<&StreamNode> = Vec::new();
    for node in &nodes {
        if node.parent.is_empty() || node.parent == "none" || !known.contains(node.parent.as_str()) {
            roots.push(node);
        } else {
            children.entry(node.parent.as_str()).or_default().push(node);
        }
    }
    roots.sort_by(|a, b| a.stream.cmp(&b.stream));
    for list in children.values_mut() {
        list.sort_by(|a, b| a.stream.cmp(&b.stream));
    }

    let mut lines = Vec::with_capacity(nodes.len());
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: Vec<(&StreamNode, usize)> = roots.into_iter().rev().map(|n| (n, 0)).collect();
    while let Some((node, depth)) = stack.pop() {
        if !visited.insert(node.stream.as_str()) {
            continue;
        }
        lines.push(format_node(node, depth));
        if let Some(kids) = children.get(node.stream.as_str()) {
            stack.extend(kids.iter().rev().map(|k| (*k, depth + 1)));
        }
    }
    // Parent cycles never reach a root; list them flat.
    for node in &nodes {
        if !visited.contains(node.stream.as_str()) {
            lines.push(format_node(node, 0));
        }
    }
    Some(lines.join("\n"))
}

fn format_node(node: &StreamNode, depth: usize) -> String {
    let indent = "  ".repeat(depth);
    if node.kind.is_empty() {
        format!("{indent}{}", node.stream)
    } else {
        format!("{indent}{} ({})", node.stream, node.kind)
    }
}
