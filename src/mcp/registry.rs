//! Static tool catalog advertised through `tools/list`.
//!
//! Each entry is a `ToolDef`: name, description and parameter declarations.
//! The JSON input schema handed to MCP clients is generated from the
//! declarations, and the `call` subcommand coerces CLI strings with them.

use std::sync::{Arc, LazyLock};

use rmcp::model::Tool;
use serde_json::{Map, Value, json};

use crate::mcp::request::{PATH_ARG, names};
use crate::p4::spec::StreamType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    StringArray,
    Boolean,
    StreamType,
}

impl ParamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::String | ParamKind::StreamType => "string",
            ParamKind::StringArray => "array",
            ParamKind::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ParamDef {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
    pub required: bool,
}

#[derive(Debug, Clone)]
pub struct ToolDef {
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<ParamDef>,
    /// Accepts the shared `path` working-directory argument.
    pub takes_path: bool,
}

const fn req(name: &'static str, kind: ParamKind, description: &'static str) -> ParamDef {
    ParamDef {
        name,
        kind,
        description,
        required: true,
    }
}

const fn opt(name: &'static str, kind: ParamKind, description: &'static str) -> ParamDef {
    ParamDef {
        name,
        kind,
        description,
        required: false,
    }
}

fn tool(name: &'static str, description: &'static str, params: Vec<ParamDef>) -> ToolDef {
    ToolDef {
        name,
        description,
        params,
        takes_path: true,
    }
}

use ParamKind::{Boolean, String as Str, StringArray};

pub static TOOLS: LazyLock<Vec<ToolDef>> = LazyLock::new(|| {
    vec![
        // File operations
        tool(
            names::ADD,
            "Add files to Perforce",
            vec![req("files", StringArray, "Files to add (can use wildcards)")],
        ),
        tool(
            names::EDIT,
            "Open files for edit in Perforce",
            vec![req("files", StringArray, "Files to open for edit")],
        ),
        tool(
            names::DELETE,
            "Mark files for deletion in Perforce",
            vec![req("files", StringArray, "Files to delete")],
        ),
        tool(
            names::REVERT,
            "Revert files or changelist",
            vec![
                opt("files", StringArray, "Files to revert (optional)"),
                opt(
                    "changelist",
                    Str,
                    "Changelist to revert all files from (optional)",
                ),
            ],
        ),
        tool(
            names::SYNC,
            "Sync files from the depot",
            vec![
                opt(
                    "files",
                    StringArray,
                    "Specific files to sync (optional, syncs all if not provided)",
                ),
                opt("force", Boolean, "Force sync even if you have local changes"),
            ],
        ),
        tool(
            names::DIFF,
            "Show differences for files",
            vec![req("files", StringArray, "Files to diff")],
        ),
        // Changelist operations
        tool(
            names::CHANGELIST_CREATE,
            "Create a new changelist with a description",
            vec![req("description", Str, "Changelist description")],
        ),
        tool(
            names::CHANGELIST_SUBMIT,
            "Submit a changelist",
            vec![
                req(
                    "changelist",
                    Str,
                    "Changelist number to submit (or \"default\")",
                ),
                opt(
                    "description",
                    Str,
                    "Submit description (required for the default changelist, otherwise the changelist's own description is used)",
                ),
            ],
        ),
        tool(
            names::MOVE_TO_CHANGELIST,
            "Move files to a specific changelist",
            vec![
                req("files", StringArray, "Files to move"),
                req("changelist", Str, "Target changelist number"),
            ],
        ),
        // Info operations
        tool(
            names::STATUS,
            "Get current P4 workspace status and pending changes",
            vec![],
        ),
        tool(
            names::INFO,
            "Show Perforce configuration info for current directory",
            vec![],
        ),
        ToolDef {
            name: names::VERSION,
            description: "Show MCP Perforce server version",
            params: vec![],
            takes_path: false,
        },
        tool(
            names::RAW_COMMAND,
            "FOR DEBUGGING: Executes a raw p4 command and returns stdout/stderr",
            vec![req(
                "command",
                Str,
                "The full p4 command to run (e.g., 'p4 describe -s 1234')",
            )],
        ),
        // Stream operations
        tool(
            names::STREAM_LIST,
            "List all streams or streams matching a pattern",
            vec![
                opt(
                    "depot",
                    Str,
                    "Depot path to list streams from (e.g., //depot/...)",
                ),
                opt("filter", Str, "Filter pattern for stream names (optional)"),
            ],
        ),
        tool(
            names::STREAM_INFO,
            "Get detailed information about a specific stream",
            vec![req("stream", Str, "Stream path (e.g., //depot/main)")],
        ),
        tool(
            names::STREAM_SWITCH,
            "Switch workspace to a different stream",
            vec![
                req("stream", Str, "Target stream path (e.g., //depot/dev)"),
                opt("force", Boolean, "Force switch even with pending changes"),
            ],
        ),
        tool(
            names::STREAM_CREATE,
            "Create a new stream",
            vec![
                req(
                    "stream",
                    Str,
                    "New stream path (e.g., //depot/feature-xyz)",
                ),
                req(
                    "type",
                    ParamKind::StreamType,
                    "Stream type (mainline, development, release, virtual, task)",
                ),
                opt(
                    "parent",
                    Str,
                    "Parent stream path (ignored for mainline streams; omitted means no parent)",
                ),
                req("description", Str, "Stream description"),
                opt(
                    "options",
                    Str,
                    "Stream options (optional, defaults depend on the stream type)",
                ),
            ],
        ),
        tool(
            names::STREAM_EDIT,
            "Edit stream specification",
            vec![
                req("stream", Str, "Stream path to edit"),
                opt(
                    "spec",
                    Str,
                    "Stream specification content (optional, shows current spec if not provided)",
                ),
            ],
        ),
        tool(
            names::STREAM_GRAPH,
            "Show stream hierarchy graph",
            vec![opt("depot", Str, "Depot path to show streams from")],
        ),
        // Client operations
        tool(
            names::CLIENT_LIST,
            "List all clients/workspaces for the current user",
            vec![opt("user", Str, "Filter by specific user (optional)")],
        ),
        tool(
            names::CLIENT_INFO,
            "Get detailed information about a specific client/workspace",
            vec![opt(
                "client",
                Str,
                "Client/workspace name (optional, uses current if not specified)",
            )],
        ),
        tool(
            names::CLIENT_CREATE,
            "Create a new client/workspace",
            vec![
                req("client", Str, "Name for the new client/workspace"),
                req("root", Str, "Root directory for the client workspace"),
                opt(
                    "stream",
                    Str,
                    "Stream to associate with the client (optional)",
                ),
                opt(
                    "view",
                    StringArray,
                    "View mappings (e.g., [\"//depot/... //myclient/...\"])",
                ),
                opt("description", Str, "Client description (optional)"),
                opt(
                    "options",
                    StringArray,
                    "Client options (optional, e.g., [\"allwrite\", \"clobber\"])",
                ),
            ],
        ),
        tool(
            names::CLIENT_EDIT,
            "Edit an existing client/workspace specification",
            vec![
                req("client", Str, "Client/workspace name to edit"),
                opt(
                    "spec",
                    Str,
                    "Client specification content (optional, shows current spec if not provided)",
                ),
            ],
        ),
        tool(
            names::CLIENT_DELETE,
            "Delete a client/workspace",
            vec![
                req("client", Str, "Client/workspace name to delete"),
                opt(
                    "force",
                    Boolean,
                    "Force delete even if client has opened files",
                ),
            ],
        ),
        tool(
            names::CLIENT_SWITCH,
            "Switch to a different client/workspace",
            vec![req("client", Str, "Client/workspace name to switch to")],
        ),
    ]
});

impl ToolDef {
    pub fn required(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.params.iter().filter(|p| p.required).map(|p| p.name)
    }

    /// JSON Schema object describing the tool's arguments.
    pub fn input_schema(&self) -> Map<String, Value> {
        let mut properties = Map::new();
        for p in &self.params {
            let mut prop = json!({
                "type": p.kind.as_str(),
                "description": p.description,
            });
            match p.kind {
                ParamKind::StringArray => {
                    prop["items"] = json!({ "type": "string" });
                }
                ParamKind::StreamType => {
                    let variants: Vec<&str> = StreamType::ALL.iter().map(|t| t.as_str()).collect();
                    prop["enum"] = json!(variants);
                }
                _ => {}
            }
            properties.insert(p.name.to_string(), prop);
        }
        if self.takes_path {
            properties.insert(
                PATH_ARG.to_string(),
                json!({
                    "type": "string",
                    "description": "Working directory path (optional)",
                }),
            );
        }

        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(properties));
        let required: Vec<&str> = self.required().collect();
        if !required.is_empty() {
            schema.insert("required".into(), json!(required));
        }
        schema
    }

    pub fn to_tool(&self) -> Tool {
        Tool::new(self.name, self.description, Arc::new(self.input_schema()))
    }
}

/// Look a tool up by exact name.
pub fn find(name: &str) -> Option<&'static ToolDef> {
    TOOLS.iter().find(|t| t.name == name)
}

/// Case-insensitive lookup, for the CLI.
pub fn find_case_insensitive(name: &str) -> Option<&'static ToolDef> {
    let name = name.trim();
    TOOLS.iter().find(|t| t.name.eq_ignore_ascii_case(name))
}

/// The catalog in MCP form.
pub fn tools() -> Vec<Tool> {
    TOOLS.iter().map(ToolDef::to_tool).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::request::Request;
    use crate::p4::P4Error;
    use std::collections::HashSet;

    fn sample(kind: ParamKind) -> Value {
        match kind {
            ParamKind::String => json!("12"),
            ParamKind::StringArray => json!(["a.txt"]),
            ParamKind::Boolean => json!(true),
            ParamKind::StreamType => json!("development"),
        }
    }

    #[test]
    fn names_are_unique() {
        let mut seen = HashSet::new();
        for t in TOOLS.iter() {
            assert!(seen.insert(t.name), "duplicate tool {}", t.name);
        }
        assert_eq!(TOOLS.len(), 25);
    }

    #[test]
    fn every_tool_is_routable() {
        for t in TOOLS.iter() {
            let args: Map<String, Value> = t
                .params
                .iter()
                .filter(|p| p.required)
                .map(|p| (p.name.to_string(), sample(p.kind)))
                .collect();
            let req = Request::parse(t.name, Some(args))
                .unwrap_or_else(|e| panic!("{} rejected its required set: {e}", t.name));
            assert_eq!(req.operation.tool_name(), t.name);
        }
    }

    #[test]
    fn required_fields_match_decoder() {
        for t in TOOLS.iter() {
            let required: Vec<&ParamDef> = t.params.iter().filter(|p| p.required).collect();
            for missing in &required {
                let args: Map<String, Value> = required
                    .iter()
                    .filter(|p| p.name != missing.name)
                    .map(|p| (p.name.to_string(), sample(p.kind)))
                    .collect();
                match Request::parse(t.name, Some(args)) {
                    Err(P4Error::InvalidArguments { reason, .. }) => assert!(
                        reason.contains(missing.name),
                        "{}: error for missing `{}` was {reason}",
                        t.name,
                        missing.name
                    ),
                    other => panic!("{} accepted missing `{}`: {other:?}", t.name, missing.name),
                }
            }
        }
    }

    #[test]
    fn schema_shape() {
        let create = find(names::STREAM_CREATE).unwrap().input_schema();
        assert_eq!(create["type"], json!("object"));
        assert_eq!(create["required"], json!(["stream", "type", "description"]));
        assert_eq!(
            create["properties"]["type"]["enum"],
            json!(["mainline", "development", "release", "virtual", "task"])
        );
        assert!(create["properties"].get("path").is_some());
        let parent = create["properties"]["parent"]["description"].as_str().unwrap();
        assert!(parent.contains("ignored for mainline"));
        assert!(!parent.contains("required"));

        let add = find(names::ADD).unwrap().input_schema();
        assert_eq!(add["properties"]["files"]["items"], json!({"type": "string"}));

        let version = find(names::VERSION).unwrap().input_schema();
        assert!(version.get("required").is_none());
        assert_eq!(version["properties"], json!({}));
    }

    #[test]
    fn lookup_helpers() {
        assert!(find("p4_add").is_some());
        assert!(find("P4_ADD").is_none());
        assert_eq!(find_case_insensitive(" P4_ADD ").map(|t| t.name), Some("p4_add"));
        assert_eq!(tools().len(), TOOLS.len());
    }
}
