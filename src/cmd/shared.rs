/*!
shared.rs - helpers shared by the `tools` and `call` subcommands.

  - lookup_tool: exact, then case-insensitive registry lookup
  - build_arguments: raw KEY=VALUE strings -> JSON arguments, typed by the tool's parameters
  - coerce_value: typed coercion by parameter kind
  - load_param_file_into_map: JSON / YAML parameter files
*/

use std::collections::HashMap;

use anyhow::{Context, Result, anyhow, bail};
use serde_json::{Map, Value};

use crate::mcp::registry::{self, ParamKind, ToolDef};
use crate::mcp::request::PATH_ARG;

/// Registry entry for `name`; exact match first, then case-insensitive.
pub fn lookup_tool(name: &str) -> Result<&'static ToolDef> {
    registry::find(name)
        .or_else(|| registry::find_case_insensitive(name))
        .ok_or_else(|| anyhow!("tool '{name}' not found (see `mcp-perforce tools`)"))
}

/// Build the JSON arguments object for `tool` from raw string values.
///
/// - Declared parameters are coerced by their schema type.
/// - `path` is passed through as a string for tools that accept it.
/// - Unknown keys are passed through as strings; the decoder ignores them.
/// - Missing required parameters are reported before anything runs.
pub fn build_arguments(tool: &ToolDef, provided: &HashMap<String, String>) -> Result<Map<String, Value>> {
    let mut remaining = provided.clone();
    let mut result = Map::new();

    for p in &tool.params {
        if let Some(raw) = remaining.remove(p.name) {
            result.insert(p.name.to_string(), coerce_value(&raw, p.kind));
        } else if p.required {
            bail!("missing required parameter: {}", p.name);
        }
    }
    if tool.takes_path
        && let Some(path) = remaining.remove(PATH_ARG)
    {
        result.insert(PATH_ARG.to_string(), Value::String(path));
    }
    for (k, v) in remaining {
        result.insert(k, Value::String(v));
    }
    Ok(result)
}

/// Coerce a raw string into a JSON value of the parameter's kind.
pub fn coerce_value(raw: &str, kind: ParamKind) -> Value {
    match kind {
        ParamKind::Boolean => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "y" => Value::Bool(true),
            "false" | "0" | "no" | "n" => Value::Bool(false),
            _ => Value::String(raw.to_string()),
        },
        // Comma separated: view mappings and file names may contain spaces.
        ParamKind::StringArray => Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(s.to_string()))
                .collect(),
        ),
        ParamKind::String | ParamKind::StreamType => Value::String(raw.to_string()),
    }
}

/// Merge a JSON or YAML (`.yaml` / `.yml`) object into `provided`.
/// Keys already present (from `--param`) win.
pub fn load_param_file_into_map(path: &str, provided: &mut HashMap<String, String>) -> Result<()> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("failed to read param file: {path}"))?;
    let lower = path.to_ascii_lowercase();

    let value: Value = if lower.ends_with(".yaml") || lower.ends_with(".yml") {
        let yaml: serde_yaml::Value = serde_yaml::from_str(&raw).context("failed to parse YAML param file")?;
        serde_json::to_value(yaml).context("failed to convert YAML to JSON")?
    } else {
        serde_json::from_str(&raw).context("failed to parse JSON param file")?
    };

    let obj = value
        .as_object()
        .ok_or_else(|| anyhow!("param file root must be an object"))?;

    for (k, v) in obj {
        if provided.contains_key(k) {
            continue;
        }
        let s = match v {
            Value::String(sv) => sv.clone(),
            // Lists become the comma form `coerce_value` splits again.
            Value::Array(items) => items
                .iter()
                .map(|i| match i {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            other => other.to_string(),
        };
        provided.insert(k.clone(), s);
    }
    Ok(())
}

/// Parse repeated `KEY=VALUE` flags.
pub fn parse_params(params: &[String]) -> Result<HashMap<String, String>> {
    let mut provided = HashMap::new();
    for kv in params {
        let Some((k, v)) = kv.split_once('=') else {
            bail!("invalid --param (expected KEY=VALUE): {kv}");
        };
        let key = k.trim();
        if key.is_empty() {
            bail!("invalid --param (empty key): {kv}");
        }
        provided.insert(key.to_string(), v.trim().to_string());
    }
    Ok(provided)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::request::names;
    use serde_json::json;
    use std::io::Write;

    fn provided(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn coerce_primitives() {
        assert_eq!(coerce_value("yes", ParamKind::Boolean), json!(true));
        assert_eq!(coerce_value("No", ParamKind::Boolean), json!(false));
        assert_eq!(coerce_value("maybe", ParamKind::Boolean), json!("maybe"));
        assert_eq!(coerce_value("42", ParamKind::String), json!("42"));
        assert_eq!(coerce_value("task", ParamKind::StreamType), json!("task"));
    }

    #[test]
    fn coerce_array_splits_on_commas_only() {
        assert_eq!(
            coerce_value("my file.txt, b.txt,", ParamKind::StringArray),
            json!(["my file.txt", "b.txt"])
        );
    }

    #[test]
    fn build_arguments_uses_param_kinds() {
        let tool = lookup_tool(names::SYNC).unwrap();
        let args = build_arguments(
            tool,
            &provided(&[("files", "//depot/a/...,//depot/b/..."), ("force", "y"), ("path", "/ws")]),
        )
        .unwrap();
        assert_eq!(args.get("files"), Some(&json!(["//depot/a/...", "//depot/b/..."])));
        assert_eq!(args.get("force"), Some(&json!(true)));
        assert_eq!(args.get("path"), Some(&json!("/ws")));
    }

    #[test]
    fn build_arguments_reports_missing_required() {
        let tool = lookup_tool(names::CLIENT_DELETE).unwrap();
        let err = build_arguments(tool, &HashMap::new()).unwrap_err();
        assert!(err.to_string().contains("missing required parameter: client"));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(lookup_tool("P4_INFO").unwrap().name, names::INFO);
        assert!(lookup_tool("p4_nope").is_err());
    }

    #[test]
    fn param_file_json_merge() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{ "changelist": 12, "description": "x", "files": ["a", "b"] }}"#).unwrap();
        let mut map = provided(&[("description", "override")]);
        load_param_file_into_map(file.path().to_str().unwrap(), &mut map).unwrap();
        assert_eq!(map.get("changelist").unwrap(), "12");
        assert_eq!(map.get("description").unwrap(), "override");
        assert_eq!(map.get("files").unwrap(), "a,b");
    }

    #[test]
    fn param_file_yaml() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "stream: //depot/dev\nforce: true").unwrap();
        let mut map = HashMap::new();
        load_param_file_into_map(file.path().to_str().unwrap(), &mut map).unwrap();
        assert_eq!(map.get("stream").unwrap(), "//depot/dev");
        assert_eq!(map.get("force").unwrap(), "true");
    }

    #[test]
    fn param_file_root_must_be_object() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "[1, 2]").unwrap();
        let err = load_param_file_into_map(file.path().to_str().unwrap(), &mut HashMap::new()).unwrap_err();
        assert!(err.to_string().contains("root must be an object"));
    }

    #[test]
    fn params_need_key_and_equals() {
        assert!(parse_params(&["client=ws".into()]).is_ok());
        assert!(parse_params(&["client".into()]).is_err());
        assert!(parse_params(&["=ws".into()]).is_err());
    }
}
