//! Tool call decoding.
//!
//! A tool name plus its JSON arguments become one `Request`: a closed
//! `Operation` variant carrying a typed argument record, and the optional
//! working directory taken from the shared `path` argument. Shape errors
//! (missing field, wrong type, unknown enum value) surface as
//! `P4Error::InvalidArguments`; unknown names as `P4Error::UnknownTool`.

use std::path::PathBuf;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::p4::P4Error;
use crate::p4::spec::StreamType;

/// Tool names, in registry order.
pub mod names {
    pub const ADD: &str = "p4_add";
    pub const EDIT: &str = "p4_edit";
    pub const DELETE: &str = "p4_delete";
    pub const REVERT: &str = "p4_revert";
    pub const SYNC: &str = "p4_sync";
    pub const DIFF: &str = "p4_diff";
    pub const CHANGELIST_CREATE: &str = "p4_changelist_create";
    pub const CHANGELIST_SUBMIT: &str = "p4_changelist_submit";
    pub const MOVE_TO_CHANGELIST: &str = "p4_move_to_changelist";
    pub const STATUS: &str = "p4_status";
    pub const INFO: &str = "p4_info";
    pub const VERSION: &str = "mcp_perforce_version";
    pub const RAW_COMMAND: &str = "p4_raw_command";
    pub const STREAM_LIST: &str = "p4_stream_list";
    pub const STREAM_INFO: &str = "p4_stream_info";
    pub const STREAM_SWITCH: &str = "p4_stream_switch";
    pub const STREAM_CREATE: &str = "p4_stream_create";
    pub const STREAM_EDIT: &str = "p4_stream_edit";
    pub const STREAM_GRAPH: &str = "p4_stream_graph";
    pub const CLIENT_LIST: &str = "p4_client_list";
    pub const CLIENT_INFO: &str = "p4_client_info";
    pub const CLIENT_CREATE: &str = "p4_client_create";
    pub const CLIENT_EDIT: &str = "p4_client_edit";
    pub const CLIENT_DELETE: &str = "p4_client_delete";
    pub const CLIENT_SWITCH: &str = "p4_client_switch";
}

/// Argument name every tool (except the version query) accepts as working directory.
pub const PATH_ARG: &str = "path";

/* ---- Shared argument shapes ---- */

/// File arguments: a JSON array, or one space-separated string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileList(pub Vec<String>);

impl FileList {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for FileList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(
            untagged,
            expecting = "an array of file paths or a space-separated string"
        )]
        enum Raw {
            List(Vec<String>),
            Joined(String),
        }

        let files = match Raw::deserialize(deserializer)? {
            Raw::List(list) => list
                .into_iter()
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect(),
            Raw::Joined(joined) => joined.split_whitespace().map(String::from).collect(),
        };
        Ok(FileList(files))
    }
}

/// Post-decode checks serde cannot express (non-blank strings, non-empty lists).
trait Validate {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

fn non_blank(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("`{field}` must not be empty"))
    } else {
        Ok(())
    }
}

/// Values pasted after `Field:` in a spec document must stay on one line.
fn single_line(field: &str, value: &str) -> Result<(), String> {
    if value.contains(['\n', '\r']) {
        Err(format!("`{field}` must not contain line breaks"))
    } else {
        Ok(())
    }
}

fn single_line_opt(field: &str, value: Option<&str>) -> Result<(), String> {
    value.map_or(Ok(()), |v| single_line(field, v))
}

fn single_line_each(field: &str, values: Option<&[String]>) -> Result<(), String> {
    values
        .unwrap_or_default()
        .iter()
        .try_for_each(|v| single_line(field, v))
}

fn non_empty_files(files: &FileList) -> Result<(), String> {
    if files.is_empty() {
        Err("`files` must list at least one file".into())
    } else {
        Ok(())
    }
}

/* ---- Per-operation argument records ---- */

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FilesArgs {
    pub files: FileList,
}

impl Validate for FilesArgs {
    fn validate(&self) -> Result<(), String> {
        non_empty_files(&self.files)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RevertArgs {
    pub files: Option<FileList>,
    pub changelist: Option<String>,
}

impl Validate for RevertArgs {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SyncArgs {
    pub files: Option<FileList>,
    #[serde(default)]
    pub force: bool,
}

impl Validate for SyncArgs {}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangelistCreateArgs {
    pub description: String,
}

impl Validate for ChangelistCreateArgs {
    fn validate(&self) -> Result<(), String> {
        non_blank("description", &self.description)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmitArgs {
    pub changelist: String,
    pub description: Option<String>,
}

impl SubmitArgs {
    pub fn is_default_changelist(&self) -> bool {
        self.changelist.trim().eq_ignore_ascii_case("default")
    }
}

impl Validate for SubmitArgs {
    fn validate(&self) -> Result<(), String> {
        non_blank("changelist", &self.changelist)?;
        let has_description = self
            .description
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty());
        if self.is_default_changelist() && !has_description {
            return Err("`description` is required when submitting the default changelist".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MoveArgs {
    pub files: FileList,
    pub changelist: String,
}

impl Validate for MoveArgs {
    fn validate(&self) -> Result<(), String> {
        non_empty_files(&self.files)?;
        non_blank("changelist", &self.changelist)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClientListArgs {
    pub user: Option<String>,
}

impl Validate for ClientListArgs {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClientInfoArgs {
    pub client: Option<String>,
}

impl Validate for ClientInfoArgs {}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientCreateArgs {
    pub client: String,
    pub root: String,
    pub stream: Option<String>,
    pub view: Option<Vec<String>>,
    pub description: Option<String>,
    pub options: Option<Vec<String>>,
}

impl Validate for ClientCreateArgs {
    fn validate(&self) -> Result<(), String> {
        non_blank("client", &self.client)?;
        non_blank("root", &self.root)?;
        single_line("client", &self.client)?;
        single_line("root", &self.root)?;
        single_line_opt("stream", self.stream.as_deref())?;
        single_line_each("view", self.view.as_deref())?;
        single_line_each("options", self.options.as_deref())
    }
}

/// Edit a client or stream: show the current spec, or apply a replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecEditArgs {
    pub target: String,
    pub spec: Option<String>,
}

#[derive(Deserialize)]
struct ClientEditRaw {
    client: String,
    spec: Option<String>,
}

#[derive(Deserialize)]
struct StreamEditRaw {
    stream: String,
    spec: Option<String>,
}

impl Validate for ClientEditRaw {
    fn validate(&self) -> Result<(), String> {
        non_blank("client", &self.client)
    }
}

impl Validate for StreamEditRaw {
    fn validate(&self) -> Result<(), String> {
        non_blank("stream", &self.stream)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientDeleteArgs {
    pub client: String,
    #[serde(default)]
    pub force: bool,
}

impl Validate for ClientDeleteArgs {
    fn validate(&self) -> Result<(), String> {
        non_blank("client", &self.client)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSwitchArgs {
    pub client: String,
}

impl Validate for ClientSwitchArgs {
    fn validate(&self) -> Result<(), String> {
        non_blank("client", &self.client)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StreamListArgs {
    pub depot: Option<String>,
    pub filter: Option<String>,
}

impl Validate for StreamListArgs {}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StreamInfoArgs {
    pub stream: String,
}

impl Validate for StreamInfoArgs {
    fn validate(&self) -> Result<(), String> {
        non_blank("stream", &self.stream)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StreamSwitchArgs {
    pub stream: String,
    #[serde(default)]
    pub force: bool,
}

impl Validate for StreamSwitchArgs {
    fn validate(&self) -> Result<(), String> {
        non_blank("stream", &self.stream)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StreamCreateArgs {
    pub stream: String,
    #[serde(rename = "type")]
    pub stream_type: StreamType,
    pub parent: Option<String>,
    pub description: String,
    pub options: Option<String>,
}

impl Validate for StreamCreateArgs {
    fn validate(&self) -> Result<(), String> {
        non_blank("stream", &self.stream)?;
        non_blank("description", &self.description)?;
        single_line("stream", &self.stream)?;
        single_line_opt("parent", self.parent.as_deref())?;
        single_line_opt("options", self.options.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StreamGraphArgs {
    pub depot: Option<String>,
}

impl Validate for StreamGraphArgs {}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawCommandArgs {
    pub command: String,
}

impl Validate for RawCommandArgs {
    fn validate(&self) -> Result<(), String> {
        non_blank("command", &self.command)
    }
}

/* ---- Operation / Request ---- */

/// Every supported tool, with its decoded arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Add(FilesArgs),
    Edit(FilesArgs),
    Delete(FilesArgs),
    Revert(RevertArgs),
    Sync(SyncArgs),
    Diff(FilesArgs),
    ChangelistCreate(ChangelistCreateArgs),
    ChangelistSubmit(SubmitArgs),
    MoveToChangelist(MoveArgs),
    Status,
    Info,
    Version,
    RawCommand(RawCommandArgs),
    StreamList(StreamListArgs),
    StreamInfo(StreamInfoArgs),
    StreamSwitch(StreamSwitchArgs),
    StreamCreate(StreamCreateArgs),
    StreamEdit(SpecEditArgs),
    StreamGraph(StreamGraphArgs),
    ClientList(ClientListArgs),
    ClientInfo(ClientInfoArgs),
    ClientCreate(ClientCreateArgs),
    ClientEdit(SpecEditArgs),
    ClientDelete(ClientDeleteArgs),
    ClientSwitch(ClientSwitchArgs),
}

impl Operation {
    pub fn tool_name(&self) -> &'static str {
        match self {
            Operation::Add(_) => names::ADD,
            Operation::Edit(_) => names::EDIT,
            Operation::Delete(_) => names::DELETE,
            Operation::Revert(_) => names::REVERT,
            Operation::Sync(_) => names::SYNC,
            Operation::Diff(_) => names::DIFF,
            Operation::ChangelistCreate(_) => names::CHANGELIST_CREATE,
            Operation::ChangelistSubmit(_) => names::CHANGELIST_SUBMIT,
            Operation::MoveToChangelist(_) => names::MOVE_TO_CHANGELIST,
            Operation::Status => names::STATUS,
            Operation::Info => names::INFO,
            Operation::Version => names::VERSION,
            Operation::RawCommand(_) => names::RAW_COMMAND,
            Operation::StreamList(_) => names::STREAM_LIST,
            Operation::StreamInfo(_) => names::STREAM_INFO,
            Operation::StreamSwitch(_) => names::STREAM_SWITCH,
            Operation::StreamCreate(_) => names::STREAM_CREATE,
            Operation::StreamEdit(_) => names::STREAM_EDIT,
            Operation::StreamGraph(_) => names::STREAM_GRAPH,
            Operation::ClientList(_) => names::CLIENT_LIST,
            Operation::ClientInfo(_) => names::CLIENT_INFO,
            Operation::ClientCreate(_) => names::CLIENT_CREATE,
            Operation::ClientEdit(_) => names::CLIENT_EDIT,
            Operation::ClientDelete(_) => names::CLIENT_DELETE,
            Operation::ClientSwitch(_) => names::CLIENT_SWITCH,
        }
    }
}

/// One decoded tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub operation: Operation,
    pub working_dir: Option<PathBuf>,
}

impl Request {
    /// Decode `name` + `arguments`. Missing arguments behave like `{}`.
    pub fn parse(name: &str, arguments: Option<Map<String, Value>>) -> Result<Self, P4Error> {
        let arguments = arguments.unwrap_or_default();
        let working_dir = working_dir(name, &arguments)?;
        let value = Value::Object(arguments);

        let operation = match name {
            names::ADD => Operation::Add(decode(name, value)?),
            names::EDIT => Operation::Edit(decode(name, value)?),
            names::DELETE => Operation::Delete(decode(name, value)?),
            names::REVERT => Operation::Revert(decode(name, value)?),
            names::SYNC => Operation::Sync(decode(name, value)?),
            names::DIFF => Operation::Diff(decode(name, value)?),
            names::CHANGELIST_CREATE => Operation::ChangelistCreate(decode(name, value)?),
            names::CHANGELIST_SUBMIT => Operation::ChangelistSubmit(decode(name, value)?),
            names::MOVE_TO_CHANGELIST => Operation::MoveToChangelist(decode(name, value)?),
            names::STATUS => Operation::Status,
            names::INFO => Operation::Info,
            names::VERSION => Operation::Version,
            names::RAW_COMMAND => Operation::RawCommand(decode(name, value)?),
            names::STREAM_LIST => Operation::StreamList(decode(name, value)?),
            names::STREAM_INFO => Operation::StreamInfo(decode(name, value)?),
            names::STREAM_SWITCH => Operation::StreamSwitch(decode(name, value)?),
            names::STREAM_CREATE => Operation::StreamCreate(decode(name, value)?),
            names::STREAM_EDIT => {
                let raw: StreamEditRaw = decode(name, value)?;
                Operation::StreamEdit(SpecEditArgs {
                    target: raw.stream,
                    spec: raw.spec,
                })
            }
            names::STREAM_GRAPH => Operation::StreamGraph(decode(name, value)?),
            names::CLIENT_LIST => Operation::ClientList(decode(name, value)?),
            names::CLIENT_INFO => Operation::ClientInfo(decode(name, value)?),
            names::CLIENT_CREATE => Operation::ClientCreate(decode(name, value)?),
            names::CLIENT_EDIT => {
                let raw: ClientEditRaw = decode(name, value)?;
                Operation::ClientEdit(SpecEditArgs {
                    target: raw.client,
                    spec: raw.spec,
                })
            }
            names::CLIENT_DELETE => Operation::ClientDelete(decode(name, value)?),
            names::CLIENT_SWITCH => Operation::ClientSwitch(decode(name, value)?),
            other => return Err(P4Error::UnknownTool(other.to_string())),
        };

        Ok(Request {
            operation,
            working_dir,
        })
    }
}

fn working_dir(tool: &str, arguments: &Map<String, Value>) -> Result<Option<PathBuf>, P4Error> {
    match arguments.get(PATH_ARG) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(PathBuf::from(s.trim()))),
        Some(_) => Err(P4Error::invalid(tool, "`path` must be a string")),
    }
}

fn decode<T>(tool: &str, value: Value) -> Result<T, P4Error>
where
    T: DeserializeOwned + Validate,
{
    let args: T = serde_json::from_value(value).map_err(|e| P4Error::invalid(tool, e.to_string()))?;
    args.validate().map_err(|reason| P4Error::invalid(tool, reason))?;
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(v: Value) -> Option<Map<String, Value>> {
        v.as_object().cloned()
    }

    #[test]
    fn files_accepts_array_or_joined_string() {
        let a = Request::parse(names::ADD, args(json!({"files": ["a.txt", "b.txt"]}))).unwrap();
        let b = Request::parse(names::ADD, args(json!({"files": "a.txt  b.txt"}))).unwrap();
        assert_eq!(a.operation, b.operation);
        match a.operation {
            Operation::Add(f) => assert_eq!(f.files.0, vec!["a.txt", "b.txt"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_required_field_is_invalid_arguments() {
        let err = Request::parse(names::ADD, None).unwrap_err();
        assert!(matches!(err, P4Error::InvalidArguments { .. }));
        assert!(err.to_string().contains("missing field `files`"));
    }

    #[test]
    fn wrong_shape_is_rejected() {
        let err = Request::parse(names::ADD, args(json!({"files": 42}))).unwrap_err();
        assert!(err.to_string().contains("array of file paths"));
        let err = Request::parse(names::SYNC, args(json!({"force": "yes"}))).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn empty_file_list_is_rejected() {
        let err = Request::parse(names::EDIT, args(json!({"files": []}))).unwrap_err();
        assert!(err.to_string().contains("at least one file"));
    }

    #[test]
    fn path_becomes_working_dir() {
        let req = Request::parse(names::INFO, args(json!({"path": " /work/ws "}))).unwrap();
        assert_eq!(req.working_dir, Some(PathBuf::from("/work/ws")));
        let err = Request::parse(names::INFO, args(json!({"path": 7}))).unwrap_err();
        assert!(err.to_string().contains("`path` must be a string"));
    }

    #[test]
    fn stream_type_enum_is_enforced() {
        let err = Request::parse(
            names::STREAM_CREATE,
            args(json!({"stream": "//s/x", "type": "feature", "description": "d"})),
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown variant `feature`"));
    }

    #[test]
    fn default_changelist_submit_needs_description() {
        let err = Request::parse(names::CHANGELIST_SUBMIT, args(json!({"changelist": "default"})))
            .unwrap_err();
        assert!(err.to_string().contains("description"));
        assert!(
            Request::parse(names::CHANGELIST_SUBMIT, args(json!({"changelist": "12"}))).is_ok()
        );
    }

    #[test]
    fn blank_required_string_is_rejected() {
        let err = Request::parse(names::CLIENT_DELETE, args(json!({"client": "  "}))).unwrap_err();
        assert!(err.to_string().contains("`client` must not be empty"));
    }

    #[test]
    fn client_spec_fields_must_stay_on_one_line() {
        let err = Request::parse(
            names::CLIENT_CREATE,
            args(json!({
                "client": "ws",
                "root": "/ws\n\nHost:\tevilhost\n\nView:\n\t//secret/... //ws/secret/...",
            })),
        )
        .unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("`root` must not contain line breaks"));

        let err = Request::parse(
            names::CLIENT_CREATE,
            args(json!({
                "client": "ws",
                "root": "/ws",
                "view": ["//depot/... //ws/...", "//a/... //ws/a/...\r\nHost:\tx"],
            })),
        )
        .unwrap_err();
        assert!(err.to_string().contains("`view` must not contain line breaks"));

        let err = Request::parse(
            names::CLIENT_CREATE,
            args(json!({"client": "ws", "root": "/ws", "options": ["allwrite\nHost:\tx"]})),
        )
        .unwrap_err();
        assert!(err.to_string().contains("`options`"));

        let ok = Request::parse(
            names::CLIENT_CREATE,
            args(json!({"client": "ws", "root": "/ws", "description": "two\nlines"})),
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn stream_spec_fields_must_stay_on_one_line() {
        let base = json!({"stream": "//depot/dev", "type": "development", "description": "multi\nline ok"});
        assert!(Request::parse(names::STREAM_CREATE, args(base.clone())).is_ok());

        for (field, value) in [
            ("stream", "//depot/dev\nOwner: mallory"),
            ("parent", "//depot/main\n\nPaths:\n\tshare //secret/..."),
            ("options", "allsubmit\rlocked"),
        ] {
            let mut v = base.clone();
            v[field] = json!(value);
            let err = Request::parse(names::STREAM_CREATE, args(v)).unwrap_err();
            assert!(
                err.to_string().contains(&format!("`{field}` must not contain line breaks")),
                "{field}: {err}"
            );
        }
    }

    #[test]
    fn edit_tools_share_argument_record() {
        let req = Request::parse(names::CLIENT_EDIT, args(json!({"client": "ws"}))).unwrap();
        assert_eq!(
            req.operation,
            Operation::ClientEdit(SpecEditArgs {
                target: "ws".into(),
                spec: None
            })
        );
    }

    #[test]
    fn unknown_tool() {
        let err = Request::parse("p4_obliterate", None).unwrap_err();
        assert!(matches!(err, P4Error::UnknownTool(ref n) if n == "p4_obliterate"));
    }

    #[test]
    fn tool_name_round_trips() {
        let req = Request::parse(names::VERSION, None).unwrap();
        assert_eq!(req.operation.tool_name(), names::VERSION);
    }
}
