//! Perforce specification documents.
//!
//! Pure text builders for the forms `p4 change -i`, `p4 client -i` and
//! `p4 stream -i` read on stdin, plus the small parsers that pull values
//! back out of `p4` output (owner, created changelist number).

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

/// Client options used when the caller supplies none.
pub const DEFAULT_CLIENT_OPTIONS: [&str; 6] = [
    "noallwrite",
    "noclobber",
    "nocompress",
    "unlocked",
    "nomodtime",
    "normdir",
];

/// Owner recorded when `p4 user -o` yields no `User:` line.
pub const UNKNOWN_OWNER: &str = "unknown";

static USER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^User:\s+(\S+)").expect("valid regex"));

static CHANGE_CREATED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Change (\d+) created").expect("valid regex"));

/// Multi-line values continue on tab-indented lines.
fn indent(text: &str) -> String {
    text.replace('\n', "\n\t")
}

/// `Change: new` form with a tab-indented description block.
pub fn changelist_spec(description: &str) -> String {
    format!("Change: new\n\nDescription:\n\t{}\n", indent(description))
}

/// Changelist number from `p4 change -i` output ("Change 123 created.").
pub fn parse_created_changelist(output: &str) -> Option<&str> {
    CHANGE_CREATED
        .captures(output)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// User name from `p4 user -o` output.
pub fn parse_owner(user_spec: &str) -> Option<&str> {
    USER_LINE
        .captures(user_spec)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Fields of a new client workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientSpec {
    pub name: String,
    pub root: String,
    pub owner: String,
    pub description: Option<String>,
    pub options: Option<Vec<String>>,
    pub stream: Option<String>,
    pub view: Option<Vec<String>>,
}

impl ClientSpec {
    pub fn render(&self) -> String {
        let description = match &self.description {
            Some(d) => indent(d),
            None => format!("Created by {}.", self.owner),
        };
        let options = match &self.options {
            Some(opts) if !opts.is_empty() => opts.join(" "),
            _ => DEFAULT_CLIENT_OPTIONS.join(" "),
        };

        let mut spec = String::new();
        spec.push_str(&format!("Client:\t{}\n\n", self.name));
        spec.push_str(&format!("Owner:\t{}\n\n", self.owner));
        spec.push_str(&format!("Description:\n\t{description}\n\n"));
        spec.push_str(&format!("Root:\t{}\n\n", self.root));
        spec.push_str(&format!("Options:\t{options}\n\n"));
        spec.push_str("SubmitOptions:\tsubmitunchanged\n\n");
        spec.push_str("LineEnd:\tlocal\n\n");

        match (&self.stream, &self.view) {
            (Some(stream), _) => spec.push_str(&format!("Stream:\t{stream}\n")),
            (None, Some(view)) if !view.is_empty() => {
                spec.push_str("View:\n");
                for mapping in view {
                    spec.push_str(&format!("\t{mapping}\n"));
                }
            }
            _ => spec.push_str(&format!("View:\n\t//depot/... //{}/...\n", self.name)),
        }
        spec
    }
}

/// Stream types accepted by `p4 stream`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamType {
    Mainline,
    Development,
    Release,
    Virtual,
    Task,
}

impl StreamType {
    pub const ALL: [StreamType; 5] = [
        StreamType::Mainline,
        StreamType::Development,
        StreamType::Release,
        StreamType::Virtual,
        StreamType::Task,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StreamType::Mainline => "mainline",
            StreamType::Development => "development",
            StreamType::Release => "release",
            StreamType::Virtual => "virtual",
            StreamType::Task => "task",
        }
    }

    /// Merge/copy flow options a fresh stream of this type gets.
    pub fn default_options(&self) -> &'static str {
        match self {
            StreamType::Mainline => "allsubmit unlocked notoparent nofromparent mergedown",
            StreamType::Development | StreamType::Task => {
                "allsubmit unlocked toparent fromparent mergedown"
            }
            StreamType::Release => "allsubmit unlocked notoparent fromparent mergedown",
            StreamType::Virtual => "allsubmit unlocked notoparent nofromparent mergeany",
        }
    }
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields of a new stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSpec {
    pub path: String,
    pub stream_type: StreamType,
    pub parent: Option<String>,
    pub description: String,
    pub owner: String,
    pub options: Option<String>,
}

impl StreamSpec {
    /// Last path segment: `//depot/feature-x` -> `feature-x`.
    pub fn short_name(&self) -> &str {
        let trimmed = self.path.trim_end_matches('/');
        trimmed.rsplit('/').next().unwrap_or(trimmed)
    }

    /// Parent written to the spec; mainlines never have one.
    pub fn effective_parent(&self) -> &str {
        match (&self.stream_type, &self.parent) {
            (StreamType::Mainline, _) => "none",
            (_, Some(parent)) if !parent.trim().is_empty() => parent.as_str(),
            _ => "none",
        }
    }

    pub fn render(&self) -> String {
        let parent = self.effective_parent();
        let options = match &self.options {
            Some(o) if !o.trim().is_empty() => o.trim(),
            _ => self.stream_type.default_options(),
        };

        let mut spec = String::new();
        spec.push_str(&format!("Stream: {}\n\n", self.path));
        spec.push_str(&format!("Owner: {}\n\n", self.owner));
        spec.push_str(&format!("Name: {}\n\n", self.short_name()));
        spec.push_str(&format!("Parent: {parent}\n\n"));
        spec.push_str(&format!("Type: {}\n\n", self.stream_type));
        spec.push_str(&format!("Description:\n\t{}\n\n", indent(&self.description)));
        spec.push_str(&format!("Options: {options}\n\n"));
        if parent != "none" {
            spec.push_str("ParentView: inherit\n\n");
        }
        spec.push_str("Paths:\n\tshare ...\n");
        spec
    }
}
