use rmcp::model::{CallToolResult, Content};
use serde::Serialize;

use crate::p4::P4Error;

/// One text block of a tool response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextBlock {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

/// Uniform tool response: `{"content":[{"type":"text","text":...}]}`.
///
/// Failures use the same shape; `is_error` only drives the MCP `isError`
/// flag and is not part of the serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope {
    pub content: Vec<TextBlock>,
    #[serde(skip)]
    pub is_error: bool,
}

impl Envelope {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![TextBlock {
                kind: "text",
                text: text.into(),
            }],
            is_error: false,
        }
    }

    pub fn failure(err: &P4Error) -> Self {
        Self {
            is_error: true,
            ..Self::text(format!("Error: {err}"))
        }
    }

    /// Text of the (single) block.
    pub fn body(&self) -> &str {
        self.content.first().map(|b| b.text.as_str()).unwrap_or("")
    }
}

impl From<Envelope> for CallToolResult {
    fn from(envelope: Envelope) -> Self {
        let content = envelope
            .content
            .into_iter()
            .map(|b| Content::text(b.text))
            .collect();
        if envelope.is_error {
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        }
    }
}
