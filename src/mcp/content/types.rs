//! Core content types for MCP tool responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Content item in tool result (MCP compatible).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentItem {
    /// Content type identifier
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

impl ContentItem {
    /// Create text content item.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content_type: "text".to_string(),
            text: text.into(),
        }
    }
}

/// Result of a tool call (MCP compatible).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ContentItem>,
    #[serde(rename = "structuredContent", skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl ToolResult {
    /// Plain text success, used by tools that return a bare string.
    pub fn success_text(message: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem::text(message)],
            structured_content: None,
            is_error: false,
        }
    }

    /// Structured result; the JSON is mirrored into a text item.
    pub fn structured<T: Serialize>(payload: &T, is_error: bool) -> Self {
        match serde_json::to_value(payload) {
            Ok(value) => Self {
                content: vec![ContentItem::text(value.to_string())],
                structured_content: Some(value),
                is_error,
            },
            Err(err) => Self::error(format!("failed to encode tool result: {err}")),
        }
    }

    /// Create error result.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem::text(message)],
            structured_content: None,
            is_error: true,
        }
    }
}
