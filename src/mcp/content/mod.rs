//! Content types module for MCP tool responses.
//!
//! Tool results carry a text rendering for any client plus the same payload as
//! `structuredContent` for clients that read JSON directly.

pub mod file;
pub mod types;

pub use file::DocumentKind;
pub use types::{ContentItem, ToolResult};
