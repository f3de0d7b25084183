//! MCP Tools module - defines tools exposed via JSON-RPC.
//!
//! Each tool provides:
//! - Tool descriptor (name, description, input schema)
//! - Argument parsing and validation
//! - Execution and result formatting

mod give_pdf;
mod health;
pub mod registry;
mod validate;

pub use registry::ToolRegistry;
