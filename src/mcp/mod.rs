//! MCP (Model Context Protocol) Module
//!
//! Provides JSON-RPC 2.0 over stateless HTTP for the chat assistant.

pub mod content;
pub mod conversion;
pub mod handlers;
pub mod rpc;
pub mod service;
pub mod tools;

pub use handlers::{config, McpState};
pub use service::McpService;
