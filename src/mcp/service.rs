//! MCP Service - Core JSON-RPC 2.0 request handler.

use crate::mcp::rpc::{OutboundResponse, RpcRequest, INTERNAL_ERROR, JSONRPC_VERSION};
use crate::mcp::tools::registry::ToolDescriptor;
use crate::mcp::tools::ToolRegistry;
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

pub const PROTOCOL_VERSION: &str = "2025-06-18";

/// Versions a client may negotiate; anything else gets [`PROTOCOL_VERSION`].
pub const SUPPORTED_PROTOCOL_VERSIONS: [&str; 3] =
    ["2024-11-05", "2025-03-26", PROTOCOL_VERSION];

/// Core MCP request handler.
#[derive(Clone)]
pub struct McpService {
    registry: Arc<ToolRegistry>,
}

impl McpService {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub async fn handle_request(&self, request: RpcRequest) -> Option<OutboundResponse> {
        let is_notification = request.is_notification();

        if request.jsonrpc != JSONRPC_VERSION {
            warn!("received unsupported jsonrpc version: {}", request.jsonrpc);
            // Notifications never get a response, not even an error.
            if is_notification {
                return None;
            }
            return Some(OutboundResponse::invalid_request(
                request.id.clone(),
                "Unsupported jsonrpc version (expected 2.0)",
            ));
        }

        let RpcRequest {
            method, params, id, ..
        } = request;

        match method.as_str() {
            "initialize" => Some(self.handle_initialize(id, params)),
            "tools/list" => Some(self.handle_list_tools(id)),
            "tools/call" => Some(self.handle_call_tool(id, params).await),
            "resources/list" => Some(empty_list(id, "resources")),
            "resources/templates/list" => Some(empty_list(id, "resourceTemplates")),
            "prompts/list" => Some(empty_list(id, "prompts")),
            "ping" => Some(OutboundResponse::success(id, json!({}))),
            method if method.starts_with("notifications/") => {
                info!("received client notification: {}", method);
                None
            }
            _ if is_notification => {
                warn!("ignoring unknown notification: {}", method);
                None
            }
            other => Some(OutboundResponse::method_not_found(id, other)),
        }
    }

    fn handle_initialize(&self, id: Option<Value>, params: Option<Value>) -> OutboundResponse {
        let parsed: InitializeParams = match parse_params(params) {
            Ok(value) => value,
            Err(message) => return OutboundResponse::invalid_params(id, message),
        };

        let client = parsed.client_info.unwrap_or_default();
        info!(
            "client requested initialization: {} v{} (protocol {})",
            client.name.as_deref().unwrap_or("unknown"),
            client.version.as_deref().unwrap_or("unknown"),
            parsed.protocol_version
        );

        let protocol_version =
            if SUPPORTED_PROTOCOL_VERSIONS.contains(&parsed.protocol_version.as_str()) {
                parsed.protocol_version
            } else {
                PROTOCOL_VERSION.to_string()
            };

        let result = InitializeResult {
            protocol_version,
            server_info: ImplementationInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("Document to PDF MCP Server".to_string()),
            },
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
        };

        respond(id, &result)
    }

    fn handle_list_tools(&self, id: Option<Value>) -> OutboundResponse {
        let payload = ListToolsResult {
            tools: self.registry.list_tools(),
            next_cursor: None,
        };

        respond(id, &payload)
    }

    async fn handle_call_tool(&self, id: Option<Value>, params: Option<Value>) -> OutboundResponse {
        let parsed: CallToolParams = match parse_params(params) {
            Ok(value) => value,
            Err(message) => return OutboundResponse::invalid_params(id, message),
        };

        info!("calling tool: {}", parsed.name);
        let result = self.registry.call_tool(&parsed.name, parsed.arguments).await;
        respond(id, &result)
    }
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct InitializeParams {
    #[serde(rename = "protocolVersion")]
    protocol_version: String,
    #[serde(rename = "clientInfo", default)]
    client_info: Option<ClientInfo>,
}

#[derive(Debug, Default, Deserialize)]
struct ClientInfo {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Serialize)]
struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    protocol_version: String,
    #[serde(rename = "serverInfo")]
    server_info: ImplementationInfo,
    capabilities: ServerCapabilities,
}

#[derive(Debug, Serialize)]
struct ImplementationInfo {
    name: String,
    version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
}

#[derive(Debug, Serialize)]
struct ServerCapabilities {
    tools: ToolsCapability,
}

#[derive(Debug, Serialize)]
struct ToolsCapability {
    #[serde(rename = "listChanged")]
    list_changed: bool,
}

#[derive(Debug, Serialize)]
struct ListToolsResult {
    tools: Vec<ToolDescriptor>,
    #[serde(rename = "nextCursor")]
    #[serde(skip_serializing_if = "Option::is_none")]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

fn empty_list(id: Option<Value>, key: &str) -> OutboundResponse {
    OutboundResponse::success(id, json!({ key: [] }))
}

fn respond<T: Serialize>(id: Option<Value>, payload: &T) -> OutboundResponse {
    match serde_json::to_value(payload) {
        Ok(value) => OutboundResponse::success(id, value),
        Err(err) => {
            OutboundResponse::error(id, INTERNAL_ERROR, format!("failed to encode result: {err}"))
        }
    }
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, String> {
    match params {
        Some(value) => serde_json::from_value(value).map_err(|err| err.to_string()),
        None => serde_json::from_value(Value::Null).map_err(|err| err.to_string()),
    }
}
