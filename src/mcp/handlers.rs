//! MCP Stateless HTTP Handlers for Actix-Web.
//!
//! Each POST carries one JSON-RPC message and gets one JSON response;
//! no SSE connections are maintained.

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde_json::json;
use std::sync::Arc;

use crate::auth::validate_request_token;
use crate::mcp::rpc::{OutboundResponse, RpcRequest};
use crate::mcp::service::McpService;

/// MCP State for Actix-Web
pub struct McpState {
    pub service: McpService,
    auth_token: String,
}

impl McpState {
    pub fn new(service: McpService, auth_token: impl Into<String>) -> Self {
        Self {
            service,
            auth_token: auth_token.into(),
        }
    }
}

/// RPC handler - POST /mcp
pub async fn rpc_handler(
    req: HttpRequest,
    state: web::Data<Arc<McpState>>,
    body: web::Bytes,
) -> impl Responder {
    if let Err(err) = validate_request_token(&req, &state.auth_token) {
        return HttpResponse::Unauthorized().json(json!({
            "error": "Unauthorized",
            "message": err.to_string(),
        }));
    }

    let request: RpcRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            log::warn!("Rejected malformed MCP request: {}", err);
            return HttpResponse::Ok().json(OutboundResponse::parse_error(err.to_string()));
        }
    };

    log::info!("Received MCP request: {}", request.method);

    match state.service.handle_request(request).await {
        Some(response) => HttpResponse::Ok().json(response),
        // Notifications return 202 Accepted
        None => HttpResponse::Accepted().finish(),
    }
}

/// Health handler - GET /health
pub async fn health_handler(state: web::Data<Arc<McpState>>) -> impl Responder {
    let report = state.service.registry().pipeline().health().await;
    HttpResponse::Ok().json(report)
}

/// Body limit for MCP requests; inline base64 documents are large.
pub const MAX_REQUEST_BYTES: usize = 64 * 1024 * 1024;

/// Configure MCP routes
pub fn config(cfg: &mut web::ServiceConfig) {
    for path in ["/mcp", "/mcp/"] {
        cfg.service(
            web::resource(path)
                .app_data(web::PayloadConfig::new(MAX_REQUEST_BYTES))
                .route(web::post().to(rpc_handler)),
        );
    }
    cfg.service(web::resource("/health").route(web::get().to(health_handler)));
}
