use std::path::PathBuf;
use std::sync::Arc;

use actix_files::Files;
use actix_web::middleware::{Compress, Logger};
use actix_web::{web, App, HttpServer};
use anyhow::Context;

pub mod auth;
pub mod config;
pub mod mcp;

pub use crate::config::ServerConfig;
use crate::mcp::conversion::publish::FILES_ROUTE;
use crate::mcp::tools::ToolRegistry;
use crate::mcp::{McpService, McpState};

/// Register MCP, health and static file routes.
pub fn configure_app(
    cfg: &mut web::ServiceConfig,
    state: web::Data<Arc<McpState>>,
    files_dir: PathBuf,
) {
    cfg.app_data(state)
        .configure(mcp::config)
        .service(Files::new(&format!("/{FILES_ROUTE}"), files_dir).use_last_modified(true));
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok(); // Load .env file
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };

    let files_dir = config.publish.files_dir.clone();
    std::fs::create_dir_all(&files_dir)
        .with_context(|| format!("failed to create files directory {}", files_dir.display()))?;

    let registry = ToolRegistry::new(&config).context("failed to initialise tools")?;
    let state = web::Data::new(Arc::new(McpState::new(
        McpService::new(registry),
        config.auth_token.clone(),
    )));

    if config.publish.base_url.is_none() && !config.publish.include_base64 {
        log::warn!("Neither BASE_URL nor INCLUDE_BASE64=true is set; conversions will fail");
    }

    log::info!(
        "Starting MCP server at http://{}:{} (MCP at /mcp, files at /{})",
        config.host,
        config.port,
        FILES_ROUTE
    );

    HttpServer::new(move || {
        let state = state.clone();
        let files_dir = files_dir.clone();

        App::new()
            .wrap(Compress::default())
            .wrap(Logger::new("%r %s %Dms"))
            .configure(|cfg| configure_app(cfg, state, files_dir))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
