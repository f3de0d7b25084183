//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use actix_web::dev::ServerHandle;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use async_trait::async_trait;

use docx_pdf_mcp_server::config::{DownloadConfig, PublishConfig};
use docx_pdf_mcp_server::mcp::content::DocumentKind;
use docx_pdf_mcp_server::mcp::conversion::{
    BackendStatus, ConversionError, ConversionPipeline, ConverterBackend, FallbackConverter,
};

pub const AUTH_TOKEN: &str = "test-token";
pub const OWNER_NUMBER: &str = "919876543210";

/// Leading bytes of a real .docx (ZIP local file header) followed by filler.
pub const DOCX_BYTES: &[u8] = &[
    0x50, 0x4B, 0x03, 0x04, 0x14, 0x00, 0x06, 0x00, 0x08, 0x00, 0x00, 0x00, 0x21, 0x00, 0x77,
    0x6F, 0x72, 0x64, 0x2F, 0x64, 0x6F, 0x63, 0x75, 0x6D, 0x65, 0x6E, 0x74, 0x2E, 0x78, 0x6D,
    0x6C,
];

/// Writes a small PDF for any Word document input.
pub struct FakePdfBackend {
    pub name: &'static str,
}

#[async_trait]
impl ConverterBackend for FakePdfBackend {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn probe(&self) -> BackendStatus {
        BackendStatus::available(Some(format!("{} 1.0", self.name)))
    }

    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConversionError> {
        let bytes = tokio::fs::read(input)
            .await
            .map_err(|err| ConversionError::Backend {
                backend: self.name,
                reason: err.to_string(),
            })?;
        if !DocumentKind::from_bytes(&bytes).is_word_document() {
            return Err(ConversionError::Backend {
                backend: self.name,
                reason: "input is not a Word document".into(),
            });
        }

        let pdf = format!("%PDF-1.7\n% converted {} bytes\n%%EOF\n", bytes.len());
        tokio::fs::write(output, pdf)
            .await
            .map_err(|err| ConversionError::Backend {
                backend: self.name,
                reason: err.to_string(),
            })
    }
}

/// Always unavailable, like a converter that is not installed.
pub struct MissingBackend {
    pub name: &'static str,
}

#[async_trait]
impl ConverterBackend for MissingBackend {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn probe(&self) -> BackendStatus {
        BackendStatus::unavailable()
    }

    async fn convert(&self, _input: &Path, _output: &Path) -> Result<(), ConversionError> {
        Err(ConversionError::Backend {
            backend: self.name,
            reason: format!("cannot run '{}': not installed", self.name),
        })
    }
}

pub fn publish_config(files_dir: &Path, base_url: Option<&str>, include_base64: bool) -> PublishConfig {
    PublishConfig {
        files_dir: files_dir.to_path_buf(),
        base_url: base_url.map(str::to_string),
        include_base64,
    }
}

/// Primary converter missing, fallback working.
pub fn fallback_only() -> FallbackConverter {
    FallbackConverter::new(
        Arc::new(MissingBackend { name: "pandoc" }),
        Arc::new(FakePdfBackend { name: "libreoffice" }),
    )
}

pub fn no_converters() -> FallbackConverter {
    FallbackConverter::new(
        Arc::new(MissingBackend { name: "pandoc" }),
        Arc::new(MissingBackend { name: "libreoffice" }),
    )
}

pub fn pipeline(
    publish: PublishConfig,
    download: DownloadConfig,
    converter: FallbackConverter,
) -> Arc<ConversionPipeline> {
    Arc::new(ConversionPipeline::new(publish, download, converter).expect("pipeline"))
}

/// Serve `body` at `/files/{id}`; `/files/missing` answers 404.
///
/// When `bearer` is set, requests without `Authorization: Bearer <bearer>` get 401.
pub async fn spawn_download_server(body: &[u8], bearer: Option<&str>) -> (String, ServerHandle) {
    let body = web::Bytes::copy_from_slice(body);
    let bearer = bearer.map(|token| format!("Bearer {token}"));

    let server = HttpServer::new(move || {
        let body = body.clone();
        let bearer = bearer.clone();
        App::new().route(
            "/files/{id}",
            web::get().to(move |req: HttpRequest| {
                let body = body.clone();
                let bearer = bearer.clone();
                async move {
                    if let Some(expected) = bearer {
                        let given = req
                            .headers()
                            .get("Authorization")
                            .and_then(|h| h.to_str().ok());
                        if given != Some(expected.as_str()) {
                            return HttpResponse::Unauthorized().finish();
                        }
                    }
                    if req.match_info().get("id") == Some("missing") {
                        return HttpResponse::NotFound().finish();
                    }
                    HttpResponse::Ok().body(body)
                }
            }),
        )
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("bind download server");

    let addr = server.addrs()[0];
    let server = server.run();
    let handle = server.handle();
    actix_web::rt::spawn(server);
    (format!("http://{addr}"), handle)
}
