//! Input resolution: turn a request into a document file on local disk.

use std::path::{Path, PathBuf};
use std::time::Instant;

use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use tempfile::{tempdir, TempDir};

use super::common::{
    decode_base64, decode_document_payload, elapsed_ms, is_url, sanitize_stem, url_file_name,
    DOCX_EXT, FALLBACK_STEM,
};
use super::{ConversionError, ConvertRequest};
use crate::config::DownloadConfig;
use crate::mcp::content::DocumentKind;

/// Where the document comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    /// Decoded inline payload.
    Inline(Vec<u8>),
    /// Identifier resolved through the download template.
    Attachment(String),
    Url(String),
    LocalPath(PathBuf),
}

impl InputSource {
    /// Pick the source from a normalized request.
    ///
    /// Precedence: `file_base64`, then `puch_file_data`, then `docx_source`.
    pub fn from_request(request: &ConvertRequest) -> Result<Self, ConversionError> {
        if let Some(payload) = &request.file_base64 {
            return decode_base64(payload)
                .map(Self::Inline)
                .map_err(ConversionError::InvalidPayload);
        }

        if let Some(data) = &request.puch_file_data {
            return Ok(match decode_document_payload(data) {
                Some(bytes) => Self::Inline(bytes),
                None => Self::Attachment(data.clone()),
            });
        }

        match &request.docx_source {
            Some(source) if is_url(source) => Ok(Self::Url(source.clone())),
            Some(source) => Ok(Self::LocalPath(PathBuf::from(source))),
            None => Err(ConversionError::MissingSource),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Inline(_) => "attachment_b64",
            Self::Attachment(_) => "id",
            Self::Url(_) => "url",
            Self::LocalPath(_) => "path",
        }
    }
}

/// A document ready for conversion.
///
/// Downloaded or decoded inputs live in a scratch directory that is removed
/// when this value is dropped.
#[derive(Debug)]
pub struct ResolvedInput {
    pub path: PathBuf,
    /// Name used to derive the output file name.
    pub source_name: String,
    scratch: Option<TempDir>,
}

impl ResolvedInput {
    pub fn is_temporary(&self) -> bool {
        self.scratch.is_some()
    }
}

/// Fetches documents for the pipeline.
pub struct SourceResolver<'a> {
    http: &'a Client,
    download: &'a DownloadConfig,
}

impl<'a> SourceResolver<'a> {
    pub fn new(http: &'a Client, download: &'a DownloadConfig) -> Self {
        Self { http, download }
    }

    pub async fn resolve(
        &self,
        source: InputSource,
        req_id: &str,
    ) -> Result<ResolvedInput, ConversionError> {
        match source {
            InputSource::Inline(bytes) => write_scratch(FALLBACK_STEM, &bytes).await,
            InputSource::Attachment(id) => {
                let template = self
                    .download
                    .url_template
                    .as_deref()
                    .ok_or(ConversionError::MissingDownloadTemplate)?;
                let url = template.replace("{id}", &id);
                log::info!("[{req_id}] download:id start id={id}");
                let bytes = self.fetch(&url, true, req_id).await?;
                write_scratch(&id, &bytes).await
            }
            InputSource::Url(url) => {
                log::info!("[{req_id}] download:url start url={url}");
                let bytes = self.fetch(&url, false, req_id).await?;
                let name = url_file_name(&url).unwrap_or_else(|| FALLBACK_STEM.to_string());
                write_scratch(&name, &bytes).await
            }
            InputSource::LocalPath(path) => resolve_local(&path).await,
        }
    }

    async fn fetch(
        &self,
        url: &str,
        with_api_token: bool,
        req_id: &str,
    ) -> Result<Vec<u8>, ConversionError> {
        let started = Instant::now();
        let download_error = |reason: String| ConversionError::Download {
            url: url.to_string(),
            reason,
        };

        let mut request = self.http.get(url).timeout(self.download.timeout);
        if with_api_token {
            if let Some(token) = &self.download.api_token {
                request = request.header(AUTHORIZATION, format!("Bearer {token}"));
            }
        }

        let response = request
            .send()
            .await
            .map_err(|err| download_error(err.to_string()))?
            .error_for_status()
            .map_err(|err| download_error(err.to_string()))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|err| download_error(err.to_string()))?;

        if bytes.is_empty() {
            return Err(download_error("response body is empty".to_string()));
        }

        log::info!(
            "[{req_id}] download done bytes={} ms={}",
            bytes.len(),
            elapsed_ms(started)
        );
        Ok(bytes.to_vec())
    }
}

async fn resolve_local(path: &Path) -> Result<ResolvedInput, ConversionError> {
    let not_found = || ConversionError::SourceNotFound(path.display().to_string());

    let absolute = std::path::absolute(path).map_err(|_| not_found())?;
    let metadata = tokio::fs::metadata(&absolute)
        .await
        .map_err(|_| not_found())?;
    if !metadata.is_file() {
        return Err(not_found());
    }

    let source_name = absolute
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(FALLBACK_STEM)
        .to_string();

    Ok(ResolvedInput {
        path: absolute,
        source_name,
        scratch: None,
    })
}

/// Write bytes into a fresh scratch directory, keeping `name`'s stem.
async fn write_scratch(name: &str, bytes: &[u8]) -> Result<ResolvedInput, ConversionError> {
    let scratch = tempdir().map_err(ConversionError::Workspace)?;
    let stem = sanitize_stem(name, FALLBACK_STEM);

    let kind = DocumentKind::from_bytes(bytes);
    let extension = match kind {
        DocumentKind::Compound => "doc",
        _ => DOCX_EXT,
    };
    let path = scratch.path().join(format!("{stem}.{extension}"));
    log::debug!(
        "scratch input {} bytes={} mime={}",
        path.display(),
        bytes.len(),
        kind.mime_type()
    );
    tokio::fs::write(&path, bytes)
        .await
        .map_err(ConversionError::Workspace)?;

    Ok(ResolvedInput {
        path,
        source_name: name.to_string(),
        scratch: Some(scratch),
    })
}
