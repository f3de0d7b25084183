//! Conversion module - business logic for turning Word documents into PDFs.
//!
//! The pipeline has three steps:
//! - `source` - resolve the document bytes from a URL, path, payload or attachment ID
//! - `engine` - run the primary converter, falling back to the secondary one
//! - `publish` - place the PDF in the served directory and build the response

pub mod common;
pub mod engine;
pub mod health;
pub mod pipeline;
pub mod publish;
pub mod source;
pub mod traits;
pub mod validation;

pub use engine::{FallbackConverter, LibreOfficeBackend, PandocBackend};
pub use health::HealthReport;
pub use pipeline::ConversionPipeline;
pub use source::InputSource;
pub use traits::{BackendStatus, ConverterBackend, Validator};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while resolving, converting or publishing a document.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Provide a docx_source (URL/path) or file_base64 (attachment), or configure PUCH_DOWNLOAD_URL_TEMPLATE for attachment IDs.")]
    MissingSource,
    #[error("{0}")]
    InvalidRequest(String),
    #[error("File not found: {0}")]
    SourceNotFound(String),
    #[error("Attachment payload is not valid base64: {0}")]
    InvalidPayload(#[source] base64::DecodeError),
    #[error("Attachment provided as ID but PUCH_DOWNLOAD_URL_TEMPLATE is not set. Set it to a URL template like https://host/api/files/{{id}} or pass file_base64/docx_source.")]
    MissingDownloadTemplate,
    #[error("Failed to download '{url}': {reason}")]
    Download { url: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("failed to prepare working files: {0}")]
    Workspace(#[source] std::io::Error),
    #[error("{backend} conversion failed: {reason}")]
    Backend {
        backend: &'static str,
        reason: String,
    },
    #[error("Conversion failed with every converter: {0}")]
    AllBackendsFailed(String),
    #[error("Set BASE_URL or set INCLUDE_BASE64=true to receive the PDF as base64.")]
    NoDeliveryChannel,
    #[error("invalid BASE_URL '{0}'")]
    InvalidBaseUrl(String),
    #[error("failed to publish PDF: {0}")]
    Publish(#[source] std::io::Error),
}

impl ConversionError {
    pub(crate) fn backend(backend: &'static str, reason: impl Into<String>) -> Self {
        Self::Backend {
            backend,
            reason: reason.into(),
        }
    }
}

/// Arguments of the PDF conversion tool.
///
/// Exactly one source is expected; when several are given the precedence is
/// `file_base64`, then `puch_file_data`, then `docx_source`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConvertRequest {
    /// URL (`http`/`https`) or local filesystem path.
    #[serde(default)]
    pub docx_source: Option<String>,
    /// Where the converter writes; the PDF is still copied into the files directory.
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub file_base64: Option<String>,
    /// Either an inline base64 document or an attachment identifier.
    #[serde(default)]
    pub puch_file_data: Option<String>,
    /// Desired output name; only its stem is used.
    #[serde(default)]
    pub filename: Option<String>,
}

impl ConvertRequest {
    /// Drop fields that are present but blank.
    pub fn normalized(self) -> Self {
        fn keep(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        Self {
            docx_source: keep(self.docx_source).map(|v| v.trim().to_string()),
            output_path: keep(self.output_path),
            file_base64: keep(self.file_base64),
            puch_file_data: keep(self.puch_file_data).map(|v| v.trim().to_string()),
            filename: keep(self.filename),
        }
    }
}

/// Response object of the conversion tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConvertOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConvertOutcome {
    /// A missing URL is reported as an empty string so the key is always present.
    pub fn success(url: Option<String>, pdf_base64: Option<String>) -> Self {
        Self {
            success: true,
            url: Some(url.unwrap_or_default()),
            pdf_base64,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            url: None,
            pdf_base64: None,
            error: Some(if message.trim().is_empty() {
                "Conversion failed".to_string()
            } else {
                message
            }),
        }
    }
}

impl From<&ConversionError> for ConvertOutcome {
    fn from(err: &ConversionError) -> Self {
        Self::failure(err.to_string())
    }
}
