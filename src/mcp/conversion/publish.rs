//! Publishing converted PDFs into the served files directory.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Url;

use super::common::pdf_file_name;
use super::ConversionError;
use crate::config::PublishConfig;

/// Route prefix the files directory is mounted under.
pub const FILES_ROUTE: &str = "files";

/// A PDF placed in the files directory.
#[derive(Debug, Clone)]
pub struct PublishedPdf {
    pub path: PathBuf,
    pub filename: String,
    pub url: Option<String>,
    pub pdf_base64: Option<String>,
}

pub struct Publisher<'a> {
    config: &'a PublishConfig,
}

impl<'a> Publisher<'a> {
    pub fn new(config: &'a PublishConfig) -> Self {
        Self { config }
    }

    /// Fail early when the result could not be handed back at all.
    pub fn ensure_deliverable(&self) -> Result<(), ConversionError> {
        if self.config.base_url.is_none() && !self.config.include_base64 {
            return Err(ConversionError::NoDeliveryChannel);
        }
        if let Some(base) = &self.config.base_url {
            public_url(base, "probe.pdf")?;
        }
        Ok(())
    }

    pub fn files_dir(&self) -> Result<PathBuf, ConversionError> {
        std::path::absolute(&self.config.files_dir).map_err(ConversionError::Publish)
    }

    /// Where the converter should write.
    ///
    /// An explicit `output_path` wins; otherwise the PDF is written straight
    /// into the files directory under a name derived from the override or source.
    pub fn output_path(
        &self,
        output_path: Option<&str>,
        filename: Option<&str>,
        source_name: &str,
    ) -> Result<PathBuf, ConversionError> {
        match output_path {
            Some(path) => std::path::absolute(path).map_err(ConversionError::Publish),
            None => Ok(self.files_dir()?.join(pdf_file_name(filename, source_name))),
        }
    }

    /// Copy `output` into the files directory if needed and build the response fields.
    pub async fn publish(&self, output: &Path, req_id: &str) -> Result<PublishedPdf, ConversionError> {
        let files_dir = self.files_dir()?;
        tokio::fs::create_dir_all(&files_dir)
            .await
            .map_err(ConversionError::Publish)?;

        let filename = output
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| pdf_file_name(None, ""));
        let public_path = files_dir.join(&filename);

        // Copying a file onto itself truncates it.
        if !is_same_file(output, &public_path).await {
            tokio::fs::copy(output, &public_path)
                .await
                .map_err(ConversionError::Publish)?;
        }

        let url = match &self.config.base_url {
            Some(base) => Some(public_url(base, &filename)?),
            None => None,
        };

        let pdf_base64 = if self.config.include_base64 {
            let bytes = tokio::fs::read(&public_path)
                .await
                .map_err(ConversionError::Publish)?;
            Some(BASE64.encode(bytes))
        } else {
            None
        };

        log::info!(
            "[{req_id}] publish done file={} url={}",
            filename,
            url.as_deref().unwrap_or("-")
        );

        Ok(PublishedPdf {
            path: public_path,
            filename,
            url,
            pdf_base64,
        })
    }
}

/// True when both paths resolve to the same existing file.
async fn is_same_file(a: &Path, b: &Path) -> bool {
    match (
        tokio::fs::canonicalize(a).await,
        tokio::fs::canonicalize(b).await,
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// `<base>/files/<filename>` with the file name percent-encoded.
pub fn public_url(base: &str, filename: &str) -> Result<String, ConversionError> {
    let invalid = || ConversionError::InvalidBaseUrl(base.to_string());

    let mut url = Url::parse(base.trim()).map_err(|_| invalid())?;
    if url.cannot_be_a_base() {
        return Err(invalid());
    }
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| invalid())?
        .pop_if_empty()
        .push(FILES_ROUTE)
        .push(filename);
    Ok(url.to_string())
}
