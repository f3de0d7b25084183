//! The request pipeline: resolve, convert, publish.

use std::time::Instant;

use reqwest::Client;
use uuid::Uuid;

use super::common::elapsed_ms;
use super::engine::FallbackConverter;
use super::health::{self, HealthReport};
use super::publish::{PublishedPdf, Publisher};
use super::source::{InputSource, SourceResolver};
use super::traits::Validator;
use super::{ConversionError, ConvertOutcome, ConvertRequest};
use crate::config::{DownloadConfig, PublishConfig, ServerConfig};

/// Stateless apart from configuration; every call works in its own scratch space.
pub struct ConversionPipeline {
    publish: PublishConfig,
    download: DownloadConfig,
    converter: FallbackConverter,
    http: Client,
}

impl ConversionPipeline {
    pub fn new(
        publish: PublishConfig,
        download: DownloadConfig,
        converter: FallbackConverter,
    ) -> Result<Self, ConversionError> {
        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ConversionError::HttpClient)?;

        Ok(Self {
            publish,
            download,
            converter,
            http,
        })
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self, ConversionError> {
        Self::new(
            config.publish.clone(),
            config.download.clone(),
            FallbackConverter::from_config(&config.converters),
        )
    }

    /// Run a request and fold any error into a failure outcome.
    pub async fn run(&self, request: ConvertRequest) -> ConvertOutcome {
        let req_id = request_id();
        let started = Instant::now();

        match self.convert(request, &req_id).await {
            Ok(published) => {
                log::info!(
                    "[{req_id}] give_pdf done url={} base64={} ms={}",
                    published.url.as_deref().unwrap_or("-"),
                    published.pdf_base64.is_some(),
                    elapsed_ms(started)
                );
                ConvertOutcome::success(published.url, published.pdf_base64)
            }
            Err(err) => {
                log::error!("[{req_id}] give_pdf failed: {err}");
                ConvertOutcome::from(&err)
            }
        }
    }

    /// Resolve the source, convert it and publish the PDF.
    pub async fn convert(
        &self,
        request: ConvertRequest,
        req_id: &str,
    ) -> Result<PublishedPdf, ConversionError> {
        let request = request.normalized();
        log::info!(
            "[{req_id}] give_pdf start has_docx_source={} has_file_base64={} has_puch_file_data={} filename={:?} output_path={}",
            request.docx_source.is_some(),
            request.file_base64.is_some(),
            request.puch_file_data.is_some(),
            request.filename,
            request.output_path.is_some(),
        );

        request.validate().map_err(ConversionError::InvalidRequest)?;

        let publisher = Publisher::new(&self.publish);
        publisher.ensure_deliverable()?;

        let source = InputSource::from_request(&request)?;
        let kind = source.kind();
        let input = SourceResolver::new(&self.http, &self.download)
            .resolve(source, req_id)
            .await?;
        log::info!(
            "[{req_id}] source resolved type={kind} name={}",
            input.source_name
        );

        let output = publisher.output_path(
            request.output_path.as_deref(),
            request.filename.as_deref(),
            &input.source_name,
        )?;

        self.converter.convert(&input.path, &output, req_id).await?;
        publisher.publish(&output, req_id).await
    }

    pub async fn health(&self) -> HealthReport {
        health::gather(&self.publish, &self.download, &self.converter).await
    }
}

fn request_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}
