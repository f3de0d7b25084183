//! Traits for the conversion pipeline.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::ConversionError;

/// Trait for validating request objects.
pub trait Validator {
    /// Validate the state of the object.
    fn validate(&self) -> Result<(), String>;
}

/// Availability of a converter executable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BackendStatus {
    pub available: bool,
    pub version: Option<String>,
}

impl BackendStatus {
    pub fn available(version: Option<String>) -> Self {
        Self {
            available: true,
            version,
        }
    }

    pub fn unavailable() -> Self {
        Self::default()
    }
}

/// A document-to-PDF converter.
#[async_trait]
pub trait ConverterBackend: Send + Sync {
    /// Short name used in logs and health reports.
    fn name(&self) -> &'static str;

    /// Check whether the converter can run on this host.
    async fn probe(&self) -> BackendStatus;

    /// Convert `input` into a PDF written at `output`.
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConversionError>;
}
