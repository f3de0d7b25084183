//! Readiness diagnostics for the conversion pipeline.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::engine::FallbackConverter;
use super::traits::BackendStatus;
use crate::config::{DownloadConfig, PublishConfig};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthReport {
    /// False when the files directory cannot be written.
    pub ok: bool,
    pub checks: HealthChecks,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthChecks {
    #[serde(rename = "BASE_URL")]
    pub base_url: BaseUrlCheck,
    #[serde(rename = "FILES_DIR")]
    pub files_dir: FilesDirCheck,
    #[serde(rename = "FILES_DIR_error", skip_serializing_if = "Option::is_none")]
    pub files_dir_error: Option<String>,
    /// Keyed by backend name.
    #[serde(flatten)]
    pub converters: BTreeMap<String, BackendStatus>,
    #[serde(rename = "PUCH_DOWNLOAD_URL_TEMPLATE")]
    pub download_url_template: String,
    #[serde(rename = "PUCH_API_TOKEN_set")]
    pub api_token_set: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BaseUrlCheck {
    pub set: bool,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilesDirCheck {
    pub path: String,
    pub writable: bool,
}

/// Gather the report. Only the probe file is written; nothing is repaired.
pub async fn gather(
    publish: &PublishConfig,
    download: &DownloadConfig,
    converter: &FallbackConverter,
) -> HealthReport {
    let (write_probe, converters) =
        tokio::join!(probe_writable(&publish.files_dir), converter.probe_all());

    let files_dir_error = write_probe.err();
    if let Some(err) = &files_dir_error {
        log::warn!(
            "health: files dir {} not writable: {}",
            publish.files_dir.display(),
            err
        );
    }

    HealthReport {
        ok: files_dir_error.is_none(),
        checks: HealthChecks {
            base_url: BaseUrlCheck {
                set: publish.base_url.is_some(),
                value: publish.base_url.clone().unwrap_or_default(),
            },
            files_dir: FilesDirCheck {
                path: publish.files_dir.display().to_string(),
                writable: files_dir_error.is_none(),
            },
            files_dir_error,
            converters: converters
                .into_iter()
                .map(|(name, status)| (name.to_string(), status))
                .collect(),
            download_url_template: download.url_template.clone().unwrap_or_default(),
            api_token_set: download.api_token.is_some(),
        },
    }
}

/// Create the directory if needed, then write and remove a probe file.
pub async fn probe_writable(dir: &Path) -> Result<(), String> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|err| err.to_string())?;

    let probe = dir.join(format!(".write_test-{}", Uuid::new_v4().simple()));
    tokio::fs::write(&probe, b"ok")
        .await
        .map_err(|err| err.to_string())?;
    tokio::fs::remove_file(&probe)
        .await
        .map_err(|err| err.to_string())
}
