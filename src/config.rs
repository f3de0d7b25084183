//! Server configuration loaded from environment variables.
//!
//! Values are read once at startup (after `.env` has been loaded by `dotenvy`)
//! and passed down to the pieces that need them.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8086;
const DEFAULT_FILES_DIR: &str = "files";
const VERCEL_FILES_DIR: &str = "/tmp/files";
const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 60;

/// Errors raised while reading configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Please set {0} in your .env file")]
    Missing(&'static str),
    #[error("invalid value '{value}' for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Where converted PDFs land and how they are handed back.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    pub files_dir: PathBuf,
    /// Public origin, e.g. `https://example.ngrok.app`.
    pub base_url: Option<String>,
    pub include_base64: bool,
}

/// Remote download settings for URL and attachment-ID sources.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Template containing `{id}`, e.g. `https://host/api/files/{id}`.
    pub url_template: Option<String>,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            url_template: None,
            api_token: None,
            timeout: Duration::from_secs(DEFAULT_DOWNLOAD_TIMEOUT_SECS),
        }
    }
}

/// External converter executables.
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    pub pandoc_path: String,
    pub pdf_engine: Option<String>,
    pub soffice_path: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            pandoc_path: "pandoc".to_string(),
            pdf_engine: None,
            soffice_path: "soffice".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub auth_token: String,
    /// Owner identifier returned by the `validate` tool, already normalized.
    pub owner_number: String,
    pub publish: PublishConfig,
    pub download: DownloadConfig,
    pub converters: ConverterConfig,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let auth_token = get("AUTH_TOKEN").ok_or(ConfigError::Missing("AUTH_TOKEN"))?;
        let owner_number = get("MY_NUMBER")
            .map(|raw| normalize_owner_number(&raw))
            .ok_or(ConfigError::Missing("MY_NUMBER"))?;

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|err| ConfigError::Invalid {
                var: "PORT",
                value: raw.clone(),
                reason: err.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let files_dir = match get("FILES_DIR") {
            Some(dir) => PathBuf::from(dir),
            None if get("VERCEL").as_deref() == Some("1") => PathBuf::from(VERCEL_FILES_DIR),
            None => PathBuf::from(DEFAULT_FILES_DIR),
        };

        let timeout_secs = match get("DOWNLOAD_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|err| ConfigError::Invalid {
                    var: "DOWNLOAD_TIMEOUT_SECS",
                    value: raw.clone(),
                    reason: err.to_string(),
                })?,
            None => DEFAULT_DOWNLOAD_TIMEOUT_SECS,
        };

        let defaults = ConverterConfig::default();

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            auth_token,
            owner_number,
            publish: PublishConfig {
                files_dir,
                base_url: get("BASE_URL"),
                include_base64: get("INCLUDE_BASE64")
                    .map(|value| value.trim().eq_ignore_ascii_case("true"))
                    .unwrap_or(false),
            },
            download: DownloadConfig {
                url_template: get("PUCH_DOWNLOAD_URL_TEMPLATE"),
                api_token: get("PUCH_API_TOKEN"),
                timeout: Duration::from_secs(timeout_secs),
            },
            converters: ConverterConfig {
                pandoc_path: get("PANDOC_PATH").unwrap_or(defaults.pandoc_path),
                pdf_engine: get("PANDOC_PDF_ENGINE"),
                soffice_path: get("SOFFICE_PATH").unwrap_or(defaults.soffice_path),
            },
        })
    }
}

/// Strip surrounding whitespace and every `+` from the owner identifier.
pub fn normalize_owner_number(raw: &str) -> String {
    raw.trim().replace('+', "")
}
