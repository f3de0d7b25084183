//! PDF conversion engines.
//!
//! Pandoc is the primary converter. Headless LibreOffice takes over when pandoc
//! fails (typically a missing LaTeX engine) or is not installed.

use std::path::Path;
use std::process::Output;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::Url;
use tempfile::tempdir;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

use super::common::{elapsed_ms, PDF_EXT};
use super::traits::{BackendStatus, ConverterBackend};
use super::ConversionError;
use crate::config::ConverterConfig;
use crate::mcp::content::DocumentKind;

/// Keep error messages readable when a converter dumps a long log.
const MAX_STDERR_CHARS: usize = 600;

/// Markup converter: `pandoc <input> -o <output.pdf>`.
pub struct PandocBackend {
    program: String,
    pdf_engine: Option<String>,
}

impl PandocBackend {
    pub fn new(program: impl Into<String>, pdf_engine: Option<String>) -> Self {
        Self {
            program: program.into(),
            pdf_engine,
        }
    }
}

#[async_trait]
impl ConverterBackend for PandocBackend {
    fn name(&self) -> &'static str {
        "pandoc"
    }

    async fn probe(&self) -> BackendStatus {
        probe_version(&self.program).await
    }

    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConversionError> {
        let mut command = Command::new(&self.program);
        // Pandoc picks its reader from the extension, which inputs may lack.
        if let Ok(DocumentKind::Ooxml) = read_signature(input).await {
            command.arg("-f").arg("docx");
        }
        command.arg(input).arg("-o").arg(output);
        if let Some(engine) = &self.pdf_engine {
            command.arg(format!("--pdf-engine={engine}"));
        }

        let result = run(self.name(), &self.program, &mut command).await?;
        check_exit(self.name(), &result)?;
        verify_pdf(self.name(), output).await
    }
}

/// Word-processor automation through headless LibreOffice.
pub struct LibreOfficeBackend {
    program: String,
}

impl LibreOfficeBackend {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl ConverterBackend for LibreOfficeBackend {
    fn name(&self) -> &'static str {
        "libreoffice"
    }

    async fn probe(&self) -> BackendStatus {
        probe_version(&self.program).await
    }

    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConversionError> {
        let scratch = tempdir().map_err(ConversionError::Workspace)?;
        let out_dir = scratch.path().join("out");
        let profile_dir = scratch.path().join("profile");

        // A private profile lets several conversions run side by side.
        let profile_url = Url::from_directory_path(&profile_dir).map_err(|_| {
            ConversionError::backend(self.name(), "cannot build profile directory URL")
        })?;

        let mut command = Command::new(&self.program);
        command
            .arg(format!("-env:UserInstallation={profile_url}"))
            .arg("--headless")
            .arg("--convert-to")
            .arg(PDF_EXT)
            .arg("--outdir")
            .arg(&out_dir)
            .arg(input);

        let result = run(self.name(), &self.program, &mut command).await?;
        check_exit(self.name(), &result)?;

        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ConversionError::backend(self.name(), "input has no file name"))?;
        let produced = out_dir.join(format!("{stem}.{PDF_EXT}"));
        verify_pdf(self.name(), &produced).await?;

        tokio::fs::copy(&produced, output)
            .await
            .map_err(|err| ConversionError::backend(self.name(), err.to_string()))?;
        Ok(())
    }
}

/// Runs the primary backend and falls back to the secondary on failure.
#[derive(Clone)]
pub struct FallbackConverter {
    primary: Arc<dyn ConverterBackend>,
    fallback: Arc<dyn ConverterBackend>,
}

impl FallbackConverter {
    pub fn new(primary: Arc<dyn ConverterBackend>, fallback: Arc<dyn ConverterBackend>) -> Self {
        Self { primary, fallback }
    }

    pub fn from_config(config: &ConverterConfig) -> Self {
        Self::new(
            Arc::new(PandocBackend::new(
                config.pandoc_path.clone(),
                config.pdf_engine.clone(),
            )),
            Arc::new(LibreOfficeBackend::new(config.soffice_path.clone())),
        )
    }

    /// Convert `input` into `output`, returning the name of the backend that succeeded.
    pub async fn convert(
        &self,
        input: &Path,
        output: &Path,
        req_id: &str,
    ) -> Result<&'static str, ConversionError> {
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(ConversionError::Publish)?;
        }

        let started = Instant::now();
        let input_name = input.file_name().unwrap_or_default().to_string_lossy();
        log::info!(
            "[{req_id}] convert start input={input_name} backend={}",
            self.primary.name()
        );

        let primary_err = match self.primary.convert(input, output).await {
            Ok(()) => return Ok(self.finish(self.primary.name(), output, started, req_id)),
            Err(err) => err,
        };

        log::warn!(
            "[{req_id}] {} convert failed, trying {}: {}",
            self.primary.name(),
            self.fallback.name(),
            primary_err
        );

        match self.fallback.convert(input, output).await {
            Ok(()) => Ok(self.finish(self.fallback.name(), output, started, req_id)),
            Err(fallback_err) => {
                log::error!("[{req_id}] {} convert failed: {}", self.fallback.name(), fallback_err);
                Err(ConversionError::AllBackendsFailed(format!(
                    "{primary_err}; {fallback_err}"
                )))
            }
        }
    }

    fn finish(
        &self,
        backend: &'static str,
        output: &Path,
        started: Instant,
        req_id: &str,
    ) -> &'static str {
        log::info!(
            "[{req_id}] convert done backend={backend} output={} ms={}",
            output.file_name().unwrap_or_default().to_string_lossy(),
            elapsed_ms(started)
        );
        backend
    }

    /// Probe both backends, primary first.
    pub async fn probe_all(&self) -> Vec<(&'static str, BackendStatus)> {
        let (primary, fallback) = tokio::join!(self.primary.probe(), self.fallback.probe());
        vec![
            (self.primary.name(), primary),
            (self.fallback.name(), fallback),
        ]
    }
}

async fn run(
    backend: &'static str,
    program: &str,
    command: &mut Command,
) -> Result<Output, ConversionError> {
    command
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|err| ConversionError::backend(backend, format!("cannot run '{program}': {err}")))
}

fn check_exit(backend: &'static str, output: &Output) -> Result<(), ConversionError> {
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    let status = match output.status.code() {
        Some(code) => format!("exited with status {code}"),
        None => "terminated by signal".to_string(),
    };

    if stderr.is_empty() {
        Err(ConversionError::backend(backend, status))
    } else {
        let tail: String = {
            let chars: Vec<char> = stderr.chars().collect();
            chars[chars.len().saturating_sub(MAX_STDERR_CHARS)..]
                .iter()
                .collect()
        };
        Err(ConversionError::backend(backend, format!("{status}: {tail}")))
    }
}

/// Check that `path` exists, is non-empty and starts with the PDF signature.
pub async fn verify_pdf(backend: &'static str, path: &Path) -> Result<(), ConversionError> {
    let kind = read_signature(path)
        .await
        .map_err(|err| ConversionError::backend(backend, format!("no output produced: {err}")))?;

    if kind != DocumentKind::Pdf {
        return Err(ConversionError::backend(
            backend,
            "output is empty or not a PDF",
        ));
    }
    Ok(())
}

/// Sniff the document kind from the first bytes of `path`.
async fn read_signature(path: &Path) -> std::io::Result<DocumentKind> {
    let mut file = tokio::fs::File::open(path).await?;

    let mut header = [0u8; DocumentKind::SNIFF_LEN];
    let mut filled = 0;
    while filled < header.len() {
        let read = file.read(&mut header[filled..]).await?;
        if read == 0 {
            break;
        }
        filled += read;
    }
    Ok(DocumentKind::from_bytes(&header[..filled]))
}

async fn probe_version(program: &str) -> BackendStatus {
    let result = Command::new(program)
        .arg("--version")
        .kill_on_drop(true)
        .output()
        .await;

    match result {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(str::to_string);
            BackendStatus::available(version)
        }
        _ => BackendStatus::unavailable(),
    }
}
