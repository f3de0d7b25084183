//! Common utilities for the conversion pipeline.
//!
//! Shared helpers for source classification, payload decoding and output naming.

use std::path::Path;
use std::time::Instant;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Url;

use crate::mcp::content::DocumentKind;

pub const DOCX_EXT: &str = "docx";
pub const PDF_EXT: &str = "pdf";
pub const FALLBACK_STEM: &str = "output";

/// Whether the string is an `http` or `https` URL.
pub fn is_url(value: &str) -> bool {
    Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Decode a standard base64 payload, tolerating whitespace and a `data:` URL prefix.
pub fn decode_base64(payload: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let body = match payload.trim().strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, data)| data).unwrap_or(rest),
        None => payload,
    };
    let compact: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    BASE64.decode(compact)
}

/// Decode `value` only when it is base64 for a Word document.
///
/// Short attachment identifiers are often valid base64 too, so the decoded
/// bytes must carry a document signature before the value counts as a payload.
pub fn decode_document_payload(value: &str) -> Option<Vec<u8>> {
    decode_base64(value)
        .ok()
        .filter(|bytes| DocumentKind::from_bytes(bytes).is_word_document())
}

/// Last non-empty path segment of a URL.
pub fn url_file_name(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}

/// Sanitize `name` and strip its extension, using `fallback` if nothing usable remains.
pub fn sanitize_stem(name: &str, fallback: &str) -> String {
    let base = Path::new(name.trim())
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let stem = Path::new(base)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    let cleaned = sanitize_filename::sanitize(stem);
    let cleaned = cleaned.trim().trim_matches('.');
    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned.to_string()
    }
}

/// File name of the published PDF: the override's stem if given, else the source's.
pub fn pdf_file_name(filename_override: Option<&str>, source_name: &str) -> String {
    let stem = match filename_override {
        Some(name) => sanitize_stem(name, FALLBACK_STEM),
        None => sanitize_stem(source_name, FALLBACK_STEM),
    };
    format!("{stem}.{PDF_EXT}")
}

/// Milliseconds since `start`, rounded to one decimal for logs.
pub fn elapsed_ms(start: Instant) -> f64 {
    (start.elapsed().as_secs_f64() * 10_000.0).round() / 10.0
}
