//! Input validation for conversion requests.
//!
//! Messages are written so the calling assistant can relay them to the user
//! and retry with corrected arguments.

use std::fmt;

use super::common::{decode_base64, is_url, sanitize_stem};
use super::traits::Validator;
use super::ConvertRequest;

/// Validation error with detailed, user-friendly messages.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field that failed validation
    pub field: String,
    pub message: String,
    /// Suggestion for how to fix the error
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn invalid_base64(field: &str) -> Self {
        Self::new(field, "Value is not valid base64")
            .with_suggestion("Send the raw .docx bytes encoded with standard base64")
    }

    pub fn unusable_filename(field: &str, value: &str) -> Self {
        Self::new(field, format!("'{}' cannot be used as a file name", value))
            .with_suggestion("Use letters, digits, spaces, dashes or underscores, e.g. report.pdf")
    }

    pub fn not_a_file_path(field: &str, value: &str) -> Self {
        Self::new(field, format!("'{}' names a directory, not a file", value))
            .with_suggestion("Include a file name, e.g. /srv/out/report.pdf")
    }

    pub fn unsupported_scheme(field: &str, value: &str) -> Self {
        Self::new(field, format!("Unsupported URL '{}'", value))
            .with_suggestion("Only http:// and https:// links can be downloaded")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors with formatted output.
#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Get formatted error message suitable for MCP response
    pub fn to_mcp_message(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }

        let mut parts = vec![format!(
            "Invalid arguments: {} problem(s) found",
            self.len()
        )];

        for (i, error) in self.errors.iter().enumerate() {
            parts.push(format!("{}. {}", i + 1, error));
        }

        parts.join("\n")
    }

    /// Convert to Result - Ok if no errors, Err with formatted message if errors exist
    pub fn into_result(self) -> Result<(), String> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.to_mcp_message())
        }
    }
}

// ============================================================================
// Validation functions
// ============================================================================

/// Validate an inline base64 payload
pub fn validate_base64(value: &str, field: &str, errors: &mut ValidationErrors) {
    if decode_base64(value).is_err() {
        errors.add(ValidationError::invalid_base64(field));
    }
}

/// Validate that a name still has a usable stem after sanitizing
pub fn validate_filename(value: &str, field: &str, errors: &mut ValidationErrors) {
    if sanitize_stem(value, "").is_empty() {
        errors.add(ValidationError::unusable_filename(field, value));
    }
}

/// Validate that a path names a file rather than a directory
pub fn validate_file_path(value: &str, field: &str, errors: &mut ValidationErrors) {
    let trimmed = value.trim();
    if trimmed.ends_with('/') || trimmed.ends_with('\\') || trimmed == "." || trimmed == ".." {
        errors.add(ValidationError::not_a_file_path(field, value));
    }
}

/// Reject URL-looking sources with a scheme that cannot be downloaded
pub fn validate_source(value: &str, field: &str, errors: &mut ValidationErrors) {
    let Some((scheme, _)) = value.split_once("://") else {
        return;
    };
    let looks_like_scheme = scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if looks_like_scheme && !is_url(value) {
        errors.add(ValidationError::unsupported_scheme(field, value));
    }
}

impl Validator for ConvertRequest {
    fn validate(&self) -> Result<(), String> {
        let mut errors = ValidationErrors::new();

        if let Some(payload) = &self.file_base64 {
            validate_base64(payload, "file_base64", &mut errors);
        }
        if let Some(source) = &self.docx_source {
            validate_source(source, "docx_source", &mut errors);
        }
        if let Some(filename) = &self.filename {
            validate_filename(filename, "filename", &mut errors);
        }
        if let Some(output_path) = &self.output_path {
            validate_file_path(output_path, "output_path", &mut errors);
        }

        errors.into_result()
    }
}
