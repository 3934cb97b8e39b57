//! Structured error types for annostyle.
//!
//! Registration-time problems (`Configuration`, `TypeMismatch`) are returned to
//! the caller that registers a criterion. `Evaluation` errors are produced per
//! cell and never leave the pipeline: they are logged and the rule is skipped.

/// All errors that can occur while configuring or evaluating styling rules.
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    /// Malformed criterion configuration (bad bounds, empty value list, bad color).
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A criterion or dataset value does not match the field's semantic type.
    #[error("Type mismatch on field '{field}': expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },

    /// A predicate or parse failed against one cell's value.
    #[error("Evaluation failed on field '{field}': {message}")]
    Evaluation { field: String, message: String },

    /// JSON (config, rule sets, tables).
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// XML writing for the spreadsheet style part.
    #[error("XML writing: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Generated XML was not valid UTF-8.
    #[error("UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StyleError>;

impl StyleError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn evaluation(field: &str, message: impl Into<String>) -> Self {
        Self::Evaluation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn type_mismatch(
        field: &str,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            field: field.to_string(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// True for errors that must be reported at registration time.
    pub fn is_registration_error(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::TypeMismatch { .. })
    }
}
