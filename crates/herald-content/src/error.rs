//! Error types for event parsing, validation and rendering.

use std::path::PathBuf;
use thiserror::Error;

/// A queue payload that could not be decoded into an event.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Payload is not valid JSON, or a typed field has an impossible shape
    #[error("invalid event JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload is valid JSON but not an object
    #[error("event payload must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// A required field is absent or empty.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("missing or empty required field `{field}`")]
pub struct ValidationError {
    /// Wire name of the first missing field.
    pub field: &'static str,
}

/// Template parsing or substitution failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// Placeholder has neither an event value nor a default
    #[error("template placeholder `{{{name}}}` has no value and no default")]
    UnknownPlaceholder { name: String },

    /// Unbalanced or empty braces
    #[error("malformed template at byte {position}: {reason}")]
    Malformed { position: usize, reason: &'static str },
}

/// Content crate error type.
#[derive(Error, Debug)]
pub enum ContentError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Template file could not be read
    #[error("failed to read template {path}: {source}")]
    TemplateIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for content operations.
pub type ContentResult<T> = Result<T, ContentError>;
