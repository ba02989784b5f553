//! Error types shared across askdata

use std::fmt;

use thiserror::Error;

/// Errors that can occur while reading schema, config or plan documents
#[derive(Debug, Error)]
pub enum ParseError {
    /// IO error reading file
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// YAML deserialization error
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// JSON deserialization error
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Document parsed but its values are out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        ParseError::Io {
            path: String::new(),
            source: err,
        }
    }
}

/// Flat classification of every failure the engine reports
///
/// Each module keeps its own error enum; `kind()` on any of them maps to
/// one of these so callers can branch without matching nested variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownColumn,
    AmbiguousColumn,
    TypeMismatch,
    InvalidAggregation,
    InvalidPlan,
    ChartColumnMissing,
    UpstreamStepFailed,
    NotFound,
    NarrationUnavailable,
    SchemaInvalid,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::UnknownColumn => "UnknownColumn",
            ErrorKind::AmbiguousColumn => "AmbiguousColumn",
            ErrorKind::TypeMismatch => "TypeMismatch",
            ErrorKind::InvalidAggregation => "InvalidAggregation",
            ErrorKind::InvalidPlan => "InvalidPlan",
            ErrorKind::ChartColumnMissing => "ChartColumnMissing",
            ErrorKind::UpstreamStepFailed => "UpstreamStepFailed",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::NarrationUnavailable => "NarrationUnavailable",
            ErrorKind::SchemaInvalid => "SchemaInvalid",
        };
        f.write_str(name)
    }
}
