use thiserror::Error;

use crate::error::ErrorKind;

/// Errors that can occur while resolving column names
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),
    #[error("Column '{name}' is ambiguous, could be any of: {}", .candidates.join(", "))]
    AmbiguousColumn {
        name: String,
        candidates: Vec<String>,
    },
}

impl ResolveError {
    /// The name as the caller wrote it
    pub fn name(&self) -> &str {
        match self {
            ResolveError::UnknownColumn(name) => name,
            ResolveError::AmbiguousColumn { name, .. } => name,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::UnknownColumn(_) => ErrorKind::UnknownColumn,
            ResolveError::AmbiguousColumn { .. } => ErrorKind::AmbiguousColumn,
        }
    }
}
