//! Chart store errors

use thiserror::Error;

use super::spec::ChartId;
use crate::error::ErrorKind;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Chart {0} not found")]
    NotFound(ChartId),
    /// Persisted history does not describe an append-only log
    #[error("Chart history corrupt: {0}")]
    Corrupt(String),
    #[error("Chart history JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotFound(_) => ErrorKind::NotFound,
            // the persisted layout is itself a schema
            StoreError::Corrupt(_) | StoreError::Json(_) => ErrorKind::SchemaInvalid,
        }
    }
}
