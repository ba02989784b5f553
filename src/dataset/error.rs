//! Dataset construction errors

use thiserror::Error;

use super::types::SemanticType;
use crate::error::ErrorKind;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Duplicate column '{0}'")]
    DuplicateField(String),
    #[error("Row {row} has {found} values, expected {expected}")]
    WidthMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Row {row}, column '{column}': expected a {expected} value, found {found}")]
    CellType {
        row: usize,
        column: String,
        expected: SemanticType,
        found: SemanticType,
    },
    #[error("Column '{0}' not found")]
    UnknownColumn(String),
}

impl DatasetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownColumn(_) => ErrorKind::UnknownColumn,
            _ => ErrorKind::SchemaInvalid,
        }
    }
}
