//! Filter errors

use thiserror::Error;

use crate::dataset::SemanticType;
use crate::error::ErrorKind;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// The literal, or the operator, does not fit the column's type
    #[error("Type mismatch in '{predicate}' on {column_type} column: {reason}")]
    TypeMismatch {
        predicate: String,
        column_type: SemanticType,
        reason: String,
    },
    /// The predicate names a column the dataset does not have
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),
}

impl FilterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FilterError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            FilterError::UnknownColumn(_) => ErrorKind::UnknownColumn,
        }
    }
}
