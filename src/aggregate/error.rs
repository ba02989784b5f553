//! Aggregation errors

use thiserror::Error;

use crate::error::ErrorKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("Invalid aggregation '{output}': {reason}")]
    InvalidAggregation { output: String, reason: String },
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),
}

impl AggregateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AggregateError::InvalidAggregation { .. } => ErrorKind::InvalidAggregation,
            AggregateError::UnknownColumn(_) => ErrorKind::UnknownColumn,
        }
    }
}
