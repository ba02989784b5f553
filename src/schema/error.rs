//! Schema errors

use thiserror::Error;

use crate::dataset::DatasetError;
use crate::error::{ErrorKind, ParseError};

/// Errors raised while loading or validating a schema
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema breaks one of its own invariants, or disagrees with the dataset
    #[error("Schema invalid: {0}")]
    Invalid(String),
    /// The schema document could not be read
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The dataset supplied alongside the schema is malformed
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

impl SchemaError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::SchemaInvalid
    }
}
