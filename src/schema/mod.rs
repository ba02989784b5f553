//! Schema types (nouns)
//!
//! Canonical column names, their semantic types and accepted aliases.

mod column;
mod definition;
mod error;
mod names;

pub use column::ColumnDef;
pub use definition::Schema;
pub(crate) use definition::SchemaDocument;
pub use error::SchemaError;
pub use names::{normalize_name, separator_key};
