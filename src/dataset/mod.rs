//! Dataset types (nouns)
//!
//! The in-memory table the engine reads. Owned by the caller and never
//! mutated by the engine.

mod error;
mod frame;
mod types;
mod value;

pub use error::DatasetError;
pub use frame::{Dataset, Field, Row};
pub use types::{ParseSemanticTypeError, SemanticType};
pub use value::{GroupKey, Value};
