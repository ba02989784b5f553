mod error;
mod resolve;
mod types;

pub use error::ResolveError;
pub use resolve::{resolve_query, SchemaResolver};
pub use types::ResolvedQuery;
