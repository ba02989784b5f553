//! Grouping and aggregation (verb)

mod error;
mod group;

pub use error::AggregateError;
pub use group::aggregate;
