//! Chart types (nouns)
//!
//! Immutable chart snapshots and the session's append-only chart history.

mod error;
mod spec;
mod store;

pub use error::StoreError;
pub use spec::{ChartId, ChartKind, ChartSpec, ParseChartKindError};
pub use store::ChartSpecStore;
