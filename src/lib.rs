//! askdata - Deterministic execution of structured analytics plans
//!
//! This library provides:
//! - Schema definition types (canonical columns, semantic types, aliases)
//! - Schema and config parsing from YAML, plan validation from JSON
//! - Column name resolution against the schema
//! - Filtering, grouping and aggregation over an in-memory dataset
//! - Threshold relaxation when a query matches nothing
//! - Chart snapshots kept in a per-session history
//! - An "A against B" shortcut that charts without a planner
//!
//! # Architecture
//!
//! **Noun modules** (data structures):
//! - `dataset/` - the in-memory table (Dataset, Field, Value)
//! - `schema/` - canonical columns (Schema, ColumnDef)
//! - `plan/` - validated plans (Plan, Step, QueryStep, Predicate)
//! - `chart/` - chart snapshots and their history (ChartSpec, ChartSpecStore)
//! - `config` - engine tuning (EngineConfig, RelaxationPolicy)
//!
//! **Verb modules** (transformations):
//! - `parser/` - YAML/JSON → Schema, EngineConfig, Dataset, Plan
//! - `resolver/` - Schema + QueryStep → ResolvedQuery
//! - `filter/` - Dataset + Predicates → Dataset
//! - `aggregate/` - Dataset + group by + aggregations → Dataset
//! - `relax/` - Predicates → widened Predicates + log
//! - `axes/` - free text → AxesShortcut
//! - `narrate/` - QueryResult → prose, via an external Narrator
//! - `executor/` - Plan + Dataset → StepResults
//!
//! `session` ties one dataset, its schema and its chart history together.
//!
//! # Example
//!
//! ```ignore
//! use askdata::{parser, Session};
//!
//! let schema = parser::parse_schema_file("schema.yaml")?;
//! let dataset = parser::parse_dataset_file("customers.json")?;
//! let mut session = Session::new(schema, dataset)?;
//!
//! let plan = parser::parse_plan_str(&payload)?;
//! for result in session.execute(&plan) {
//!     println!("step {}: {:?}", result.index, result.outcome);
//! }
//! ```

pub mod dataset;
pub mod schema;
pub mod plan;
pub mod chart;
pub mod config;
pub mod parser;
pub mod resolver;
pub mod filter;
pub mod aggregate;
pub mod relax;
pub mod axes;
pub mod narrate;
pub mod executor;
pub mod session;
pub mod error;

// Re-export commonly used types
pub use dataset::{Dataset, DatasetError, Field, SemanticType, Value};
pub use schema::{ColumnDef, Schema, SchemaError};
pub use plan::{
    AggregateFunction, AggregateSpec, ChartStep, Literal, NarrateStep, NarrationHint, Operator,
    OrderBy, Plan, PlanError, Predicate, QueryStep, SortDirection, Step,
};
pub use chart::{ChartId, ChartKind, ChartSpec, ChartSpecStore, StoreError};
pub use config::{EngineConfig, LiteralPolicy, RelaxationPolicy};
pub use resolver::{resolve_query, ResolveError, ResolvedQuery, SchemaResolver};
pub use filter::{apply, FilterError};
pub use aggregate::{aggregate, AggregateError};
pub use relax::{relax, RelaxationEntry};
pub use axes::AxesShortcut;
pub use narrate::{NarrationError, NarrationRequest, Narrator};
pub use executor::{PlanExecutor, QueryResult, ResultStatus, StepError, StepOutput, StepResult};
pub use session::{Session, ShortcutChart};
pub use error::{ErrorKind, ParseError};
