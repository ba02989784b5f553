//! Plan types (nouns)
//!
//! A plan is the validated form of a planner's output: an ordered list of
//! query, chart and narrate steps.

mod error;
mod payload;
mod predicate;
mod query;
mod step;

pub use error::PlanError;
pub use predicate::{Literal, Operator, ParseOperatorError, Predicate};
pub use query::{
    AggregateFunction, AggregateSpec, OrderBy, ParseAggregateFunctionError, QueryStep,
    SortDirection,
};
pub use step::{ChartStep, NarrateStep, NarrationHint, Plan, Step};
