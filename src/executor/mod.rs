//! Plan execution (verb)
//!
//! Runs a validated plan step by step against the session dataset and
//! reports one result per step.

mod error;
mod execute;
mod query;
mod result;

pub use error::StepError;
pub use execute::PlanExecutor;
pub use query::fingerprint;
pub use result::{QueryResult, ResultStatus, StepOutput, StepResult};
