//! Step errors

use thiserror::Error;

use crate::aggregate::AggregateError;
use crate::chart::StoreError;
use crate::dataset::DatasetError;
use crate::error::ErrorKind;
use crate::filter::FilterError;
use crate::narrate::NarrationError;
use crate::plan::PlanError;
use crate::resolver::ResolveError;

/// Why a single step failed
///
/// A failed step does not stop the plan; later steps that depend on it fail
/// with [`StepError::UpstreamStepFailed`] instead of re-running it.
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(
        "Chart column '{column}' is not in the query result (columns: {})",
        .available.join(", ")
    )]
    ChartColumnMissing {
        column: String,
        available: Vec<String>,
    },
    #[error("Step {step} failed ({cause}), nothing to build on")]
    UpstreamStepFailed { step: usize, cause: ErrorKind },
    #[error("Narration unavailable: {0}")]
    NarrationUnavailable(#[from] NarrationError),
}

impl StepError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StepError::Resolve(e) => e.kind(),
            StepError::Filter(e) => e.kind(),
            StepError::Aggregate(e) => e.kind(),
            StepError::Plan(e) => e.kind(),
            StepError::Dataset(e) => e.kind(),
            StepError::Store(e) => e.kind(),
            StepError::ChartColumnMissing { .. } => ErrorKind::ChartColumnMissing,
            StepError::UpstreamStepFailed { .. } => ErrorKind::UpstreamStepFailed,
            StepError::NarrationUnavailable(_) => ErrorKind::NarrationUnavailable,
        }
    }

    /// Whether later turns can carry on as normal
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StepError::NarrationUnavailable(_))
    }
}
