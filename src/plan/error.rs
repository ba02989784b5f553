//! Plan validation errors

use thiserror::Error;

use crate::error::ErrorKind;

#[derive(Debug, Error)]
pub enum PlanError {
    /// A step, or one of its fields, does not have the expected shape
    #[error("Invalid plan{}: {reason}", location(.step, .field))]
    InvalidPlan {
        step: Option<usize>,
        field: Option<String>,
        reason: String,
    },
    /// The payload is not JSON at all
    #[error("Invalid plan JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn location(step: &Option<usize>, field: &Option<String>) -> String {
    match (step, field) {
        (Some(step), Some(field)) => format!(" at step {} field '{}'", step, field),
        (Some(step), None) => format!(" at step {}", step),
        (None, Some(field)) => format!(" field '{}'", field),
        (None, None) => String::new(),
    }
}

impl PlanError {
    pub fn invalid(step: Option<usize>, field: Option<&str>, reason: impl Into<String>) -> Self {
        PlanError::InvalidPlan {
            step,
            field: field.map(str::to_string),
            reason: reason.into(),
        }
    }

    /// Step index the error points at, if any
    pub fn step(&self) -> Option<usize> {
        match self {
            PlanError::InvalidPlan { step, .. } => *step,
            PlanError::Json(_) => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidPlan
    }
}
