//! Per-step execution results

use serde::Serialize;

use super::error::StepError;
use crate::chart::{ChartId, ChartSpec};
use crate::dataset::Dataset;
use crate::relax::RelaxationEntry;

/// Rows produced by a query step, plus how they were obtained
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub rows: Dataset,
    /// Whether thresholds were loosened to get here
    pub relaxed: bool,
    pub relaxation_log: Vec<RelaxationEntry>,
    /// Rows that passed the (final) filters, before grouping and limiting
    pub matched_rows: usize,
    /// BLAKE3 digest of the resolved query and its relaxations
    pub fingerprint: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStatus {
    /// Matched without relaxation
    Exact,
    /// Matched after loosening thresholds
    Relaxed,
    /// Nothing matched and there was nothing to loosen
    Empty,
    /// Nothing matched even after loosening thresholds
    EmptyAfterRelaxation,
}

impl QueryResult {
    /// Unrelaxed result over `rows`
    pub fn new(rows: Dataset) -> Self {
        Self {
            matched_rows: rows.len(),
            rows,
            relaxed: false,
            relaxation_log: Vec::new(),
            fingerprint: String::new(),
        }
    }

    pub fn status(&self) -> ResultStatus {
        match (self.matched_rows > 0, self.relaxed) {
            (true, false) => ResultStatus::Exact,
            (true, true) => ResultStatus::Relaxed,
            (false, false) => ResultStatus::Empty,
            (false, true) => ResultStatus::EmptyAfterRelaxation,
        }
    }

    /// Message to show next to the result, if any
    pub fn notice(&self) -> Option<String> {
        match self.status() {
            ResultStatus::Exact => None,
            ResultStatus::Empty => Some("No matching rows".to_string()),
            ResultStatus::Relaxed => {
                let changes: Vec<String> = self
                    .relaxation_log
                    .iter()
                    .map(|e| format!("{} {} {}", e.column, e.operator, e.relaxed_value))
                    .collect();
                Some(format!(
                    "No exact matches. Thresholds relaxed to: {}",
                    changes.join(", ")
                ))
            }
            ResultStatus::EmptyAfterRelaxation => {
                Some("No results even after relaxing thresholds".to_string())
            }
        }
    }
}

/// What a successful step produced
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutput {
    Query(QueryResult),
    Chart { id: ChartId, spec: ChartSpec },
    Narration(String),
}

/// Outcome of one step, in plan order
#[derive(Debug)]
pub struct StepResult {
    pub index: usize,
    pub kind: &'static str,
    pub outcome: Result<StepOutput, StepError>,
}

impl StepResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn query(&self) -> Option<&QueryResult> {
        match &self.outcome {
            Ok(StepOutput::Query(result)) => Some(result),
            _ => None,
        }
    }

    pub fn chart(&self) -> Option<(ChartId, &ChartSpec)> {
        match &self.outcome {
            Ok(StepOutput::Chart { id, spec }) => Some((*id, spec)),
            _ => None,
        }
    }

    pub fn narration(&self) -> Option<&str> {
        match &self.outcome {
            Ok(StepOutput::Narration(text)) => Some(text),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&StepError> {
        self.outcome.as_ref().err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::Operator;

    #[test]
    fn test_status_and_notice() {
        let mut result = QueryResult::new(Dataset::empty(vec![]));
        assert_eq!(result.status(), ResultStatus::Empty);

        result.relaxed = true;
        assert_eq!(
            result.notice().as_deref(),
            Some("No results even after relaxing thresholds")
        );

        result.matched_rows = 1;
        result.relaxation_log.push(RelaxationEntry {
            predicate_index: 0,
            column: "revenue".into(),
            operator: Operator::Gt,
            original_value: 500_000.0,
            relaxed_value: 450_000.0,
        });
        assert_eq!(result.status(), ResultStatus::Relaxed);
        assert_eq!(
            result.notice().as_deref(),
            Some("No exact matches. Thresholds relaxed to: revenue > 450000")
        );
    }
}
