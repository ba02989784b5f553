//! Types for resolved query components

use serde::Serialize;

use crate::plan::{AggregateSpec, OrderBy, Predicate};

/// A query step with every column name mapped onto its canonical column
///
/// `order_by` names an output column of the step: a group-by column, an
/// aggregation output, or (for row-level queries) any dataset column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedQuery {
    pub filters: Vec<Predicate>,
    pub group_by: Vec<String>,
    pub aggregations: Vec<AggregateSpec>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
    /// Projection for row-level queries; empty keeps every column
    pub select: Vec<String>,
}

impl ResolvedQuery {
    /// Whether the query groups or aggregates
    pub fn is_aggregated(&self) -> bool {
        !self.group_by.is_empty() || !self.aggregations.is_empty()
    }

    /// Output columns of an aggregated query, group-by columns first
    ///
    /// Row-level queries keep the dataset's columns, so this returns `None`.
    pub fn output_names(&self) -> Option<Vec<&str>> {
        if !self.is_aggregated() {
            return None;
        }
        Some(
            self.group_by
                .iter()
                .map(String::as_str)
                .chain(self.aggregations.iter().map(|a| a.output.as_str()))
                .collect(),
        )
    }
}
