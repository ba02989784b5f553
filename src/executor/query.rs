//! Query step pipeline: resolve, filter, aggregate, sort, limit, project

use blake3::Hasher;
use serde::Serialize;
use tracing::{debug, warn};

use super::error::StepError;
use super::result::QueryResult;
use crate::aggregate::aggregate;
use crate::config::EngineConfig;
use crate::dataset::Dataset;
use crate::filter::apply_with;
use crate::plan::{Predicate, QueryStep};
use crate::relax::{eligible_thresholds, relax, RelaxationEntry};
use crate::resolver::{resolve_query, ResolveError, ResolvedQuery, SchemaResolver};

/// Run one query step against the base dataset
///
/// When the filters match nothing and the query has numeric thresholds,
/// they are relaxed and the query re-run; the result records every
/// relaxation applied.
pub(crate) fn run_query(
    dataset: &Dataset,
    resolver: &SchemaResolver<'_>,
    config: &EngineConfig,
    step: &QueryStep,
) -> Result<QueryResult, StepError> {
    let query = resolve_query(resolver, step)?;
    if query.is_aggregated() && !query.select.is_empty() {
        debug!("select ignored on an aggregated query");
    }

    let (rows, matched) = evaluate(dataset, &query, &query.filters, config)?;
    if matched > 0 {
        return Ok(finish(&query, rows, matched, Vec::new()));
    }

    let eligible = eligible_thresholds(dataset, &query.filters, &config.literals);
    let relaxed = relax(
        &query.filters,
        &eligible,
        &config.relaxation,
        &config.literals,
        |filters| {
            let (rows, matched) = evaluate(dataset, &query, filters, config)?;
            Ok::<_, StepError>(((rows, matched), matched > 0))
        },
    )?;

    match relaxed {
        None => Ok(finish(&query, rows, matched, Vec::new())),
        Some(relaxed) => {
            let ((rows, matched), log) = (relaxed.outcome, relaxed.log);
            if !relaxed.satisfied {
                warn!(rounds = log.len(), "no rows even after relaxing thresholds");
            }
            Ok(finish(&query, rows, matched, log))
        }
    }
}

/// Filter, then shape the surviving rows; returns the rows and the filtered count
fn evaluate(
    dataset: &Dataset,
    query: &ResolvedQuery,
    filters: &[Predicate],
    config: &EngineConfig,
) -> Result<(Dataset, usize), StepError> {
    let filtered = apply_with(dataset, filters, &config.literals)?;
    let matched = filtered.len();

    let mut rows = if query.is_aggregated() {
        aggregate(&filtered, &query.group_by, &query.aggregations)?
    } else {
        filtered
    };

    if let Some(order_by) = &query.order_by {
        let index = rows
            .column_index(&order_by.column)
            .ok_or_else(|| ResolveError::UnknownColumn(order_by.column.clone()))?;
        rows = rows.sorted_by(index, order_by.direction.is_descending());
    }

    if let Some(limit) = query.limit {
        rows = rows.truncated(limit);
    }

    if !query.is_aggregated() && !query.select.is_empty() {
        rows = rows.project(&query.select)?;
    }

    Ok((rows, matched))
}

fn finish(
    query: &ResolvedQuery,
    rows: Dataset,
    matched_rows: usize,
    relaxation_log: Vec<RelaxationEntry>,
) -> QueryResult {
    let fingerprint = fingerprint(query, &relaxation_log);
    QueryResult {
        rows,
        relaxed: !relaxation_log.is_empty(),
        relaxation_log,
        matched_rows,
        fingerprint,
    }
}

#[derive(Serialize)]
struct FingerprintInput<'a> {
    query: &'a ResolvedQuery,
    relaxations: &'a [RelaxationEntry],
}

/// BLAKE3 hex digest identifying a query and the relaxations applied to it
pub fn fingerprint(query: &ResolvedQuery, relaxations: &[RelaxationEntry]) -> String {
    let input = FingerprintInput {
        query,
        relaxations,
    };
    let bytes = serde_json::to_vec(&input).unwrap_or_else(|err| {
        warn!(error = %err, "query fingerprint is incomplete");
        Vec::new()
    });

    let mut hasher = Hasher::new();
    hasher.update(b"queryfp:v1");
    hasher.update(&bytes);
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Field, SemanticType, Value};
    use crate::plan::{AggregateFunction, AggregateSpec, Operator, OrderBy};
    use crate::schema::Schema;

    fn dataset() -> Dataset {
        Dataset::new(
            vec![
                Field::new("customer", SemanticType::Categorical),
                Field::new("revenue", SemanticType::Numeric),
            ],
            vec![
                vec![Value::from("Acme"), 120.0.into()],
                vec![Value::from("Globex"), 460.0.into()],
                vec![Value::from("Hooli"), 30.0.into()],
            ],
        )
        .unwrap()
    }

    fn run(step: &QueryStep) -> Result<QueryResult, StepError> {
        let ds = dataset();
        let schema = Schema::from_dataset(&ds);
        let resolver = SchemaResolver::new(&schema);
        run_query(&ds, &resolver, &EngineConfig::default(), step)
    }

    #[test]
    fn test_order_limit_select() {
        let result = run(&QueryStep::new()
            .with_order_by(OrderBy::desc("revenue"))
            .with_limit(2)
            .with_select(["customer"]))
        .unwrap();
        assert_eq!(result.rows.column_names(), vec!["customer"]);
        assert_eq!(
            result.rows.rows(),
            &[vec![Value::from("Globex")], vec![Value::from("Acme")]]
        );
        assert_eq!(result.matched_rows, 3);
        assert!(!result.relaxed);
    }

    #[test]
    fn test_scalar_aggregate_over_empty_filter_relaxes() {
        let result = run(&QueryStep::new()
            .with_filter(Predicate::new("revenue", Operator::Gt, 500.0))
            .with_aggregation(AggregateSpec::new("n", "customer", AggregateFunction::Count)))
        .unwrap();
        assert!(result.relaxed);
        assert_eq!(result.relaxation_log.len(), 1);
        assert_eq!(result.rows.rows(), &[vec![Value::from(1.0)]]);
    }

    #[test]
    fn test_no_thresholds_means_no_relaxation() {
        let result = run(&QueryStep::new().with_filter(Predicate::new(
            "customer",
            Operator::Eq,
            "Initech",
        )))
        .unwrap();
        assert!(!result.relaxed);
        assert_eq!(result.matched_rows, 0);
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let step = QueryStep::new().with_filter(Predicate::new("revenue", Operator::Gt, 100.0));
        let a = run(&step).unwrap();
        let b = run(&step).unwrap();
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_eq!(a.fingerprint.len(), 64);

        let other = run(&QueryStep::new()).unwrap();
        assert_ne!(a.fingerprint, other.fingerprint);
    }
}
