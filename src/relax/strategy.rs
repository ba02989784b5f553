use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{LiteralPolicy, RelaxationPolicy};
use crate::dataset::{Dataset, SemanticType};
use crate::filter::numeric_literal;
use crate::plan::{Literal, Operator, Predicate};

/// One loosened threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelaxationEntry {
    /// Position of the predicate in the query's filter list
    pub predicate_index: usize,
    pub column: String,
    pub operator: Operator,
    pub original_value: f64,
    pub relaxed_value: f64,
}

/// Outcome of a relaxation run
#[derive(Debug, Clone)]
pub struct Relaxed<T> {
    /// Result of the last attempt
    pub outcome: T,
    pub log: Vec<RelaxationEntry>,
    /// Whether the last attempt found rows
    pub satisfied: bool,
}

/// Indices of predicates relaxation may loosen
///
/// These are `<`, `<=`, `>` and `>=` predicates on numeric columns whose
/// literal is (or widens to) a number, in their original order.
pub fn eligible_thresholds(
    dataset: &Dataset,
    predicates: &[Predicate],
    literals: &LiteralPolicy,
) -> Vec<usize> {
    predicates
        .iter()
        .enumerate()
        .filter(|(_, p)| p.op.is_threshold())
        .filter(|(_, p)| {
            dataset
                .field(&p.column)
                .is_some_and(|f| f.semantic_type == SemanticType::Numeric)
        })
        .filter(|(_, p)| numeric_literal(&p.value, literals).is_some())
        .map(|(i, _)| i)
        .collect()
}

/// Move a threshold toward inclusivity by `fraction` of its magnitude
///
/// A zero threshold moves by `fraction` itself so it still widens.
pub fn widen(value: f64, op: Operator, fraction: f64) -> f64 {
    let step = if value == 0.0 {
        fraction
    } else {
        value.abs() * fraction
    };
    match op {
        Operator::Gt | Operator::Ge => value - step,
        Operator::Lt | Operator::Le => value + step,
        _ => value,
    }
}

/// Loosen eligible thresholds round-robin until `attempt` finds rows
///
/// `attempt` re-runs the query with the given predicates and reports its
/// result plus whether any rows matched. At most `policy.max_rounds`
/// predicates are loosened in total. Returns `None` when there was nothing
/// to loosen.
pub fn relax<T, E, F>(
    predicates: &[Predicate],
    eligible: &[usize],
    policy: &RelaxationPolicy,
    literals: &LiteralPolicy,
    mut attempt: F,
) -> Result<Option<Relaxed<T>>, E>
where
    F: FnMut(&[Predicate]) -> Result<(T, bool), E>,
{
    if eligible.is_empty() || policy.max_rounds == 0 {
        return Ok(None);
    }

    let mut current = predicates.to_vec();
    let mut log = Vec::new();
    let mut last = None;

    for round in 0..policy.max_rounds {
        let index = eligible[round % eligible.len()];
        let predicate = &current[index];
        let Some(original) = numeric_literal(&predicate.value, literals) else {
            continue;
        };
        let relaxed = widen(original, predicate.op, policy.step_fraction);
        debug!(
            round,
            column = %predicate.column,
            op = %predicate.op,
            from = original,
            to = relaxed,
            "relaxing threshold"
        );
        log.push(RelaxationEntry {
            predicate_index: index,
            column: predicate.column.clone(),
            operator: predicate.op,
            original_value: original,
            relaxed_value: relaxed,
        });
        current[index].value = Literal::Number(relaxed);

        let (outcome, found) = attempt(&current)?;
        if found {
            return Ok(Some(Relaxed {
                outcome,
                log,
                satisfied: true,
            }));
        }
        last = Some(outcome);
    }

    Ok(last.map(|outcome| Relaxed {
        outcome,
        log,
        satisfied: false,
    }))
}
