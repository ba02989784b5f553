//! Predicate evaluation
//!
//! Predicates are first bound to the dataset: the column is looked up and
//! the literal converted to a value of the column's type. Binding is where
//! type mismatches surface, so evaluation itself cannot fail.

use std::cmp::Ordering;

use chrono::NaiveDate;
use tracing::debug;

use super::error::FilterError;
use super::literal::numeric_literal;
use crate::config::LiteralPolicy;
use crate::dataset::{Dataset, SemanticType, Value};
use crate::plan::{Literal, Operator, Predicate};

/// A predicate checked against a concrete dataset
#[derive(Debug, Clone, PartialEq)]
pub struct BoundPredicate {
    pub column_index: usize,
    pub op: Operator,
    operand: Operand,
}

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Scalar(Value),
    Set(Vec<Value>),
    /// Lowercased substring for `contains`
    Needle(String),
}

impl BoundPredicate {
    /// Whether a row satisfies the predicate; null cells never do
    pub fn matches(&self, row: &[Value]) -> bool {
        let Some(cell) = row.get(self.column_index) else {
            return false;
        };
        if cell.is_null() {
            return false;
        }

        match (&self.op, &self.operand) {
            (Operator::Contains, Operand::Needle(needle)) => cell
                .as_str()
                .is_some_and(|text| text.to_lowercase().contains(needle.as_str())),
            (Operator::In, Operand::Set(items)) => items
                .iter()
                .any(|item| cell.compare(item) == Some(Ordering::Equal)),
            (op, Operand::Scalar(value)) => {
                let Some(ordering) = cell.compare(value) else {
                    return false;
                };
                match op {
                    Operator::Eq => ordering == Ordering::Equal,
                    Operator::Ne => ordering != Ordering::Equal,
                    Operator::Lt => ordering == Ordering::Less,
                    Operator::Le => ordering != Ordering::Greater,
                    Operator::Gt => ordering == Ordering::Greater,
                    Operator::Ge => ordering != Ordering::Less,
                    Operator::Contains | Operator::In => false,
                }
            }
            _ => false,
        }
    }
}

/// Keep the rows that satisfy every predicate
///
/// An empty predicate list returns the dataset unchanged.
pub fn apply(dataset: &Dataset, predicates: &[Predicate]) -> Result<Dataset, FilterError> {
    apply_with(dataset, predicates, &LiteralPolicy::default())
}

/// [`apply`] with an explicit literal widening policy
pub fn apply_with(
    dataset: &Dataset,
    predicates: &[Predicate],
    policy: &LiteralPolicy,
) -> Result<Dataset, FilterError> {
    if predicates.is_empty() {
        return Ok(dataset.clone());
    }

    let bound = predicates
        .iter()
        .map(|p| bind(dataset, p, policy))
        .collect::<Result<Vec<_>, _>>()?;

    let indices: Vec<usize> = dataset
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| bound.iter().all(|b| b.matches(row)))
        .map(|(i, _)| i)
        .collect();

    debug!(
        predicates = predicates.len(),
        input_rows = dataset.len(),
        matched = indices.len(),
        "filter applied"
    );
    Ok(dataset.take_rows(&indices))
}

/// Check a predicate against the dataset and convert its literal
pub fn bind(
    dataset: &Dataset,
    predicate: &Predicate,
    policy: &LiteralPolicy,
) -> Result<BoundPredicate, FilterError> {
    let column_index = dataset
        .column_index(&predicate.column)
        .ok_or_else(|| FilterError::UnknownColumn(predicate.column.clone()))?;
    let column_type = dataset.fields()[column_index].semantic_type;
    let mismatch = |reason: String| FilterError::TypeMismatch {
        predicate: predicate.to_string(),
        column_type,
        reason,
    };

    let operand = match predicate.op {
        Operator::Contains => {
            if column_type != SemanticType::Categorical {
                return Err(mismatch("'contains' needs a categorical column".to_string()));
            }
            match &predicate.value {
                Literal::Text(text) => Operand::Needle(text.to_lowercase()),
                other => return Err(mismatch(format!("'contains' needs text, got {}", other))),
            }
        }
        Operator::In => match &predicate.value {
            Literal::Set(items) => Operand::Set(
                items
                    .iter()
                    .map(|item| coerce(item, column_type, policy).map_err(&mismatch))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            other => return Err(mismatch(format!("'in' needs a list of values, got {}", other))),
        },
        Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge => {
            if !column_type.is_ordered() {
                return Err(mismatch(format!(
                    "'{}' needs a numeric or date column",
                    predicate.op
                )));
            }
            Operand::Scalar(coerce(&predicate.value, column_type, policy).map_err(&mismatch)?)
        }
        Operator::Eq | Operator::Ne => {
            Operand::Scalar(coerce(&predicate.value, column_type, policy).map_err(&mismatch)?)
        }
    };

    Ok(BoundPredicate {
        column_index,
        op: predicate.op,
        operand,
    })
}

/// Convert a scalar literal to a value of the column's type
fn coerce(
    literal: &Literal,
    column_type: SemanticType,
    policy: &LiteralPolicy,
) -> Result<Value, String> {
    match (column_type, literal) {
        (_, Literal::Set(_)) => Err("a list is only valid with 'in'".to_string()),
        (SemanticType::Numeric, Literal::Number(_) | Literal::Text(_)) => {
            numeric_literal(literal, policy)
                .map(Value::Number)
                .ok_or_else(|| format!("{} is not a number", literal))
        }
        (SemanticType::Categorical, Literal::Text(text)) => Ok(Value::Text(text.clone())),
        (SemanticType::Boolean, Literal::Bool(b)) => Ok(Value::Bool(*b)),
        (SemanticType::Datetime, Literal::Text(text)) => {
            NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|_| format!("{} is not a YYYY-MM-DD date", literal))
        }
        (column_type, literal) => Err(format!("{} does not fit a {} column", literal, column_type)),
    }
}
