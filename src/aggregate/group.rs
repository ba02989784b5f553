use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::error::AggregateError;
use crate::dataset::{Dataset, Field, GroupKey, Row, SemanticType, Value};
use crate::plan::{AggregateFunction, AggregateSpec};

/// Running state of one aggregation within one group
#[derive(Debug, Clone)]
enum Accumulator {
    Count(u64),
    Sum(f64),
    Mean { sum: f64, count: u64 },
    Min(Option<Value>),
    Max(Option<Value>),
    Distinct(HashSet<GroupKey>),
}

impl Accumulator {
    fn new(function: AggregateFunction) -> Self {
        match function {
            AggregateFunction::Count => Accumulator::Count(0),
            AggregateFunction::Sum => Accumulator::Sum(0.0),
            AggregateFunction::Mean => Accumulator::Mean { sum: 0.0, count: 0 },
            AggregateFunction::Min => Accumulator::Min(None),
            AggregateFunction::Max => Accumulator::Max(None),
            AggregateFunction::CountDistinct => Accumulator::Distinct(HashSet::new()),
        }
    }

    fn update(&mut self, value: &Value) {
        if value.is_null() {
            return;
        }
        match self {
            Accumulator::Count(n) => *n += 1,
            Accumulator::Sum(sum) => *sum += value.as_f64().unwrap_or(0.0),
            Accumulator::Mean { sum, count } => {
                if let Some(v) = value.as_f64() {
                    *sum += v;
                    *count += 1;
                }
            }
            Accumulator::Min(best) => keep_if(best, value, Ordering::Less),
            Accumulator::Max(best) => keep_if(best, value, Ordering::Greater),
            Accumulator::Distinct(seen) => {
                seen.insert(value.group_key());
            }
        }
    }

    fn finish(self) -> Value {
        match self {
            Accumulator::Count(n) => Value::Number(n as f64),
            Accumulator::Sum(sum) => Value::Number(sum),
            Accumulator::Mean { count: 0, .. } => Value::Null,
            Accumulator::Mean { sum, count } => Value::Number(sum / count as f64),
            Accumulator::Min(best) | Accumulator::Max(best) => best.unwrap_or(Value::Null),
            Accumulator::Distinct(seen) => Value::Number(seen.len() as f64),
        }
    }
}

/// Replace `best` with `value` when `value` compares as `wanted` against it
fn keep_if(best: &mut Option<Value>, value: &Value, wanted: Ordering) {
    let replace = match best {
        None => true,
        Some(current) => value.compare(current) == Some(wanted),
    };
    if replace {
        *best = Some(value.clone());
    }
}

/// Group rows and compute aggregations
///
/// Output columns are the group-by columns in order followed by the
/// aggregation outputs in declaration order. With no group-by columns the
/// result is exactly one row, even for an empty input. Groups appear in the
/// order their first row appears in the input.
pub fn aggregate<S: AsRef<str>>(
    dataset: &Dataset,
    group_by: &[S],
    aggregations: &[AggregateSpec],
) -> Result<Dataset, AggregateError> {
    let mut fields = Vec::with_capacity(group_by.len() + aggregations.len());
    let mut key_indices = Vec::with_capacity(group_by.len());
    for name in group_by {
        let name = name.as_ref();
        let index = dataset
            .column_index(name)
            .ok_or_else(|| AggregateError::UnknownColumn(name.to_string()))?;
        if key_indices.contains(&index) {
            return Err(AggregateError::InvalidAggregation {
                output: name.to_string(),
                reason: "column is grouped on twice".to_string(),
            });
        }
        key_indices.push(index);
        fields.push(dataset.fields()[index].clone());
    }

    let mut source_indices = Vec::with_capacity(aggregations.len());
    for spec in aggregations {
        let index = dataset
            .column_index(&spec.column)
            .ok_or_else(|| AggregateError::UnknownColumn(spec.column.clone()))?;
        let source = &dataset.fields()[index];

        if spec.function.requires_numeric() && source.semantic_type != SemanticType::Numeric {
            return Err(AggregateError::InvalidAggregation {
                output: spec.output.clone(),
                reason: format!(
                    "{} needs a numeric column but '{}' is {}",
                    spec.function, source.name, source.semantic_type
                ),
            });
        }
        if fields.iter().any(|f| f.name == spec.output) {
            return Err(AggregateError::InvalidAggregation {
                output: spec.output.clone(),
                reason: "output column name is already in use".to_string(),
            });
        }

        let output_type = match spec.function {
            AggregateFunction::Min | AggregateFunction::Max => source.semantic_type,
            _ => SemanticType::Numeric,
        };
        fields.push(Field::new(spec.output.clone(), output_type));
        source_indices.push(index);
    }

    let fresh = || -> Vec<Accumulator> {
        aggregations
            .iter()
            .map(|spec| Accumulator::new(spec.function))
            .collect()
    };

    // group key -> position in `groups`
    let mut positions: HashMap<Vec<GroupKey>, usize> = HashMap::new();
    let mut groups: Vec<(Row, Vec<Accumulator>)> = Vec::new();
    if key_indices.is_empty() {
        groups.push((Vec::new(), fresh()));
    }

    for row in dataset.rows() {
        let position = if key_indices.is_empty() {
            0
        } else {
            let key: Vec<GroupKey> = key_indices.iter().map(|&i| row[i].group_key()).collect();
            *positions.entry(key).or_insert_with(|| {
                let values = key_indices.iter().map(|&i| row[i].clone()).collect();
                groups.push((values, fresh()));
                groups.len() - 1
            })
        };

        let accumulators = &mut groups[position].1;
        for (acc, &index) in accumulators.iter_mut().zip(&source_indices) {
            acc.update(&row[index]);
        }
    }

    let rows: Vec<Row> = groups
        .into_iter()
        .map(|(mut values, accumulators)| {
            values.extend(accumulators.into_iter().map(Accumulator::finish));
            values
        })
        .collect();

    debug!(
        input_rows = dataset.len(),
        groups = rows.len(),
        aggregations = aggregations.len(),
        "aggregated"
    );
    Ok(Dataset::from_parts(fields, rows))
}
