//! Plan payload validation
//!
//! Planners emit loosely shaped JSON:
//!
//! ```json
//! {"steps": [
//!   {"tool": "query", "args": {"filters": [{"col": "revenue", "op": ">", "value": "80k"}]}},
//!   {"tool": "chart", "args": {"x": "customer", "y": "revenue"}}
//! ]}
//! ```
//!
//! This module turns that into a [`Plan`], rejecting anything that does not
//! fit the closed set of step kinds. Unknown argument keys are ignored.

use serde_json::{Map, Value as JsonValue};

use super::error::PlanError;
use super::predicate::{Literal, Operator, Predicate};
use super::query::{AggregateFunction, AggregateSpec, OrderBy, QueryStep, SortDirection};
use super::step::{ChartStep, NarrateStep, NarrationHint, Plan, Step};
use crate::chart::ChartKind;

type Args = Map<String, JsonValue>;

impl Plan {
    /// Validate a planner payload into a plan
    pub fn from_json(payload: &JsonValue) -> Result<Plan, PlanError> {
        let steps = match payload {
            JsonValue::Object(obj) => match obj.get("steps") {
                Some(JsonValue::Array(steps)) => steps,
                Some(_) => {
                    return Err(PlanError::invalid(None, Some("steps"), "expected an array"));
                }
                None => return Err(PlanError::invalid(None, Some("steps"), "missing")),
            },
            JsonValue::Array(steps) => steps,
            _ => {
                return Err(PlanError::invalid(
                    None,
                    None,
                    "expected an object with a 'steps' array",
                ))
            }
        };

        let mut plan = Plan::default();
        for (index, raw) in steps.iter().enumerate() {
            let step = parse_step(index, raw, &plan.steps)?;
            plan.steps.push(step);
        }
        Ok(plan)
    }

    /// Parse and validate a JSON payload string
    pub fn from_json_str(payload: &str) -> Result<Plan, PlanError> {
        let value: JsonValue = serde_json::from_str(payload)?;
        Self::from_json(&value)
    }
}

fn parse_step(index: usize, raw: &JsonValue, earlier: &[Step]) -> Result<Step, PlanError> {
    let Some(obj) = raw.as_object() else {
        return Err(PlanError::invalid(Some(index), None, "step must be an object"));
    };

    let tool = obj
        .get("tool")
        .or_else(|| obj.get("kind"))
        .and_then(JsonValue::as_str)
        .ok_or_else(|| PlanError::invalid(Some(index), Some("tool"), "missing step kind"))?;

    // args may be nested under "args" or written inline on the step
    let args = match obj.get("args") {
        Some(JsonValue::Object(args)) => args,
        Some(JsonValue::Null) | None => obj,
        Some(_) => {
            return Err(PlanError::invalid(Some(index), Some("args"), "expected an object"));
        }
    };

    match tool.trim().to_lowercase().as_str() {
        "query" => parse_query(index, args).map(Step::Query),
        "chart" => parse_chart(index, args, earlier).map(Step::Chart),
        "narrate" => parse_narrate(index, args, earlier).map(Step::Narrate),
        other => Err(PlanError::invalid(
            Some(index),
            Some("tool"),
            format!("unknown step kind '{}'", other),
        )),
    }
}

// ============================================================================
// Query
// ============================================================================

fn parse_query(index: usize, args: &Args) -> Result<QueryStep, PlanError> {
    let mut step = QueryStep::new();

    if let Some(filters) = present(args, "filters") {
        let Some(filters) = filters.as_array() else {
            return Err(PlanError::invalid(Some(index), Some("filters"), "expected an array"));
        };
        for filter in filters {
            step.filters.extend(parse_filter(index, filter)?);
        }
    }

    if let Some(group_by) = present(args, "group_by") {
        step.group_by = string_list(index, "group_by", group_by)?;
    }

    if let Some(aggregations) = present(args, "aggregations") {
        step.aggregations = parse_aggregations(index, aggregations)?;
    }

    if let Some(order_by) = present(args, "order_by") {
        step.order_by = parse_order_by(index, order_by)?;
    }

    if let Some(limit) = present(args, "limit") {
        step.limit = Some(parse_limit(index, limit)?);
    }

    if let Some(select) = present(args, "select") {
        step.select = string_list(index, "select", select)?;
    }

    Ok(step)
}

fn parse_filter(index: usize, raw: &JsonValue) -> Result<Vec<Predicate>, PlanError> {
    let field = Some("filters");
    let Some(obj) = raw.as_object() else {
        return Err(PlanError::invalid(Some(index), field, "filter must be an object"));
    };

    let column = first_str(obj, &["col", "column", "field"])
        .ok_or_else(|| PlanError::invalid(Some(index), field, "filter is missing 'col'"))?;
    let op = first_str(obj, &["op", "operator"])
        .ok_or_else(|| PlanError::invalid(Some(index), field, "filter is missing 'op'"))?;
    let value = obj
        .get("value")
        .ok_or_else(|| PlanError::invalid(Some(index), field, "filter is missing 'value'"))?;

    if op.trim().eq_ignore_ascii_case("between") {
        let (low, high) = between_bounds(value)
            .ok_or_else(|| {
                PlanError::invalid(
                    Some(index),
                    field,
                    format!("'between' on '{}' needs two bounds", column),
                )
            })?;
        return Ok(vec![
            Predicate::new(column, Operator::Ge, literal(index, low)?),
            Predicate::new(column, Operator::Le, literal(index, high)?),
        ]);
    }

    let op: Operator = op
        .parse()
        .map_err(|e: super::predicate::ParseOperatorError| {
            PlanError::invalid(Some(index), field, e.to_string())
        })?;
    Ok(vec![Predicate::new(column, op, literal(index, value)?)])
}

fn between_bounds(value: &JsonValue) -> Option<(&JsonValue, &JsonValue)> {
    match value {
        JsonValue::Array(items) if items.len() == 2 => Some((&items[0], &items[1])),
        JsonValue::Object(obj) => {
            let low = obj.get("start").or_else(|| obj.get("min"))?;
            let high = obj.get("end").or_else(|| obj.get("max"))?;
            Some((low, high))
        }
        _ => None,
    }
}

fn literal(index: usize, value: &JsonValue) -> Result<Literal, PlanError> {
    let field = Some("filters");
    match value {
        JsonValue::Bool(b) => Ok(Literal::Bool(*b)),
        JsonValue::Number(n) => n
            .as_f64()
            .map(Literal::Number)
            .ok_or_else(|| PlanError::invalid(Some(index), field, "number out of range")),
        JsonValue::String(s) => Ok(Literal::Text(s.clone())),
        JsonValue::Array(items) => {
            let mut set = Vec::with_capacity(items.len());
            for item in items {
                if item.is_array() {
                    return Err(PlanError::invalid(
                        Some(index),
                        field,
                        "nested arrays are not valid filter values",
                    ));
                }
                set.push(literal(index, item)?);
            }
            Ok(Literal::Set(set))
        }
        JsonValue::Null => Err(PlanError::invalid(Some(index), field, "filter value is null")),
        JsonValue::Object(_) => Err(PlanError::invalid(
            Some(index),
            field,
            "object filter values are only valid with 'between'",
        )),
    }
}

fn parse_aggregations(index: usize, raw: &JsonValue) -> Result<Vec<AggregateSpec>, PlanError> {
    let field = Some("aggregations");
    let mut specs = Vec::new();

    match raw {
        // {"revenue": "mean"} or {"avg_revenue": {"column": "revenue", "function": "mean"}}
        JsonValue::Object(obj) => {
            for (output, spec) in obj {
                let spec = match spec {
                    JsonValue::String(function) => {
                        AggregateSpec::new(output, output, parse_function(index, function)?)
                    }
                    JsonValue::Object(inner) => {
                        let column =
                            first_str(inner, &["column", "col"]).unwrap_or(output.as_str());
                        let function = first_str(inner, &["function", "func", "agg"])
                            .ok_or_else(|| {
                                PlanError::invalid(
                                    Some(index),
                                    field,
                                    format!("aggregation '{}' is missing a function", output),
                                )
                            })?;
                        AggregateSpec::new(output, column, parse_function(index, function)?)
                    }
                    _ => {
                        return Err(PlanError::invalid(
                            Some(index),
                            field,
                            format!("aggregation '{}' must be a string or object", output),
                        ))
                    }
                };
                specs.push(spec);
            }
        }
        // [{"column": "revenue", "function": "sum", "output": "total"}]
        JsonValue::Array(items) => {
            for item in items {
                let Some(inner) = item.as_object() else {
                    return Err(PlanError::invalid(Some(index), field, "expected objects"));
                };
                let column = first_str(inner, &["column", "col"]).ok_or_else(|| {
                    PlanError::invalid(Some(index), field, "aggregation is missing 'column'")
                })?;
                let function = first_str(inner, &["function", "func", "agg"]).ok_or_else(|| {
                    PlanError::invalid(Some(index), field, "aggregation is missing 'function'")
                })?;
                let output = first_str(inner, &["output", "as", "name"]).unwrap_or(column);
                specs.push(AggregateSpec::new(output, column, parse_function(index, function)?));
            }
        }
        _ => return Err(PlanError::invalid(Some(index), field, "expected an object")),
    }

    Ok(specs)
}

fn parse_function(index: usize, name: &str) -> Result<AggregateFunction, PlanError> {
    name.parse()
        .map_err(|e: super::query::ParseAggregateFunctionError| {
            PlanError::invalid(Some(index), Some("aggregations"), e.to_string())
        })
}

fn parse_order_by(index: usize, raw: &JsonValue) -> Result<Option<OrderBy>, PlanError> {
    let field = Some("order_by");
    let key = match raw {
        JsonValue::Array(items) => match items.as_slice() {
            [] => return Ok(None),
            [key] => key,
            _ => {
                return Err(PlanError::invalid(
                    Some(index),
                    field,
                    "only one sort key is supported",
                ))
            }
        },
        other => other,
    };

    match key {
        JsonValue::String(column) => Ok(Some(OrderBy::asc(column.as_str()))),
        JsonValue::Object(obj) => {
            let column = first_str(obj, &["col", "column"])
                .ok_or_else(|| PlanError::invalid(Some(index), field, "missing 'col'"))?;
            let direction = match (obj.get("desc"), first_str(obj, &["direction", "dir"])) {
                (Some(JsonValue::Bool(true)), _) => SortDirection::Desc,
                (Some(JsonValue::Bool(false)), _) => SortDirection::Asc,
                (Some(_), _) => {
                    return Err(PlanError::invalid(Some(index), field, "'desc' must be a boolean"))
                }
                (None, Some(dir)) => match dir.trim().to_lowercase().as_str() {
                    "asc" | "ascending" => SortDirection::Asc,
                    "desc" | "descending" => SortDirection::Desc,
                    other => {
                        return Err(PlanError::invalid(
                            Some(index),
                            field,
                            format!("unknown sort direction '{}'", other),
                        ))
                    }
                },
                (None, None) => SortDirection::Asc,
            };
            Ok(Some(OrderBy {
                column: column.to_string(),
                direction,
            }))
        }
        _ => Err(PlanError::invalid(Some(index), field, "expected an object")),
    }
}

fn parse_limit(index: usize, raw: &JsonValue) -> Result<usize, PlanError> {
    let field = Some("limit");
    if let Some(n) = raw.as_u64() {
        if n == 0 {
            return Err(PlanError::invalid(Some(index), field, "must be a positive integer"));
        }
        return usize::try_from(n)
            .map_err(|_| PlanError::invalid(Some(index), field, "too large"));
    }
    // planners sometimes write 10.0
    match raw.as_f64() {
        Some(n) if n >= 1.0 && n.fract() == 0.0 && n <= usize::MAX as f64 => Ok(n as usize),
        _ => Err(PlanError::invalid(Some(index), field, "must be a positive integer")),
    }
}

// ============================================================================
// Chart and narrate
// ============================================================================

fn parse_chart(index: usize, args: &Args, earlier: &[Step]) -> Result<ChartStep, PlanError> {
    let x = required_str(index, args, "x")?;
    let y = required_str(index, args, "y")?;

    let kind = match present(args, "kind") {
        None => ChartKind::default(),
        Some(JsonValue::String(kind)) => kind
            .parse()
            .map_err(|e: crate::chart::ParseChartKindError| {
                PlanError::invalid(Some(index), Some("kind"), e.to_string())
            })?,
        Some(_) => return Err(PlanError::invalid(Some(index), Some("kind"), "expected a string")),
    };

    let title = optional_str(index, args, "title")?;
    let source = parse_source(index, args, earlier)?;

    Ok(ChartStep {
        source,
        x: x.to_string(),
        y: y.to_string(),
        kind,
        title,
    })
}

fn parse_narrate(index: usize, args: &Args, earlier: &[Step]) -> Result<NarrateStep, PlanError> {
    let source = parse_source(index, args, earlier)?;
    let hint = NarrationHint {
        tone: optional_str(index, args, "tone")?,
        length: optional_str(index, args, "length")?,
        focus: optional_str(index, args, "focus")?,
    };
    Ok(NarrateStep { source, hint })
}

/// Explicit `source`, or the nearest preceding query step
fn parse_source(index: usize, args: &Args, earlier: &[Step]) -> Result<usize, PlanError> {
    let field = Some("source");
    let source = match present(args, "source") {
        Some(raw) => raw
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| PlanError::invalid(Some(index), field, "expected a step index"))?,
        None => earlier
            .iter()
            .rposition(|s| matches!(s, Step::Query(_)))
            .ok_or_else(|| {
                PlanError::invalid(Some(index), field, "no earlier query step to use")
            })?,
    };

    match earlier.get(source) {
        Some(Step::Query(_)) => Ok(source),
        Some(other) => Err(PlanError::invalid(
            Some(index),
            field,
            format!("step {} is a {} step, not a query", source, other.kind()),
        )),
        None => Err(PlanError::invalid(
            Some(index),
            field,
            format!("step {} does not precede this step", source),
        )),
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Value for `key`, treating an explicit null as absent
fn present<'a>(args: &'a Args, key: &str) -> Option<&'a JsonValue> {
    args.get(key).filter(|v| !v.is_null())
}

fn first_str<'a>(obj: &'a Args, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| obj.get(*k).and_then(JsonValue::as_str))
}

fn required_str<'a>(index: usize, args: &'a Args, key: &str) -> Result<&'a str, PlanError> {
    match present(args, key) {
        Some(JsonValue::String(s)) if !s.trim().is_empty() => Ok(s.as_str()),
        Some(_) => Err(PlanError::invalid(Some(index), Some(key), "expected a non-empty string")),
        None => Err(PlanError::invalid(Some(index), Some(key), "missing")),
    }
}

fn optional_str(index: usize, args: &Args, key: &str) -> Result<Option<String>, PlanError> {
    match present(args, key) {
        None => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(PlanError::invalid(Some(index), Some(key), "expected a string")),
    }
}

fn string_list(index: usize, key: &str, raw: &JsonValue) -> Result<Vec<String>, PlanError> {
    match raw {
        JsonValue::String(s) => Ok(vec![s.clone()]),
        JsonValue::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    PlanError::invalid(Some(index), Some(key), "expected column names")
                })
            })
            .collect(),
        _ => Err(PlanError::invalid(Some(index), Some(key), "expected a list of column names")),
    }
}
