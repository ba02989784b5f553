use std::collections::HashMap;

use tracing::debug;

use super::error::ResolveError;
use super::types::ResolvedQuery;
use crate::dataset::SemanticType;
use crate::plan::{AggregateSpec, OrderBy, QueryStep};
use crate::schema::{normalize_name, separator_key, Schema};

/// Maps user-facing column names and aliases onto canonical column names
///
/// Lookup runs in three tiers and stops at the first that matches:
///
/// 1. the exact canonical name
/// 2. the normalised name (trimmed, lowercased, whitespace collapsed)
///    against canonical names and aliases
/// 3. a separator-insensitive key (`churn-prob`, `Churn Prob`, `churn_prob`)
///    against canonical names and aliases; more than one candidate is an
///    error rather than a guess
#[derive(Debug, Clone)]
pub struct SchemaResolver<'a> {
    schema: &'a Schema,
    by_normalized: HashMap<String, &'a str>,
    by_separator_key: HashMap<String, Vec<&'a str>>,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        let mut by_normalized = HashMap::new();
        let mut by_separator_key: HashMap<String, Vec<&'a str>> = HashMap::new();

        for column in schema.columns() {
            let canonical = column.name.as_str();
            let names = std::iter::once(canonical).chain(column.aliases.iter().map(String::as_str));
            for name in names {
                // schema construction guarantees these never collide across columns
                by_normalized.insert(normalize_name(name), canonical);

                let candidates = by_separator_key.entry(separator_key(name)).or_default();
                if !candidates.contains(&canonical) {
                    candidates.push(canonical);
                }
            }
        }

        Self {
            schema,
            by_normalized,
            by_separator_key,
        }
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// Resolve a single name to its canonical column
    pub fn resolve(&self, name: &str) -> Result<&'a str, ResolveError> {
        if let Some(column) = self.schema.get_column(name) {
            return Ok(column.name.as_str());
        }

        let normalized = normalize_name(name);
        if normalized.is_empty() {
            return Err(ResolveError::UnknownColumn(name.to_string()));
        }
        if let Some(&canonical) = self.by_normalized.get(&normalized) {
            debug!(name, canonical, "resolved column by alias");
            return Ok(canonical);
        }

        let Some(candidates) = self.by_separator_key.get(&separator_key(name)) else {
            return Err(ResolveError::UnknownColumn(name.to_string()));
        };
        match candidates.as_slice() {
            [canonical] => {
                debug!(name, canonical, "resolved column by fuzzy match");
                Ok(*canonical)
            }
            [] => Err(ResolveError::UnknownColumn(name.to_string())),
            many => Err(ResolveError::AmbiguousColumn {
                name: name.to_string(),
                candidates: many.iter().map(|c| c.to_string()).collect(),
            }),
        }
    }

    /// Resolve names in order, stopping at the first that fails
    pub fn resolve_many<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<&'a str>, ResolveError> {
        names.iter().map(|n| self.resolve(n.as_ref())).collect()
    }

    /// Resolve, treating any failure as no match
    pub fn try_resolve(&self, name: &str) -> Option<&'a str> {
        self.resolve(name).ok()
    }

    /// Semantic type of a canonical column
    pub fn semantic_type(&self, canonical: &str) -> Option<SemanticType> {
        self.schema.semantic_type(canonical)
    }
}

/// Resolve every column reference in a query step
///
/// Aggregation outputs are names the step itself introduces, so they are
/// kept as written. `order_by` may name one of them directly.
///
/// `group_by` and `select` are de-duplicated after resolution, keeping the
/// first occurrence. A row-level `select` is extended with every filtered
/// column it does not already show.
pub fn resolve_query(
    resolver: &SchemaResolver<'_>,
    step: &QueryStep,
) -> Result<ResolvedQuery, ResolveError> {
    let filters = step
        .filters
        .iter()
        .map(|p| Ok(p.with_column(resolver.resolve(&p.column)?)))
        .collect::<Result<Vec<_>, ResolveError>>()?;

    let group_by = unique(resolver.resolve_many(&step.group_by)?);

    let aggregations = step
        .aggregations
        .iter()
        .map(|a| {
            Ok(AggregateSpec::new(
                a.output.as_str(),
                resolver.resolve(&a.column)?,
                a.function,
            ))
        })
        .collect::<Result<Vec<_>, ResolveError>>()?;

    let mut select = unique(resolver.resolve_many(&step.select)?);
    if !select.is_empty() && step.group_by.is_empty() && step.aggregations.is_empty() {
        for predicate in &filters {
            if !select.contains(&predicate.column) {
                select.push(predicate.column.clone());
            }
        }
    }

    let mut resolved = ResolvedQuery {
        filters,
        group_by,
        aggregations,
        order_by: None,
        limit: step.limit,
        select,
    };
    resolved.order_by = match &step.order_by {
        Some(order_by) => Some(resolve_order_by(resolver, &resolved, order_by)?),
        None => None,
    };
    Ok(resolved)
}

/// Map a sort key onto one of the query's output columns
fn resolve_order_by(
    resolver: &SchemaResolver<'_>,
    query: &ResolvedQuery,
    order_by: &OrderBy,
) -> Result<OrderBy, ResolveError> {
    let column = match query.output_names() {
        Some(outputs) => {
            if outputs.contains(&order_by.column.as_str()) {
                order_by.column.clone()
            } else {
                let canonical = resolver.resolve(&order_by.column)?;
                if let Some(output) = outputs.iter().find(|o| **o == canonical) {
                    output.to_string()
                } else if let Some(agg) =
                    query.aggregations.iter().find(|a| a.column == canonical)
                {
                    // "order by revenue" when revenue is only aggregated as avg_revenue
                    agg.output.clone()
                } else {
                    return Err(ResolveError::UnknownColumn(order_by.column.clone()));
                }
            }
        }
        None => resolver.resolve(&order_by.column)?.to_string(),
    };
    Ok(OrderBy {
        column,
        direction: order_by.direction,
    })
}

/// Owned names in first-occurrence order, repeats dropped
fn unique(names: Vec<&str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        if !out.iter().any(|n| n == name) {
            out.push(name.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{AggregateFunction, Operator, Predicate};
    use crate::schema::ColumnDef;

    fn schema() -> Schema {
        Schema::new(vec![
            ColumnDef::new("customer", SemanticType::Categorical).with_aliases(["client"]),
            ColumnDef::new("revenue", SemanticType::Numeric).with_aliases(["rev", "sales"]),
            ColumnDef::new("churn_prob", SemanticType::Numeric)
                .with_aliases(["churn probability", "churn risk"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_case_and_whitespace_agree() {
        let schema = schema();
        let resolver = SchemaResolver::new(&schema);
        for name in ["Revenue ", "REVENUE", "revenue", "  rev", "Sales"] {
            assert_eq!(resolver.resolve(name).unwrap(), "revenue", "{}", name);
        }
    }

    #[test]
    fn test_fuzzy_separator_match() {
        let schema = schema();
        let resolver = SchemaResolver::new(&schema);
        assert_eq!(resolver.resolve("Churn-Prob").unwrap(), "churn_prob");
        assert_eq!(resolver.resolve("churnrisk").unwrap(), "churn_prob");
    }

    #[test]
    fn test_typo_is_unknown() {
        let schema = schema();
        let resolver = SchemaResolver::new(&schema);
        assert_eq!(
            resolver.resolve("revenu"),
            Err(ResolveError::UnknownColumn("revenu".to_string()))
        );
        assert!(resolver.resolve("   ").is_err());
    }

    #[test]
    fn test_ambiguous_fuzzy_match() {
        let schema = Schema::new(vec![
            ColumnDef::new("churn_rate", SemanticType::Numeric),
            ColumnDef::new("churn rate", SemanticType::Numeric),
        ])
        .unwrap();
        let resolver = SchemaResolver::new(&schema);
        let err = resolver.resolve("ChurnRate").unwrap_err();
        assert_eq!(
            err,
            ResolveError::AmbiguousColumn {
                name: "ChurnRate".to_string(),
                candidates: vec!["churn_rate".to_string(), "churn rate".to_string()],
            }
        );
        // exact names still win
        assert_eq!(resolver.resolve("churn rate").unwrap(), "churn rate");
    }

    #[test]
    fn test_resolve_many_reports_first_failure() {
        let schema = schema();
        let resolver = SchemaResolver::new(&schema);
        let err = resolver.resolve_many(&["client", "profit", "bogus"]).unwrap_err();
        assert_eq!(err.name(), "profit");
    }

    #[test]
    fn test_resolve_query() {
        let schema = schema();
        let resolver = SchemaResolver::new(&schema);
        let step = QueryStep::new()
            .with_filter(Predicate::new("Rev", Operator::Gt, "80k"))
            .with_group_by("client")
            .with_aggregation(AggregateSpec::new("avg_rev", "sales", AggregateFunction::Mean))
            .with_order_by(OrderBy::desc("revenue"));
        let resolved = resolve_query(&resolver, &step).unwrap();
        assert_eq!(resolved.filters[0].column, "revenue");
        assert_eq!(resolved.group_by, vec!["customer"]);
        assert_eq!(resolved.aggregations[0].column, "revenue");
        assert_eq!(resolved.order_by, Some(OrderBy::desc("avg_rev")));
    }

    #[test]
    fn test_repeated_names_collapse() {
        let schema = schema();
        let resolver = SchemaResolver::new(&schema);
        let step = QueryStep::new().with_select(["customer", "rev", "revenue", "Client"]);
        let resolved = resolve_query(&resolver, &step).unwrap();
        assert_eq!(resolved.select, vec!["customer", "revenue"]);

        let step = QueryStep::new()
            .with_group_by("client")
            .with_group_by("customer")
            .with_aggregation(AggregateSpec::new("n", "revenue", AggregateFunction::Count));
        let resolved = resolve_query(&resolver, &step).unwrap();
        assert_eq!(resolved.group_by, vec!["customer"]);
    }

    #[test]
    fn test_filtered_columns_join_select() {
        let schema = schema();
        let resolver = SchemaResolver::new(&schema);
        let step = QueryStep::new()
            .with_filter(Predicate::new("rev", Operator::Gt, "80k"))
            .with_filter(Predicate::new("customer", Operator::Ne, "Acme"))
            .with_filter(Predicate::new("revenue", Operator::Lt, "1m"))
            .with_select(["customer"]);
        let resolved = resolve_query(&resolver, &step).unwrap();
        assert_eq!(resolved.select, vec!["customer", "revenue"]);

        // an empty select already shows everything
        let step = QueryStep::new().with_filter(Predicate::new("rev", Operator::Gt, 1.0));
        assert!(resolve_query(&resolver, &step).unwrap().select.is_empty());
    }

    #[test]
    fn test_order_by_missing_from_outputs() {
        let schema = schema();
        let resolver = SchemaResolver::new(&schema);
        let step = QueryStep::new()
            .with_group_by("customer")
            .with_order_by(OrderBy::asc("churn_prob"));
        let err = resolve_query(&resolver, &step).unwrap_err();
        assert_eq!(err, ResolveError::UnknownColumn("churn_prob".to_string()));
    }
}
