//! Query step definition

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::predicate::Predicate;

/// Aggregation function applied to one source column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    /// Number of non-null values
    Count,
    Sum,
    Mean,
    Min,
    Max,
    /// Number of distinct non-null values
    CountDistinct,
}

impl AggregateFunction {
    /// Whether the source column must be numeric
    pub fn requires_numeric(&self) -> bool {
        matches!(self, AggregateFunction::Sum | AggregateFunction::Mean)
    }

    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "count",
            AggregateFunction::Sum => "sum",
            AggregateFunction::Mean => "mean",
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
            AggregateFunction::CountDistinct => "count_distinct",
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error when parsing an aggregation function name
#[derive(Debug, Clone)]
pub struct ParseAggregateFunctionError {
    pub input: String,
}

impl fmt::Display for ParseAggregateFunctionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown aggregation '{}', expected one of count, sum, mean, min, max, count_distinct",
            self.input
        )
    }
}

impl std::error::Error for ParseAggregateFunctionError {}

impl FromStr for AggregateFunction {
    type Err = ParseAggregateFunctionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "count" => Ok(AggregateFunction::Count),
            "sum" | "total" => Ok(AggregateFunction::Sum),
            "mean" | "avg" | "average" => Ok(AggregateFunction::Mean),
            "min" | "minimum" => Ok(AggregateFunction::Min),
            "max" | "maximum" => Ok(AggregateFunction::Max),
            "count_distinct" | "nunique" | "distinct" => Ok(AggregateFunction::CountDistinct),
            _ => Err(ParseAggregateFunctionError {
                input: s.to_string(),
            }),
        }
    }
}

impl Serialize for AggregateFunction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for AggregateFunction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        AggregateFunction::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// One aggregation output column: `output = function(column)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSpec {
    pub output: String,
    pub column: String,
    pub function: AggregateFunction,
}

impl AggregateSpec {
    pub fn new(
        output: impl Into<String>,
        column: impl Into<String>,
        function: AggregateFunction,
    ) -> Self {
        Self {
            output: output.into(),
            column: column.into(),
            function,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn is_descending(&self) -> bool {
        matches!(self, SortDirection::Desc)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Filter, group, aggregate, sort and limit against the base dataset
///
/// Column names here are as the planner wrote them; the resolver maps them
/// onto canonical names before anything touches the data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryStep {
    #[serde(default)]
    pub filters: Vec<Predicate>,
    #[serde(default)]
    pub group_by: Vec<String>,
    #[serde(default)]
    pub aggregations: Vec<AggregateSpec>,
    #[serde(default)]
    pub order_by: Option<OrderBy>,
    #[serde(default)]
    pub limit: Option<usize>,
    /// Projection for non-aggregated queries; empty keeps every column
    #[serde(default)]
    pub select: Vec<String>,
}

impl QueryStep {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, predicate: Predicate) -> Self {
        self.filters.push(predicate);
        self
    }

    pub fn with_group_by(mut self, column: impl Into<String>) -> Self {
        self.group_by.push(column.into());
        self
    }

    pub fn with_aggregation(mut self, spec: AggregateSpec) -> Self {
        self.aggregations.push(spec);
        self
    }

    pub fn with_order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Whether the step groups or aggregates
    pub fn is_aggregated(&self) -> bool {
        !self.group_by.is_empty() || !self.aggregations.is_empty()
    }
}
