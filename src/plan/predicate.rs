//! Filter predicates

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a [`Predicate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Case-insensitive substring match on categorical columns
    Contains,
    /// Membership in a set literal
    In,
}

impl Operator {
    /// Numeric-threshold operators, the only ones relaxation may loosen
    pub fn is_threshold(&self) -> bool {
        matches!(self, Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Contains => "contains",
            Operator::In => "in",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Error when parsing an operator string
#[derive(Debug, Clone)]
pub struct ParseOperatorError {
    pub input: String,
}

impl fmt::Display for ParseOperatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown operator '{}'", self.input)
    }
}

impl std::error::Error for ParseOperatorError {}

impl FromStr for Operator {
    type Err = ParseOperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "=" | "==" | "eq" => Ok(Operator::Eq),
            "!=" | "<>" | "ne" | "neq" => Ok(Operator::Ne),
            "<" | "lt" => Ok(Operator::Lt),
            "<=" | "lte" | "le" => Ok(Operator::Le),
            ">" | "gt" => Ok(Operator::Gt),
            ">=" | "gte" | "ge" => Ok(Operator::Ge),
            "contains" | "like" => Ok(Operator::Contains),
            "in" => Ok(Operator::In),
            _ => Err(ParseOperatorError {
                input: s.to_string(),
            }),
        }
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.symbol())
    }
}

impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Operator::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Literal operand as written in the plan
///
/// Literals stay as the planner wrote them (`"80k"` stays text); the filter
/// evaluator normalises them against the column type when it binds the
/// predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Number(f64),
    Text(String),
    Set(Vec<Literal>),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Text(s) => write!(f, "'{}'", s),
            Literal::Set(items) => {
                let parts: Vec<String> = items.iter().map(|i| i.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<f64> for Literal {
    fn from(n: f64) -> Self {
        Literal::Number(n)
    }
}

impl From<i64> for Literal {
    fn from(n: i64) -> Self {
        Literal::Number(n as f64)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::Text(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::Text(s)
    }
}

impl<T: Into<Literal>> From<Vec<T>> for Literal {
    fn from(items: Vec<T>) -> Self {
        Literal::Set(items.into_iter().map(Into::into).collect())
    }
}

/// A single filter condition: `column op value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub column: String,
    pub op: Operator,
    pub value: Literal,
}

impl Predicate {
    pub fn new(column: impl Into<String>, op: Operator, value: impl Into<Literal>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    /// Same predicate against a different column name
    pub fn with_column(&self, column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            op: self.op,
            value: self.value.clone(),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.column, self.op, self.value)
    }
}
