//! Semantic column types

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Semantic type of a dataset column
///
/// This is coarser than a storage type: it only says which operators and
/// aggregations make sense for the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticType {
    /// Integers and floats, compared and aggregated numerically
    Numeric,
    /// Labels such as segment, region or company name
    Categorical,
    /// true / false flags
    Boolean,
    /// Calendar dates
    Datetime,
}

impl SemanticType {
    /// Can values of this type be ordered with `<`, `>` and friends?
    pub fn is_ordered(&self) -> bool {
        matches!(self, SemanticType::Numeric | SemanticType::Datetime)
    }
}

impl Default for SemanticType {
    fn default() -> Self {
        SemanticType::Categorical
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticType::Numeric => write!(f, "numeric"),
            SemanticType::Categorical => write!(f, "categorical"),
            SemanticType::Boolean => write!(f, "boolean"),
            SemanticType::Datetime => write!(f, "datetime"),
        }
    }
}

/// Error when parsing a semantic type string
#[derive(Debug, Clone)]
pub struct ParseSemanticTypeError {
    pub input: String,
}

impl fmt::Display for ParseSemanticTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid semantic type '{}': expected numeric, categorical, boolean or datetime",
            self.input
        )
    }
}

impl std::error::Error for ParseSemanticTypeError {}

impl FromStr for SemanticType {
    type Err = ParseSemanticTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "numeric" | "number" | "float" | "double" | "int" | "integer" | "decimal" => {
                Ok(SemanticType::Numeric)
            }
            "categorical" | "category" | "string" | "text" => Ok(SemanticType::Categorical),
            "boolean" | "bool" => Ok(SemanticType::Boolean),
            "datetime" | "date" | "timestamp" => Ok(SemanticType::Datetime),
            _ => Err(ParseSemanticTypeError {
                input: s.to_string(),
            }),
        }
    }
}

impl<'de> Deserialize<'de> for SemanticType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        SemanticType::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for SemanticType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
