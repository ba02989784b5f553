//! Chart snapshot types

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::dataset::Dataset;

/// Chart kinds the renderer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChartKind {
    #[default]
    Bar,
}

impl ChartKind {
    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error when parsing a chart kind string
#[derive(Debug, Clone)]
pub struct ParseChartKindError {
    pub input: String,
}

impl fmt::Display for ParseChartKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unsupported chart kind '{}', expected 'bar'", self.input)
    }
}

impl std::error::Error for ParseChartKindError {}

impl FromStr for ChartKind {
    type Err = ParseChartKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            // planners ask for "auto" when they have no preference
            "bar" | "auto" | "column" => Ok(ChartKind::Bar),
            _ => Err(ParseChartKindError {
                input: s.to_string(),
            }),
        }
    }
}

impl Serialize for ChartKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for ChartKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ChartKind::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Position of a chart in the session history
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartId(pub u64);

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything needed to redraw a chart without re-running its query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub x_column: String,
    pub y_column: String,
    pub kind: ChartKind,
    #[serde(default)]
    pub title: Option<String>,
    /// Fingerprint of the resolved query (and relaxations) that produced the rows
    pub source_query_fingerprint: String,
    /// Exactly two columns, `x_column` then `y_column`
    pub rendered_rows: Dataset,
}

impl ChartSpec {
    /// Title to show, falling back to "y by x"
    pub fn display_title(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => format!("{} by {}", self.y_column, self.x_column),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!("Auto".parse::<ChartKind>().unwrap(), ChartKind::Bar);
        assert!("pie".parse::<ChartKind>().is_err());
    }

    #[test]
    fn test_display_title() {
        let spec = ChartSpec {
            x_column: "segment".into(),
            y_column: "revenue".into(),
            kind: ChartKind::Bar,
            title: None,
            source_query_fingerprint: String::new(),
            rendered_rows: Dataset::empty(vec![]),
        };
        assert_eq!(spec.display_title(), "revenue by segment");
    }
}
