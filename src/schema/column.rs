//! Column definitions

use serde::{Deserialize, Serialize};

use crate::dataset::SemanticType;

/// A canonical column with the user-facing aliases that refer to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    /// Semantic type (numeric, categorical, boolean, datetime)
    #[serde(rename = "type")]
    pub semantic_type: SemanticType,
    /// Alternative names users and planners may use
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Human-readable description, passed through to planners
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            semantic_type,
            aliases: Vec::new(),
            description: None,
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Get the semantic type of this column
    pub fn semantic_type(&self) -> SemanticType {
        self.semantic_type
    }
}
