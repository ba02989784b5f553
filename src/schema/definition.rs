//! Root schema definition

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::column::ColumnDef;
use super::error::SchemaError;
use super::names::normalize_name;
use crate::dataset::{Dataset, SemanticType};

/// Canonical columns and their aliases
///
/// Construction validates that no two columns claim the same name or alias
/// after normalisation, so a `Schema` value is always safe to resolve against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    columns: Vec<ColumnDef>,
}

/// Unvalidated schema document as written in YAML
#[derive(Debug, Deserialize)]
pub(crate) struct SchemaDocument {
    pub columns: Vec<ColumnDef>,
}

impl Schema {
    /// Build a schema, rejecting duplicate names and overlapping aliases
    pub fn new(columns: Vec<ColumnDef>) -> Result<Self, SchemaError> {
        // normalised name or alias -> owning canonical column
        let mut claimed: HashMap<String, &str> = HashMap::new();

        for column in &columns {
            if column.name.trim().is_empty() {
                return Err(SchemaError::Invalid("column with an empty name".to_string()));
            }
            let key = normalize_name(&column.name);
            if let Some(owner) = claimed.insert(key, &column.name) {
                return Err(SchemaError::Invalid(format!(
                    "column '{}' collides with column '{}'",
                    column.name, owner
                )));
            }
        }

        for column in &columns {
            for alias in &column.aliases {
                let key = normalize_name(alias);
                if key.is_empty() {
                    return Err(SchemaError::Invalid(format!(
                        "column '{}' has an empty alias",
                        column.name
                    )));
                }
                match claimed.get(key.as_str()) {
                    Some(owner) if *owner == column.name => {}
                    Some(owner) => {
                        return Err(SchemaError::Invalid(format!(
                            "alias '{}' of column '{}' is already claimed by column '{}'",
                            alias, column.name, owner
                        )));
                    }
                    None => {
                        claimed.insert(key, &column.name);
                    }
                }
            }
        }

        Ok(Self { columns })
    }

    /// Schema with one alias-free column per dataset field
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let columns = dataset
            .fields()
            .iter()
            .map(|f| ColumnDef::new(f.name.clone(), f.semantic_type))
            .collect();
        // dataset field names are already unique
        Self { columns }
    }

    pub(crate) fn from_document(document: SchemaDocument) -> Result<Self, SchemaError> {
        Self::new(document.columns)
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Get a column by exact canonical name
    pub fn get_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn semantic_type(&self, name: &str) -> Option<SemanticType> {
        self.get_column(name).map(ColumnDef::semantic_type)
    }

    /// Check that every schema column exists in the dataset with the same type
    pub fn check_dataset(&self, dataset: &Dataset) -> Result<(), SchemaError> {
        for column in &self.columns {
            let field = dataset.field(&column.name).ok_or_else(|| {
                SchemaError::Invalid(format!(
                    "column '{}' is missing from the dataset",
                    column.name
                ))
            })?;
            if field.semantic_type != column.semantic_type {
                return Err(SchemaError::Invalid(format!(
                    "column '{}' is {} in the schema but {} in the dataset",
                    column.name, column.semantic_type, field.semantic_type
                )));
            }
        }
        Ok(())
    }
}
