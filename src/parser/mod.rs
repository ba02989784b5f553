//! Document parser (verb module)
//!
//! Transforms YAML and JSON documents into schema, config, plan and dataset
//! types.

use std::path::Path;

use crate::config::EngineConfig;
use crate::dataset::Dataset;
use crate::error::ParseError;
use crate::plan::{Plan, PlanError};
use crate::schema::{Schema, SchemaDocument, SchemaError};

fn read(path: &Path) -> Result<String, ParseError> {
    std::fs::read_to_string(path).map_err(|e| ParseError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Parse a schema from a YAML file
pub fn parse_schema_file<P: AsRef<Path>>(path: P) -> Result<Schema, SchemaError> {
    let contents = read(path.as_ref())?;
    parse_schema_str(&contents)
}

/// Parse a schema from a YAML string
pub fn parse_schema_str(yaml: &str) -> Result<Schema, SchemaError> {
    let document: SchemaDocument = serde_yaml::from_str(yaml).map_err(ParseError::from)?;
    Schema::from_document(document)
}

/// Parse engine configuration from a YAML file
pub fn parse_config_file<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ParseError> {
    let contents = read(path.as_ref())?;
    parse_config_str(&contents)
}

/// Parse engine configuration from a YAML string
///
/// Missing keys take their defaults; an empty document is the default config.
pub fn parse_config_str(yaml: &str) -> Result<EngineConfig, ParseError> {
    let config = if yaml.trim().is_empty() {
        EngineConfig::default()
    } else {
        serde_yaml::from_str(yaml)?
    };
    config.validate()?;
    Ok(config)
}

/// Parse a dataset from a JSON file (`{"fields": [...], "rows": [[...]]}`)
pub fn parse_dataset_file<P: AsRef<Path>>(path: P) -> Result<Dataset, ParseError> {
    let contents = read(path.as_ref())?;
    parse_dataset_str(&contents)
}

/// Parse a dataset from a JSON string
pub fn parse_dataset_str(json: &str) -> Result<Dataset, ParseError> {
    Ok(serde_json::from_str(json)?)
}

/// Parse and validate a planner payload
pub fn parse_plan_str(json: &str) -> Result<Plan, PlanError> {
    Plan::from_json_str(json)
}
