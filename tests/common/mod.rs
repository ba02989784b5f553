//! Shared test utilities for integration tests

#![allow(dead_code)]

use askdata::{parser, Dataset, Schema, Session};

/// Load a schema fixture from the tests/test_data directory
pub fn load_schema(name: &str) -> Schema {
    let path = format!("tests/test_data/{}", name);
    parser::parse_schema_file(&path)
        .unwrap_or_else(|e| panic!("Failed to load schema {}: {}", name, e))
}

/// Load a dataset fixture from the tests/test_data directory
pub fn load_dataset(name: &str) -> Dataset {
    let path = format!("tests/test_data/{}", name);
    parser::parse_dataset_file(&path)
        .unwrap_or_else(|e| panic!("Failed to load dataset {}: {}", name, e))
}

/// The customer churn fixture: 8 customers over 3 segments
pub fn churn() -> (Schema, Dataset) {
    (load_schema("churn.yaml"), load_dataset("churn.json"))
}

/// A fresh session over the churn fixture
pub fn churn_session() -> Session {
    let (schema, dataset) = churn();
    Session::new(schema, dataset).unwrap_or_else(|e| panic!("Fixture schema rejected: {}", e))
}

/// Route engine logs to the test writer; `RUST_LOG=askdata=debug` to see them
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Column `name` of a dataset as a vector of text cells
pub fn text_column(dataset: &Dataset, name: &str) -> Vec<String> {
    let index = dataset
        .column_index(name)
        .unwrap_or_else(|| panic!("Column {} not in {:?}", name, dataset.column_names()));
    dataset
        .column(index)
        .map(|v| v.as_str().unwrap_or_default().to_string())
        .collect()
}
