//! Session chart history

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::StoreError;
use super::spec::{ChartId, ChartKind, ChartSpec};
use crate::dataset::Dataset;

/// Append-only history of chart snapshots
///
/// Ids are positions in the history, starting at 0. Specs are never mutated
/// once appended; replaying a chart reads `rendered_rows` and nothing else.
#[derive(Debug, Clone, Default)]
pub struct ChartSpecStore {
    charts: Vec<ChartSpec>,
}

/// Persisted record layout
#[derive(Debug, Serialize, Deserialize)]
struct StoredChart {
    id: ChartId,
    x_column: String,
    y_column: String,
    kind: ChartKind,
    #[serde(default)]
    title: Option<String>,
    source_query_fingerprint: String,
    rendered_rows: Dataset,
}

impl ChartSpecStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a spec and return its id
    pub fn append(&mut self, spec: ChartSpec) -> ChartId {
        let id = ChartId(self.charts.len() as u64);
        debug!(chart = %id, x = %spec.x_column, y = %spec.y_column, "chart appended");
        self.charts.push(spec);
        id
    }

    /// Get a chart by id
    pub fn get(&self, id: ChartId) -> Result<&ChartSpec, StoreError> {
        usize::try_from(id.0)
            .ok()
            .and_then(|index| self.charts.get(index))
            .ok_or(StoreError::NotFound(id))
    }

    /// Charts in append order
    pub fn history(&self) -> impl Iterator<Item = (ChartId, &ChartSpec)> + '_ {
        self.charts
            .iter()
            .enumerate()
            .map(|(index, spec)| (ChartId(index as u64), spec))
    }

    pub fn last(&self) -> Option<(ChartId, &ChartSpec)> {
        self.history().last()
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    /// Export the history as a JSON array of records
    pub fn to_json(&self) -> Result<String, StoreError> {
        let records: Vec<StoredChart> = self
            .history()
            .map(|(id, spec)| StoredChart {
                id,
                x_column: spec.x_column.clone(),
                y_column: spec.y_column.clone(),
                kind: spec.kind,
                title: spec.title.clone(),
                source_query_fingerprint: spec.source_query_fingerprint.clone(),
                rendered_rows: spec.rendered_rows.clone(),
            })
            .collect();
        Ok(serde_json::to_string_pretty(&records)?)
    }

    /// Restore a history exported by [`ChartSpecStore::to_json`]
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let records: Vec<StoredChart> = serde_json::from_str(json)?;
        let mut store = Self::new();
        for (expected, record) in records.into_iter().enumerate() {
            if record.id.0 != expected as u64 {
                return Err(StoreError::Corrupt(format!(
                    "expected chart #{} but found {}",
                    expected, record.id
                )));
            }
            if record.rendered_rows.fields().len() != 2 {
                return Err(StoreError::Corrupt(format!(
                    "chart {} has {} rendered columns, expected 2",
                    record.id,
                    record.rendered_rows.fields().len()
                )));
            }
            store.charts.push(ChartSpec {
                x_column: record.x_column,
                y_column: record.y_column,
                kind: record.kind,
                title: record.title,
                source_query_fingerprint: record.source_query_fingerprint,
                rendered_rows: record.rendered_rows,
            });
        }
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Field, SemanticType, Value};

    fn spec(y: f64) -> ChartSpec {
        let rows = Dataset::new(
            vec![
                Field::new("segment", SemanticType::Categorical),
                Field::new("revenue", SemanticType::Numeric),
            ],
            vec![vec![Value::from("SMB"), Value::from(y)]],
        )
        .unwrap();
        ChartSpec {
            x_column: "segment".into(),
            y_column: "revenue".into(),
            kind: ChartKind::Bar,
            title: Some("Revenue".into()),
            source_query_fingerprint: "abc".into(),
            rendered_rows: rows,
        }
    }

    #[test]
    fn test_ids_increase() {
        let mut store = ChartSpecStore::new();
        assert_eq!(store.append(spec(1.0)), ChartId(0));
        assert_eq!(store.append(spec(2.0)), ChartId(1));
        let ids: Vec<ChartId> = store.history().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![ChartId(0), ChartId(1)]);
    }

    #[test]
    fn test_get_missing() {
        let store = ChartSpecStore::new();
        let err = store.get(ChartId(3)).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(ChartId(3))));
        assert_eq!(err.kind(), crate::error::ErrorKind::NotFound);
    }

    #[test]
    fn test_json_roundtrip_keeps_rows() {
        let mut store = ChartSpecStore::new();
        store.append(spec(42000.5));
        let restored = ChartSpecStore::from_json(&store.to_json().unwrap()).unwrap();
        assert_eq!(restored.get(ChartId(0)).unwrap(), store.get(ChartId(0)).unwrap());
    }

    #[test]
    fn test_from_json_rejects_gaps() {
        let mut store = ChartSpecStore::new();
        store.append(spec(1.0));
        let json = store.to_json().unwrap().replacen("\"id\": 0", "\"id\": 4", 1);
        assert!(matches!(
            ChartSpecStore::from_json(&json),
            Err(StoreError::Corrupt(_))
        ));
    }
}
