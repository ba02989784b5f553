//! In-memory table

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::DatasetError;
use super::types::SemanticType;
use super::value::Value;

/// A named, typed column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub semantic_type: SemanticType,
}

impl Field {
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            semantic_type,
        }
    }
}

/// One row, positionally aligned with the dataset's fields
pub type Row = Vec<Value>;

/// Tabular data with named, typed columns
///
/// A dataset is never modified in place. Filtering, grouping, sorting and
/// projection all return a new dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DatasetParts")]
pub struct Dataset {
    fields: Vec<Field>,
    rows: Vec<Row>,
}

#[derive(Deserialize)]
struct DatasetParts {
    fields: Vec<Field>,
    #[serde(default)]
    rows: Vec<Row>,
}

impl TryFrom<DatasetParts> for Dataset {
    type Error = DatasetError;

    fn try_from(parts: DatasetParts) -> Result<Self, Self::Error> {
        // JSON has no date type, so datetime cells may arrive as ISO strings
        let date_columns: Vec<usize> = parts
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.semantic_type == SemanticType::Datetime)
            .map(|(i, _)| i)
            .collect();

        let mut rows = parts.rows;
        for row in &mut rows {
            for &idx in &date_columns {
                if let Some(Value::Text(text)) = row.get(idx) {
                    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
                        row[idx] = Value::Date(date);
                    }
                }
            }
        }

        Dataset::new(parts.fields, rows)
    }
}

impl Dataset {
    /// Build a dataset, checking row widths and cell types
    ///
    /// NaN cells are stored as null.
    pub fn new(fields: Vec<Field>, mut rows: Vec<Row>) -> Result<Self, DatasetError> {
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(DatasetError::DuplicateField(field.name.clone()));
            }
        }

        for (row_idx, row) in rows.iter_mut().enumerate() {
            if row.len() != fields.len() {
                return Err(DatasetError::WidthMismatch {
                    row: row_idx,
                    expected: fields.len(),
                    found: row.len(),
                });
            }
            for (value, field) in row.iter_mut().zip(&fields) {
                if matches!(value, Value::Number(n) if n.is_nan()) {
                    *value = Value::Null;
                }
                if let Some(actual) = value.semantic_type() {
                    if actual != field.semantic_type {
                        return Err(DatasetError::CellType {
                            row: row_idx,
                            column: field.name.clone(),
                            expected: field.semantic_type,
                            found: actual,
                        });
                    }
                }
            }
        }

        Ok(Self { fields, rows })
    }

    /// A dataset with the given columns and no rows
    pub fn empty(fields: Vec<Field>) -> Self {
        Self {
            fields,
            rows: Vec::new(),
        }
    }

    /// Assemble a dataset whose rows are already known to fit the fields.
    pub(crate) fn from_parts(fields: Vec<Field>, rows: Vec<Row>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == fields.len()));
        Self { fields, rows }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Iterate over one column's values
    pub fn column(&self, index: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().map(move |row| &row[index])
    }

    /// Keep only the rows at `indices`, in the order given
    pub fn take_rows(&self, indices: &[usize]) -> Dataset {
        let rows = indices.iter().map(|&i| self.rows[i].clone()).collect();
        Dataset::from_parts(self.fields.clone(), rows)
    }

    /// Keep only the named columns, in the order given
    pub fn project<S: AsRef<str>>(&self, names: &[S]) -> Result<Dataset, DatasetError> {
        let indices = names
            .iter()
            .map(|name| {
                self.column_index(name.as_ref())
                    .ok_or_else(|| DatasetError::UnknownColumn(name.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let fields = indices.iter().map(|&i| self.fields[i].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Ok(Dataset::from_parts(fields, rows))
    }

    /// Stable sort on one column; nulls and NaN always sort last
    pub fn sorted_by(&self, index: usize, descending: bool) -> Dataset {
        let missing = |value: &Value| match value {
            Value::Number(n) => n.is_nan(),
            other => other.is_null(),
        };
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| {
            let (left, right) = (&a[index], &b[index]);
            match (missing(left), missing(right)) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => {
                    let ord = left.compare(right).unwrap_or(Ordering::Equal);
                    if descending {
                        ord.reverse()
                    } else {
                        ord
                    }
                }
            }
        });
        Dataset::from_parts(self.fields.clone(), rows)
    }

    /// First `n` rows
    pub fn truncated(&self, n: usize) -> Dataset {
        let rows = self.rows.iter().take(n).cloned().collect();
        Dataset::from_parts(self.fields.clone(), rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(
            vec![
                Field::new("segment", SemanticType::Categorical),
                Field::new("revenue", SemanticType::Numeric),
            ],
            vec![
                vec!["SMB".into(), 10.0.into()],
                vec!["Enterprise".into(), Value::Null],
                vec!["SMB".into(), 30.0.into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_width_mismatch() {
        let err = Dataset::new(
            vec![Field::new("a", SemanticType::Numeric)],
            vec![vec![1.0.into(), 2.0.into()]],
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::WidthMismatch { row: 0, expected: 1, found: 2 }));
    }

    #[test]
    fn test_cell_type_mismatch() {
        let err = Dataset::new(
            vec![Field::new("a", SemanticType::Numeric)],
            vec![vec!["oops".into()]],
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::CellType { .. }));
    }

    #[test]
    fn test_duplicate_field() {
        let err = Dataset::new(
            vec![
                Field::new("a", SemanticType::Numeric),
                Field::new("a", SemanticType::Numeric),
            ],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateField(name) if name == "a"));
    }

    #[test]
    fn test_sort_nulls_last_both_directions() {
        let ds = sample();
        let asc = ds.sorted_by(1, false);
        assert_eq!(asc.rows()[0][1], Value::Number(10.0));
        assert!(asc.rows()[2][1].is_null());

        let desc = ds.sorted_by(1, true);
        assert_eq!(desc.rows()[0][1], Value::Number(30.0));
        assert!(desc.rows()[2][1].is_null());
    }

    #[test]
    fn test_nan_sorts_last() {
        let values = [5.0, f64::NAN, 1.0, 9.0, f64::NAN, 3.0, 7.0, f64::NAN, 2.0, 8.0];
        let fields = vec![Field::new("score", SemanticType::Numeric)];
        let rows: Vec<Row> = values.iter().map(|&v| vec![Value::Number(v)]).collect();

        let stored = Dataset::new(fields.clone(), rows.clone()).unwrap();
        assert_eq!(stored.rows().iter().filter(|r| r[0].is_null()).count(), 3);

        // cells that bypass validation still sort as missing
        for ds in [stored, Dataset::from_parts(fields, rows)] {
            let desc = ds.sorted_by(0, true);
            let numbers: Vec<f64> = desc
                .column(0)
                .filter_map(|v| match v {
                    Value::Number(n) if !n.is_nan() => Some(*n),
                    _ => None,
                })
                .collect();
            assert_eq!(numbers, vec![9.0, 8.0, 7.0, 5.0, 3.0, 2.0, 1.0]);
            assert!(desc.rows()[..7]
                .iter()
                .all(|r| matches!(r[0], Value::Number(n) if !n.is_nan())));
        }
    }

    #[test]
    fn test_project_unknown() {
        let err = sample().project(&["profit"]).unwrap_err();
        assert!(matches!(err, DatasetError::UnknownColumn(name) if name == "profit"));
    }

    #[test]
    fn test_deserialize_coerces_dates() {
        let json = r#"{
            "fields": [{"name": "signup", "type": "datetime"}],
            "rows": [["2021-03-01"], [null]]
        }"#;
        let ds: Dataset = serde_json::from_str(json).unwrap();
        assert_eq!(
            ds.rows()[0][0],
            Value::Date(NaiveDate::from_ymd_opt(2021, 3, 1).unwrap())
        );
    }

    #[test]
    fn test_deserialize_rejects_bad_rows() {
        let json = r#"{"fields": [{"name": "a", "type": "numeric"}], "rows": [["x"]]}"#;
        assert!(serde_json::from_str::<Dataset>(json).is_err());
    }
}
