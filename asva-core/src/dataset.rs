//! Column-wise datasets and the group views derived from them

use crate::{AsvaError, AsvaResult, Cell};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for building and loading datasets
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DatasetError {
    #[error("Invalid dataset JSON: {0}")]
    Json(String),

    #[error("Dataset must be an array of flat records")]
    NotRecords,

    #[error("Column '{0}' appears twice")]
    DuplicateColumn(String),

    #[error("Column '{column}' has {got} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        got: usize,
    },

    #[error("Column '{column}' holds an unsupported {kind} value")]
    UnsupportedValue { column: String, kind: &'static str },
}

impl From<serde_json::Error> for DatasetError {
    fn from(err: serde_json::Error) -> Self {
        DatasetError::Json(err.to_string())
    }
}

/// A named column of cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

/// Immutable table of observations, stored column-wise
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    source: Option<PathBuf>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: append a column. All columns must have the same length.
    pub fn with_column<I, C>(mut self, name: impl Into<String>, cells: I) -> Result<Self, DatasetError>
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        let name = name.into();
        if self.columns.iter().any(|c| c.name == name) {
            return Err(DatasetError::DuplicateColumn(name));
        }
        let cells: Vec<Cell> = cells.into_iter().map(Into::into).collect();
        if let Some(first) = self.columns.first() {
            if first.cells.len() != cells.len() {
                return Err(DatasetError::LengthMismatch {
                    column: name,
                    expected: first.cells.len(),
                    got: cells.len(),
                });
            }
        }
        self.columns.push(Column { name, cells });
        Ok(self)
    }

    /// Builder: remember where the dataset was loaded from
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    /// Build a dataset from JSON records.
    ///
    /// Column order is the first-seen key order; a record missing a key
    /// contributes a null cell.
    pub fn from_records(records: &[serde_json::Value]) -> Result<Self, DatasetError> {
        let mut names: Vec<String> = Vec::new();
        for record in records {
            let obj = record.as_object().ok_or(DatasetError::NotRecords)?;
            for key in obj.keys() {
                if !names.iter().any(|n| n == key) {
                    names.push(key.clone());
                }
            }
        }

        let mut dataset = Dataset::new();
        for name in names {
            let mut cells = Vec::with_capacity(records.len());
            for record in records {
                let value = record.get(&name).unwrap_or(&serde_json::Value::Null);
                cells.push(json_cell(&name, value)?);
            }
            dataset = dataset.with_column(name, cells)?;
        }
        Ok(dataset)
    }

    /// Parse a JSON array of flat records
    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        match value {
            serde_json::Value::Array(records) => Self::from_records(&records),
            _ => Err(DatasetError::NotRecords),
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.cells.len()).unwrap_or(0)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> AsvaResult<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| AsvaError::unknown_column(name))
    }

    /// Minimum and maximum of a measurement column over every row,
    /// ignoring missing values. Both are NaN when nothing is observed.
    pub fn column_extent(&self, name: &str) -> AsvaResult<(f64, f64)> {
        let column = self.column(name)?;
        let mut extent = (f64::NAN, f64::NAN);
        for cell in &column.cells {
            let x = cell.measurement().map_err(|e| e.in_column(name))?;
            if !x.is_nan() {
                extent = (extent.0.min(x), extent.1.max(x));
            }
        }
        Ok(extent)
    }

    /// True when every non-null cell of the column is text
    pub fn is_categorical(&self, name: &str) -> AsvaResult<bool> {
        let column = self.column(name)?;
        Ok(column.cells.iter().all(|c| c.is_null() || c.is_text()))
    }

    /// Sorted distinct labels of the grouping column
    pub fn group_set(&self, group_column: &str) -> AsvaResult<GroupSet> {
        let column = self.column(group_column)?;
        Ok(GroupSet::new(column.cells.iter().filter_map(Cell::label)))
    }

    /// Each group's sample of the measurement column, in group order.
    ///
    /// Null measurements are kept as NaN; rows with a null group are skipped.
    pub fn group_samples(&self, group_column: &str, measurement_column: &str) -> AsvaResult<GroupSamples> {
        let groups = self.group_set(group_column)?;
        let labels = &self.column(group_column)?.cells;
        let values = &self.column(measurement_column)?.cells;

        let mut samples = vec![Vec::new(); groups.len()];
        for (label, cell) in labels.iter().zip(values) {
            let Some(label) = label.label() else { continue };
            let value = cell.measurement().map_err(|e| e.in_column(measurement_column))?;
            if let Some(idx) = groups.index_of(&label) {
                samples[idx].push(value);
            }
        }
        Ok(GroupSamples { groups, samples })
    }
}

fn json_cell(column: &str, value: &serde_json::Value) -> Result<Cell, DatasetError> {
    use serde_json::Value as J;
    match value {
        J::Null => Ok(Cell::Null),
        J::Bool(b) => Ok(Cell::Bool(*b)),
        J::Number(n) => n.as_f64().map(Cell::Number).ok_or(DatasetError::UnsupportedValue {
            column: column.to_string(),
            kind: "number",
        }),
        J::String(s) => Ok(Cell::Text(s.clone())),
        J::Array(_) => Err(DatasetError::UnsupportedValue {
            column: column.to_string(),
            kind: "array",
        }),
        J::Object(_) => Err(DatasetError::UnsupportedValue {
            column: column.to_string(),
            kind: "object",
        }),
    }
}

/// Sorted, deduplicated group labels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupSet {
    labels: Vec<String>,
}

impl GroupSet {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        labels.sort();
        labels.dedup();
        Self { labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.binary_search_by(|l| l.as_str().cmp(label)).ok()
    }

    /// Index pairs (0,1),(0,2),…,(1,2),… of all unordered pairs
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        let n = self.labels.len();
        let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                pairs.push((i, j));
            }
        }
        pairs
    }
}

/// Per-group samples of one measurement column, aligned with a `GroupSet`
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSamples {
    groups: GroupSet,
    samples: Vec<Vec<f64>>,
}

impl GroupSamples {
    /// Build from labels and samples; labels are sorted along with their samples
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (S, Vec<f64>)>) -> Self {
        let mut pairs: Vec<(String, Vec<f64>)> =
            pairs.into_iter().map(|(l, s)| (l.into(), s)).collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs.dedup_by(|later, earlier| {
            if later.0 == earlier.0 {
                earlier.1.append(&mut later.1);
                true
            } else {
                false
            }
        });
        let groups = GroupSet::new(pairs.iter().map(|(l, _)| l.clone()));
        let samples = pairs.into_iter().map(|(_, s)| s).collect();
        Self { groups, samples }
    }

    pub fn groups(&self) -> &GroupSet {
        &self.groups
    }

    pub fn samples(&self) -> &[Vec<f64>] {
        &self.samples
    }

    pub fn sample_for(&self, label: &str) -> Option<&[f64]> {
        self.groups.index_of(label).map(|i| self.samples[i].as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.groups
            .labels()
            .iter()
            .map(String::as_str)
            .zip(self.samples.iter().map(Vec::as_slice))
    }

    /// All observations across groups
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().flatten().copied()
    }

    /// Copy with NaN observations removed from every group
    pub fn without_nan(&self) -> Self {
        Self {
            groups: self.groups.clone(),
            samples: self
                .samples
                .iter()
                .map(|s| s.iter().copied().filter(|x| !x.is_nan()).collect())
                .collect(),
        }
    }
}
