//! Pairwise comparison table
//!
//! One record per unordered pair of groups. Lookups are order-insensitive.

use crate::AsvaError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One pairwise comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseRecord {
    pub group_a: String,
    pub group_b: String,
    /// Test statistic of the pairwise procedure
    pub statistic: f64,
    pub pval: f64,
}

impl PairwiseRecord {
    pub fn new(group_a: impl Into<String>, group_b: impl Into<String>, statistic: f64, pval: f64) -> Self {
        Self {
            group_a: group_a.into(),
            group_b: group_b.into(),
            statistic,
            pval,
        }
    }
}

fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Ordered pairwise records with an order-insensitive index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PairwiseRecord>", into = "Vec<PairwiseRecord>")]
pub struct PairwiseTable {
    records: Vec<PairwiseRecord>,
    index: HashMap<(String, String), usize>,
}

impl PairwiseTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record; a second record for the same pair is an internal error
    pub fn push(&mut self, record: PairwiseRecord) -> Result<(), AsvaError> {
        if record.group_a == record.group_b {
            return Err(AsvaError::internal(format!(
                "pairwise record compares '{}' with itself",
                record.group_a
            )));
        }
        let key = pair_key(&record.group_a, &record.group_b);
        if self.index.contains_key(&key) {
            return Err(AsvaError::internal(format!(
                "duplicate pairwise record for '{}' vs '{}'",
                record.group_a, record.group_b
            )));
        }
        self.index.insert(key, self.records.len());
        self.records.push(record);
        Ok(())
    }

    /// Record for the unordered pair, if present
    pub fn get(&self, a: &str, b: &str) -> Option<&PairwiseRecord> {
        self.index.get(&pair_key(a, b)).map(|&i| &self.records[i])
    }

    /// p-value for the unordered pair
    pub fn lookup(&self, a: &str, b: &str) -> Result<f64, AsvaError> {
        self.get(a, b)
            .map(|r| r.pval)
            .ok_or_else(|| AsvaError::missing_pairwise_entry(a, b))
    }

    pub fn records(&self) -> &[PairwiseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PairwiseRecord> {
        self.records.iter()
    }

    /// Apply a correction to every p-value
    pub fn map_pvals(mut self, f: impl Fn(f64) -> f64) -> Self {
        for record in &mut self.records {
            record.pval = f(record.pval);
        }
        self
    }
}

impl TryFrom<Vec<PairwiseRecord>> for PairwiseTable {
    type Error = AsvaError;

    /// Fails on a self-pair or a second record for the same pair
    fn try_from(records: Vec<PairwiseRecord>) -> Result<Self, Self::Error> {
        let mut table = PairwiseTable::new();
        for record in records {
            table.push(record)?;
        }
        Ok(table)
    }
}

impl From<PairwiseTable> for Vec<PairwiseRecord> {
    fn from(table: PairwiseTable) -> Self {
        table.records
    }
}
