//! Per-column and batch reports

use asva_core::AsvaError;
use asva_select::TestResult;
use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};

/// Outcome of analyzing one measurement column.
///
/// Test selection and plotting fail independently: a column whose plot
/// could not be drawn still carries its test result.
#[derive(Debug, Clone)]
pub struct ColumnReport {
    pub column: String,
    pub result: Result<TestResult, AsvaError>,
    /// `None` when plotting was disabled or the test failed
    pub plot: Option<Result<PathBuf, AsvaError>>,
}

impl ColumnReport {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok() && !matches!(self.plot, Some(Err(_)))
    }

    pub fn test_result(&self) -> Option<&TestResult> {
        self.result.as_ref().ok()
    }

    pub fn plot_path(&self) -> Option<&Path> {
        match &self.plot {
            Some(Ok(path)) => Some(path),
            _ => None,
        }
    }

    /// Every error recorded for this column
    pub fn errors(&self) -> Vec<&AsvaError> {
        let mut errors = Vec::new();
        if let Err(e) = &self.result {
            errors.push(e);
        }
        if let Some(Err(e)) = &self.plot {
            errors.push(e);
        }
        errors
    }
}

#[derive(Serialize)]
struct ColumnReportRepr<'a> {
    column: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a TestResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a AsvaError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plot: Option<&'a Path>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plot_error: Option<&'a AsvaError>,
}

impl Serialize for ColumnReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ColumnReportRepr {
            column: &self.column,
            result: self.result.as_ref().ok(),
            error: self.result.as_ref().err(),
            plot: self.plot_path(),
            plot_error: match &self.plot {
                Some(Err(e)) => Some(e),
                _ => None,
            },
        }
        .serialize(serializer)
    }
}

/// All column reports of one batch, in column order
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<PathBuf>,
    pub group_column: String,
    pub columns: Vec<ColumnReport>,
}

impl BatchReport {
    pub fn new(dataset: Option<PathBuf>, group_column: impl Into<String>) -> Self {
        Self {
            dataset,
            group_column: group_column.into(),
            columns: Vec::new(),
        }
    }

    pub fn push(&mut self, report: ColumnReport) {
        self.columns.push(report);
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnReport> {
        self.columns.iter().find(|c| c.column == name)
    }

    /// Columns with a test result and no plot failure
    pub fn succeeded(&self) -> usize {
        self.columns.iter().filter(|c| c.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    /// Human-readable report, one block per column
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for report in &self.columns {
            out.push_str(&format!("== {} ==\n", report.column));
            match &report.result {
                Ok(result) => {
                    out.push_str(&format!("{}\n", result.narrative));
                    for record in result.pairwise.iter() {
                        out.push_str(&format!(
                            "  {} vs {}: statistic={:.3} p={:.3}\n",
                            record.group_a, record.group_b, record.statistic, record.pval
                        ));
                    }
                }
                Err(e) => out.push_str(&format!("  test failed: {}\n", e)),
            }
            match &report.plot {
                Some(Ok(path)) => out.push_str(&format!("  plot: {}\n", path.display())),
                Some(Err(e)) => out.push_str(&format!("  plot failed: {}\n", e)),
                None => {}
            }
        }
        out.push_str(&format!(
            "{} column(s) analyzed, {} with errors\n",
            self.len(),
            self.failed()
        ));
        out
    }
}
