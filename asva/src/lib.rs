//! ASVA - Automated Statistical and Visual Analysis
//!
//! Picks a hypothesis-test family for each measurement column of a dataset,
//! runs it, and draws a box plot annotated with the pairwise p-values.
//!
//! # Example
//!
//! ```no_run
//! use asva::{load_dataset, Asva};
//!
//! let dataset = load_dataset("measurements.json").unwrap();
//! let batch = Asva::new().analyze_all(&dataset, "group").unwrap();
//! print!("{}", batch.render_text());
//! ```

mod config;
mod loader;
mod report;

pub use config::{AnalysisConfig, PLOT_DIR_ENV};
pub use loader::{load_dataset, LoadError};
pub use report::{BatchReport, ColumnReport};

pub use asva_core::{codes, AsvaError, AsvaResult, Dataset};
pub use asva_plot::{AnnotationPlanner, ChartRenderer, SvgRenderer};
pub use asva_select::{TestResult, TestSelector};

use asva_plot::{plot_dir, write_chart, PlotLayout};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Main ASVA entry point
#[derive(Clone)]
pub struct Asva {
    selector: TestSelector,
    planner: AnnotationPlanner,
    renderer: Arc<dyn ChartRenderer>,
    config: AnalysisConfig,
}

impl Asva {
    /// Standard tests, SVG charts and default configuration
    pub fn new() -> Self {
        Self {
            selector: TestSelector::new(),
            planner: AnnotationPlanner::new(),
            renderer: Arc::new(SvgRenderer::new()),
            config: AnalysisConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_selector(mut self, selector: TestSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_renderer<R: ChartRenderer + 'static>(mut self, renderer: R) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Select and run the test family for one measurement column
    pub fn analyze_column(&self, dataset: &Dataset, group_column: &str, column: &str) -> AsvaResult<TestResult> {
        self.selector.determine_test(dataset, group_column, column)
    }

    /// Draw the annotated box plot of an analyzed column and write it to
    /// the plot directory next to the dataset
    pub fn plot_column(&self, dataset: &Dataset, result: &TestResult) -> AsvaResult<PathBuf> {
        let annotations = self
            .planner
            .plan(&result.groups, &result.pairwise, result.omnibus_p)
            .map_err(|e| e.in_column(&result.column))?;
        let layout = PlotLayout::for_dataset(dataset, &result.group_column, &result.column, &annotations)?;
        let chart = self.renderer.render(&layout)?;
        let dir = plot_dir(dataset.source(), &self.config.plot_dir);
        write_chart(&dir, &result.column, &chart)
    }

    /// Analyze every column except the group and index columns
    pub fn analyze_all(&self, dataset: &Dataset, group_column: &str) -> AsvaResult<BatchReport> {
        let index = self.config.index_column.as_deref();
        let columns: Vec<&str> = dataset
            .column_names()
            .into_iter()
            .filter(|&name| name != group_column && Some(name) != index)
            .collect();
        self.analyze_columns(dataset, group_column, &columns)
    }

    /// Analyze the named columns in order.
    ///
    /// The group column must be categorical; otherwise nothing is analyzed.
    /// Per-column failures are recorded in the report.
    pub fn analyze_columns(&self, dataset: &Dataset, group_column: &str, columns: &[&str]) -> AsvaResult<BatchReport> {
        if !dataset.is_categorical(group_column)? {
            return Err(AsvaError::type_error("categorical group column", "non-text values")
                .in_column(group_column)
                .with_suggestion("Group labels must be text"));
        }

        let mut batch = BatchReport::new(dataset.source().map(PathBuf::from), group_column);
        for &column in columns {
            let report = self.column_report(dataset, group_column, column);
            for err in report.errors() {
                warn!(column, code = %err.code, "{}", err.message);
            }
            batch.push(report);
        }
        info!(
            group_column,
            analyzed = batch.len(),
            failed = batch.failed(),
            "batch finished"
        );
        Ok(batch)
    }

    fn column_report(&self, dataset: &Dataset, group_column: &str, column: &str) -> ColumnReport {
        let result = self.analyze_column(dataset, group_column, column);
        let plot = match &result {
            Ok(r) if self.config.plots => Some(self.plot_column(dataset, r)),
            _ => None,
        };
        ColumnReport {
            column: column.to_string(),
            result,
            plot,
        }
    }
}

impl Default for Asva {
    fn default() -> Self {
        Self::new()
    }
}
