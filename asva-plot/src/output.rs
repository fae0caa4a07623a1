//! Output artifacts: one chart file per column in a plot directory next to
//! the dataset

use crate::render::Chart;
use asva_core::AsvaError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default name of the plot directory
pub const DEFAULT_PLOT_DIR: &str = "Plots";

/// Plot directory next to the dataset file (or under the working directory
/// when the dataset has no source path)
pub fn plot_dir(dataset_source: Option<&Path>, dir_name: &str) -> PathBuf {
    let parent = dataset_source
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    parent.join(dir_name)
}

/// File path for a column's chart; path separators in the column name
/// become underscores
pub fn plot_path(dir: &Path, column: &str, extension: &str) -> PathBuf {
    let stem: String = column
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    dir.join(format!("{}.{}", stem, extension))
}

/// Write a chart, creating the directory if absent
pub fn write_chart(dir: &Path, column: &str, chart: &Chart) -> Result<PathBuf, AsvaError> {
    fs::create_dir_all(dir)
        .map_err(|e| AsvaError::io_error(format!("{}: {}", dir.display(), e)).in_column(column))?;
    let path = plot_path(dir, column, chart.extension);
    fs::write(&path, &chart.bytes)
        .map_err(|e| AsvaError::io_error(format!("{}: {}", path.display(), e)).in_column(column))?;
    debug!(path = %path.display(), bytes = chart.bytes.len(), "chart written");
    Ok(path)
}
