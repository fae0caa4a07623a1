//! Analysis configuration

use asva_plot::DEFAULT_PLOT_DIR;
use serde::{Deserialize, Serialize};

/// Environment variable overriding the plot directory name
pub const PLOT_DIR_ENV: &str = "ASVA_PLOT_DIR";

/// Settings for a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Directory name for charts, created next to the dataset
    pub plot_dir: String,
    /// Whether charts are produced at all
    pub plots: bool,
    /// Row-index column, never analyzed
    pub index_column: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            plot_dir: DEFAULT_PLOT_DIR.to_string(),
            plots: true,
            index_column: Some("ID".to_string()),
        }
    }
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, with `ASVA_PLOT_DIR` applied when set and non-empty
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let config = Self::default();
        match lookup(PLOT_DIR_ENV) {
            Some(dir) if !dir.trim().is_empty() => config.with_plot_dir(dir.trim()),
            _ => config,
        }
    }

    pub fn with_plot_dir(mut self, dir: impl Into<String>) -> Self {
        self.plot_dir = dir.into();
        self
    }

    pub fn with_plots(mut self, plots: bool) -> Self {
        self.plots = plots;
        self
    }

    pub fn with_index_column(mut self, column: Option<String>) -> Self {
        self.index_column = column;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.plot_dir, "Plots");
        assert!(config.plots);
        assert_eq!(config.index_column.as_deref(), Some("ID"));
    }

    #[test]
    fn test_env_override() {
        let config = AnalysisConfig::from_lookup(|key| (key == PLOT_DIR_ENV).then(|| " figures ".to_string()));
        assert_eq!(config.plot_dir, "figures");
    }

    #[test]
    fn test_blank_env_ignored() {
        let config = AnalysisConfig::from_lookup(|_| Some("  ".to_string()));
        assert_eq!(config.plot_dir, "Plots");
    }

    #[test]
    fn test_builders() {
        let config = AnalysisConfig::new().with_plots(false).with_index_column(None);
        assert!(!config.plots);
        assert_eq!(config.index_column, None);
    }
}
