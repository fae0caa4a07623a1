//! Dataset loading from JSON record files

use asva_core::{AsvaError, Dataset, DatasetError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Dataset {
        path: PathBuf,
        #[source]
        source: DatasetError,
    },
}

impl From<LoadError> for AsvaError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::Io { .. } => AsvaError::io_error(err.to_string()),
            LoadError::Dataset { ref source, .. } => {
                AsvaError::from(source.clone()).with_note(err.to_string())
            }
        }
    }
}

/// Read a JSON array of flat records; the dataset remembers its path
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset, LoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = Dataset::from_json_str(&text).map_err(|source| LoadError::Dataset {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), rows = dataset.row_count(), columns = dataset.columns().len(), "dataset loaded");
    Ok(dataset.with_source(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use asva_core::codes;

    fn temp_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_remembers_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_file(&dir, "ok.json", r#"[{"ID": 1, "g": "a", "v": 1.5}]"#);
        let ds = load_dataset(&path).unwrap();
        assert_eq!(ds.source(), Some(path.as_path()));
        assert_eq!(ds.column_names(), vec!["ID", "g", "v"]);
    }

    #[test]
    fn test_missing_file() {
        let err = load_dataset("/nonexistent/asva/data.json").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert_eq!(AsvaError::from(err).code, codes::IO_ERROR);
    }

    #[test]
    fn test_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_file(&dir, "bad.json", "{not json");
        let err = load_dataset(&path).unwrap_err();
        assert!(matches!(err, LoadError::Dataset { source: DatasetError::Json(_), .. }));
        assert_eq!(AsvaError::from(err).code, codes::DATASET_ERROR);
    }
}
