//! Error types for cohort-loader

use std::path::PathBuf;

use cohort_types::CohortError;
use thiserror::Error;

/// Failures while reading population, metadata or model files.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File could not be opened or read
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Malformed CSV
    #[error("CSV error in {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },

    /// Malformed JSON
    #[error("JSON error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Required header column absent
    #[error("{} has no `{column}` column", path.display())]
    MissingColumn { path: PathBuf, column: String },

    /// Labeled population row with a blank cluster cell
    #[error("{} line {line}: cluster label is empty", path.display())]
    MissingLabel { path: PathBuf, line: u64 },

    /// Population row that does not conform to the schema
    #[error("{} line {line}: {source}", path.display())]
    InvalidRow {
        path: PathBuf,
        line: u64,
        source: CohortError,
    },

    /// Engine rejected the loaded data
    #[error("Engine error: {0}")]
    Engine(#[from] CohortError),
}

impl LoadError {
    /// File the error originated from, when there is one.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            LoadError::Io { path, .. }
            | LoadError::Csv { path, .. }
            | LoadError::Json { path, .. }
            | LoadError::MissingColumn { path, .. }
            | LoadError::MissingLabel { path, .. }
            | LoadError::InvalidRow { path, .. } => Some(path),
            LoadError::Engine(_) => None,
        }
    }
}

impl From<LoadError> for CohortError {
    fn from(err: LoadError) -> Self {
        CohortError::SnapshotUnavailable {
            message: err.to_string(),
        }
    }
}

/// Result type for loader operations
pub type LoadResult<T> = Result<T, LoadError>;
