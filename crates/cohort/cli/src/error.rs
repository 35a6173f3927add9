//! CLI error types

use cohort_loader::LoadError;
use cohort_types::CohortError;
use thiserror::Error;

/// CLI error types
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Population, metadata or model file could not be loaded
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Assignment or profiling failed
    #[error("{0}")]
    Engine(#[from] CohortError),

    /// Output could not be serialized
    #[error("JSON error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
