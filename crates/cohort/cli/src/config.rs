//! Configuration for the cohort CLI

use std::path::PathBuf;

use cohort_engine::EducationPalette;
use cohort_loader::SnapshotSources;
use serde::{Deserialize, Serialize};

/// Main CLI configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortConfig {
    /// Data file locations
    #[serde(default)]
    pub data: DataConfig,

    /// Education level -> bar color
    #[serde(default = "default_palette")]
    pub palette: Vec<PaletteEntry>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for CohortConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            palette: default_palette(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Data file locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataConfig {
    /// `;`-separated survey population
    #[serde(default = "default_population_path")]
    pub population_path: PathBuf,

    /// Cluster names and descriptions
    #[serde(default = "default_metadata_path")]
    pub metadata_path: PathBuf,

    /// Centroid model artifact
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            population_path: default_population_path(),
            metadata_path: default_metadata_path(),
            model_path: default_model_path(),
        }
    }
}

impl DataConfig {
    pub fn sources(&self) -> SnapshotSources {
        SnapshotSources {
            population_path: self.population_path.clone(),
            metadata_path: self.metadata_path.clone(),
            model_path: self.model_path.clone(),
        }
    }
}

/// One palette color.
///
/// Kept as a list rather than a table because configuration keys are
/// case-folded and education levels are not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub education: String,
    pub color: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_population_path() -> PathBuf {
    PathBuf::from("data/welcome_survey.csv")
}

fn default_metadata_path() -> PathBuf {
    PathBuf::from("data/cluster_names_and_descriptions.json")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("data/clustering_model.json")
}

fn default_palette() -> Vec<PaletteEntry> {
    EducationPalette::default()
        .iter()
        .map(|(education, color)| PaletteEntry {
            education: education.to_string(),
            color: color.to_string(),
        })
        .collect()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl CohortConfig {
    /// Load configuration: built-in defaults, then the optional file, then
    /// `COHORT_` environment variables (`COHORT_DATA__MODEL_PATH=...`).
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("COHORT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    pub fn education_palette(&self) -> EducationPalette {
        EducationPalette::from_pairs(
            self.palette
                .iter()
                .map(|entry| (entry.education.clone(), entry.color.clone())),
        )
    }
}
