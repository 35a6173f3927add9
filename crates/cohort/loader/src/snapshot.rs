//! Assemble an engine snapshot from files on disk.

use std::path::PathBuf;
use std::sync::Arc;

use cohort_engine::{ClusterModel, Snapshot, SnapshotLoader};
use cohort_types::{AttributeSchema, CohortError};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::artifacts::{load_metadata, load_model};
use crate::error::LoadResult;
use crate::population::load_population;

/// Locations of the three files that make up a population snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSources {
    /// `;`-separated survey CSV
    pub population_path: PathBuf,
    /// Cluster names and descriptions (JSON)
    pub metadata_path: PathBuf,
    /// Centroid model artifact (JSON)
    pub model_path: PathBuf,
}

impl SnapshotSources {
    /// Read every file and build the population index.
    ///
    /// A labeled population keeps its precomputed ids; otherwise the loaded
    /// model assigns every row.
    pub fn load(&self, schema: &AttributeSchema) -> LoadResult<Snapshot> {
        let model: Arc<dyn ClusterModel> = Arc::new(load_model(&self.model_path, schema)?);
        let metadata = load_metadata(&self.metadata_path)?;
        let population = load_population(&self.population_path, schema)?;
        let index = population.into_index(model.as_ref(), schema)?;

        let unnamed = index
            .cluster_ids()
            .filter(|cluster_id| !metadata.contains(cluster_id))
            .count();
        info!(
            population = index.len(),
            clusters = index.cluster_count(),
            unnamed_clusters = unnamed,
            model_version = model.version(),
            "Snapshot assembled"
        );
        Ok(Snapshot::new(model, index, metadata))
    }

    /// Loader for a lazily initialized store.
    pub fn into_loader(self, schema: AttributeSchema) -> SnapshotLoader {
        Box::new(move || self.load(&schema).map_err(CohortError::from))
    }
}
