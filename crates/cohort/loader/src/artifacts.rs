//! JSON readers for cluster metadata and the centroid model artifact.

use std::fs;
use std::path::Path;

use cohort_engine::{CentroidArtifact, CentroidModel, ClusterModel};
use cohort_types::{AttributeSchema, ClusterMetadata};
use serde::de::DeserializeOwned;
use tracing::info;

use crate::error::{LoadError, LoadResult};

fn read_json<T: DeserializeOwned>(path: &Path) -> LoadResult<T> {
    let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the cluster id -> `{name, description}` mapping.
pub fn load_metadata(path: impl AsRef<Path>) -> LoadResult<ClusterMetadata> {
    let path = path.as_ref();
    let metadata: ClusterMetadata = read_json(path)?;
    info!(path = %path.display(), clusters = metadata.len(), "Cluster metadata loaded");
    Ok(metadata)
}

/// Load a centroid model artifact and check its prototypes against `schema`.
pub fn load_model(path: impl AsRef<Path>, schema: &AttributeSchema) -> LoadResult<CentroidModel> {
    let path = path.as_ref();
    let artifact: CentroidArtifact = read_json(path)?;
    let clusters = artifact.centroids.len();
    let model = CentroidModel::from_artifact(artifact, schema.clone())?;
    info!(
        path = %path.display(),
        version = model.version(),
        clusters,
        "Clustering model loaded"
    );
    Ok(model)
}
