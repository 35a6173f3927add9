//! Clustering model contract and the prototype-based implementation.

use std::collections::BTreeMap;

use cohort_types::{Attribute, AttributeSchema, ClusterId, CohortError, CohortResult, Record};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A trained clustering model, treated as a black box.
///
/// Implementations must be deterministic for a fixed model version: the
/// same record always maps to the same cluster id.
pub trait ClusterModel: Send + Sync {
    /// Assign one record to a cluster.
    ///
    /// Fails with an invalid-record error when `record` does not conform to
    /// the model's schema.
    fn assign(&self, record: &Record) -> CohortResult<ClusterId>;

    /// Assign many records. The output is index-aligned with the input.
    fn assign_all(&self, records: &[Record]) -> CohortResult<Vec<ClusterId>> {
        records.iter().map(|record| self.assign(record)).collect()
    }

    /// Version tag of the loaded model.
    fn version(&self) -> &str {
        "unversioned"
    }
}

/// On-disk form of a [`CentroidModel`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CentroidArtifact {
    pub version: String,
    /// One categorical prototype per cluster.
    pub centroids: BTreeMap<ClusterId, Record>,
}

/// Categorical nearest-prototype model (k-modes style).
///
/// Each cluster is represented by one prototype record. A record is assigned
/// to the cluster whose prototype differs from it in the fewest attributes.
/// Equal distances resolve to the smallest cluster id.
#[derive(Clone, Debug)]
pub struct CentroidModel {
    version: String,
    schema: AttributeSchema,
    centroids: BTreeMap<ClusterId, Record>,
}

impl CentroidModel {
    pub fn new(
        version: impl Into<String>,
        centroids: BTreeMap<ClusterId, Record>,
        schema: AttributeSchema,
    ) -> CohortResult<Self> {
        if centroids.is_empty() {
            return Err(CohortError::EmptyModel);
        }
        for (cluster_id, prototype) in &centroids {
            schema.validate(prototype).map_err(|e| CohortError::Model {
                message: format!("prototype for cluster {cluster_id} is invalid: {e}"),
            })?;
        }
        Ok(Self {
            version: version.into(),
            schema,
            centroids,
        })
    }

    pub fn from_artifact(artifact: CentroidArtifact, schema: AttributeSchema) -> CohortResult<Self> {
        Self::new(artifact.version, artifact.centroids, schema)
    }

    pub fn cluster_ids(&self) -> impl Iterator<Item = &ClusterId> {
        self.centroids.keys()
    }

    pub fn prototype(&self, cluster_id: &ClusterId) -> Option<&Record> {
        self.centroids.get(cluster_id)
    }

    /// Number of attributes on which the two records disagree.
    fn distance(a: &Record, b: &Record) -> usize {
        Attribute::ALL
            .iter()
            .filter(|attribute| a.get(**attribute) != b.get(**attribute))
            .count()
    }
}

impl ClusterModel for CentroidModel {
    fn assign(&self, record: &Record) -> CohortResult<ClusterId> {
        self.schema.validate(record)?;

        let mut best: Option<(&ClusterId, usize)> = None;
        for (cluster_id, prototype) in &self.centroids {
            let distance = Self::distance(record, prototype);
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((cluster_id, distance)),
            }
        }

        let (cluster_id, distance) = best.ok_or(CohortError::EmptyModel)?;
        debug!(cluster_id = %cluster_id, distance, "Record assigned to nearest prototype");
        Ok(cluster_id.clone())
    }

    fn version(&self) -> &str {
        &self.version
    }
}
