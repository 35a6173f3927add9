//! Process-wide population snapshot with lazy init and atomic replacement.

use std::sync::Arc;

use cohort_types::{ClusterMetadata, CohortError, CohortResult, Record};
use parking_lot::RwLock;
use tracing::info;

use crate::comparison::ComparisonRow;
use crate::index::PopulationIndex;
use crate::model::ClusterModel;
use crate::service::{AssignmentService, ResultBundle};

/// Model, population and metadata that belong together.
///
/// Immutable once built. A refresh builds a whole new snapshot.
pub struct Snapshot {
    model: Arc<dyn ClusterModel>,
    index: PopulationIndex,
    metadata: ClusterMetadata,
}

impl Snapshot {
    pub fn new(
        model: Arc<dyn ClusterModel>,
        index: PopulationIndex,
        metadata: ClusterMetadata,
    ) -> Self {
        Self {
            model,
            index,
            metadata,
        }
    }

    pub fn model(&self) -> &dyn ClusterModel {
        self.model.as_ref()
    }

    pub fn index(&self) -> &PopulationIndex {
        &self.index
    }

    pub fn metadata(&self) -> &ClusterMetadata {
        &self.metadata
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("model_version", &self.model.version())
            .field("population", &self.index.len())
            .field("clusters", &self.index.cluster_count())
            .field("metadata_entries", &self.metadata.len())
            .finish()
    }
}

/// Builds a snapshot on first use.
pub type SnapshotLoader = Box<dyn Fn() -> CohortResult<Snapshot> + Send + Sync>;

/// Holds the current snapshot for every request of a process.
///
/// The snapshot is loaded on first use and kept until explicitly replaced.
/// Each request clones the `Arc` once and computes against it, so a
/// concurrent [`replace`](Self::replace) never mixes two snapshots within
/// one result.
pub struct SnapshotStore {
    current: RwLock<Option<Arc<Snapshot>>>,
    loader: Option<SnapshotLoader>,
    service: AssignmentService,
}

impl SnapshotStore {
    /// Store that runs `loader` on first access.
    pub fn lazy(service: AssignmentService, loader: SnapshotLoader) -> Self {
        Self {
            current: RwLock::new(None),
            loader: Some(loader),
            service,
        }
    }

    /// Store that starts with an already built snapshot.
    pub fn with_snapshot(service: AssignmentService, snapshot: Snapshot) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(snapshot))),
            loader: None,
            service,
        }
    }

    pub fn service(&self) -> &AssignmentService {
        &self.service
    }

    pub fn is_initialized(&self) -> bool {
        self.current.read().is_some()
    }

    /// The current snapshot, loading it if this is the first access.
    ///
    /// A failed load leaves the store uninitialized; the next call retries.
    pub fn current(&self) -> CohortResult<Arc<Snapshot>> {
        if let Some(snapshot) = self.current.read().as_ref() {
            return Ok(Arc::clone(snapshot));
        }

        let mut slot = self.current.write();
        if let Some(snapshot) = slot.as_ref() {
            return Ok(Arc::clone(snapshot));
        }

        let loader = self
            .loader
            .as_ref()
            .ok_or_else(|| CohortError::SnapshotUnavailable {
                message: "no snapshot loaded and no loader configured".to_string(),
            })?;
        let snapshot = Arc::new(loader()?);
        info!(snapshot = ?snapshot, "Population snapshot loaded");
        *slot = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Swap in a fully built snapshot. Returns the previous one, if any.
    ///
    /// Requests already holding the previous snapshot finish on it.
    pub fn replace(&self, snapshot: Snapshot) -> Option<Arc<Snapshot>> {
        let snapshot = Arc::new(snapshot);
        info!(snapshot = ?snapshot, "Population snapshot replaced");
        self.current.write().replace(snapshot)
    }

    /// Assign and profile `respondent` against one consistent snapshot.
    pub fn evaluate(&self, respondent: &Record) -> CohortResult<ResultBundle> {
        let snapshot = self.current()?;
        self.service.assign_and_profile(
            respondent,
            snapshot.model(),
            snapshot.index(),
            snapshot.metadata(),
        )
    }

    /// Comparison table of the current snapshot without a respondent.
    pub fn comparison_table(&self) -> CohortResult<Vec<ComparisonRow>> {
        let snapshot = self.current()?;
        Ok(self
            .service
            .engine()
            .comparison_table(snapshot.index(), snapshot.metadata(), None))
    }
}
