//! Respondent assignment and result bundling.

use std::collections::BTreeMap;

use cohort_types::{
    Attribute, AttributeSchema, ClusterId, ClusterMetadata, CohortError, CohortResult, Record,
    ResolvedMetadata,
};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::comparison::{ComparisonEngine, ComparisonRow, EducationPalette, Histogram, RadarProfile};
use crate::index::PopulationIndex;
use crate::model::ClusterModel;
use crate::profile::{ClusterProfile, ProfileAggregator};

/// Everything the presentation layer needs for one respondent.
///
/// All fields derive from the same population snapshot and the same
/// assigned cluster id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResultBundle {
    pub cluster_id: ClusterId,
    pub cluster_meta: ResolvedMetadata,
    pub own_profile: ClusterProfile,
    pub comparison_table: Vec<ComparisonRow>,
    pub radar_profile: RadarProfile,
    pub histograms: BTreeMap<Attribute, Histogram>,
    /// `false` when any fallback label or description was substituted.
    pub metadata_complete: bool,
    /// Recoverable problems: missing metadata and palette misses.
    pub issues: Vec<CohortError>,
}

impl ResultBundle {
    /// The comparison row of the respondent's own cluster, if it has members.
    pub fn own_row(&self) -> Option<&ComparisonRow> {
        self.comparison_table.iter().find(|row| row.is_assigned)
    }
}

/// Validates a respondent, assigns a cluster and computes every derived view.
#[derive(Clone, Debug, Default)]
pub struct AssignmentService {
    engine: ComparisonEngine,
}

impl AssignmentService {
    pub fn new(schema: AttributeSchema, palette: EducationPalette) -> Self {
        Self {
            engine: ComparisonEngine::new(schema, palette),
        }
    }

    pub fn from_engine(engine: ComparisonEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &ComparisonEngine {
        &self.engine
    }

    pub fn schema(&self) -> &AttributeSchema {
        self.engine.schema()
    }

    /// Assign `respondent` and profile its cluster against the population.
    ///
    /// Invalid respondents fail before the model is consulted. Missing
    /// metadata and palette misses are reported in `issues` instead of
    /// failing the request.
    #[instrument(skip_all, fields(model_version = model.version()))]
    pub fn assign_and_profile(
        &self,
        respondent: &Record,
        model: &dyn ClusterModel,
        index: &PopulationIndex,
        metadata: &ClusterMetadata,
    ) -> CohortResult<ResultBundle> {
        self.schema().validate(respondent)?;

        let cluster_id = model.assign(respondent)?;
        let cluster_meta = metadata.resolve(&cluster_id);
        if !index.contains(&cluster_id) {
            warn!(cluster_id = %cluster_id, "Assigned cluster has no population members");
        }

        let own_profile = ProfileAggregator::profile(index.records(&cluster_id));
        let radar_profile = RadarProfile::from_profile(&own_profile);
        let histograms = self.engine.histograms(&own_profile);
        let comparison_table = self
            .engine
            .comparison_table(index, metadata, Some(&cluster_id));

        let issues = collect_issues(&cluster_meta, &comparison_table);
        let metadata_complete =
            cluster_meta.complete && comparison_table.iter().all(|row| row.metadata_complete);

        info!(
            cluster_id = %cluster_id,
            group_size = own_profile.size,
            clusters = comparison_table.len(),
            issues = issues.len(),
            "Respondent assigned"
        );

        Ok(ResultBundle {
            cluster_id,
            cluster_meta,
            own_profile,
            comparison_table,
            radar_profile,
            histograms,
            metadata_complete,
            issues,
        })
    }
}

fn collect_issues(cluster_meta: &ResolvedMetadata, rows: &[ComparisonRow]) -> Vec<CohortError> {
    let mut issues = Vec::new();
    if !cluster_meta.complete {
        issues.push(CohortError::UnknownClusterMetadata {
            cluster_id: cluster_meta.cluster_id.clone(),
        });
    }

    for row in rows {
        if !row.metadata_complete && row.cluster_id != cluster_meta.cluster_id {
            issues.push(CohortError::UnknownClusterMetadata {
                cluster_id: row.cluster_id.clone(),
            });
        }
        if let Some(error) = &row.color_error {
            issues.push(error.clone());
        }
    }
    issues
}
