//! Read-only population snapshot partitioned by cluster.

use std::collections::BTreeMap;

use cohort_types::{AttributeSchema, ClusterId, CohortError, CohortResult, Record};
use serde::Serialize;
use tracing::info;

use crate::model::ClusterModel;

/// A population member together with the cluster it was assigned to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PopulationRecord {
    pub record: Record,
    pub cluster_id: ClusterId,
}

/// The whole population, grouped by cluster id.
///
/// Built once per population snapshot and never mutated; refreshing data
/// means building a new index. Within a group, records keep the order in
/// which the source supplied them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PopulationIndex {
    groups: BTreeMap<ClusterId, Vec<PopulationRecord>>,
    len: usize,
}

impl PopulationIndex {
    /// Validate every raw record, assign it with `model`, and group.
    ///
    /// Rows are numbered from 0 in error reports.
    pub fn build(
        records: Vec<Record>,
        model: &dyn ClusterModel,
        schema: &AttributeSchema,
    ) -> CohortResult<Self> {
        validate_rows(records.iter(), schema)?;

        let cluster_ids = model.assign_all(&records)?;
        if cluster_ids.len() != records.len() {
            return Err(CohortError::Model {
                message: format!(
                    "model returned {} assignments for {} records",
                    cluster_ids.len(),
                    records.len()
                ),
            });
        }

        let index = Self::partition(records.into_iter().zip(cluster_ids));
        info!(
            records = index.len,
            clusters = index.groups.len(),
            model_version = model.version(),
            "Population index built from model assignments"
        );
        Ok(index)
    }

    /// Group records whose cluster ids were computed upstream.
    pub fn from_labeled<I>(labeled: I, schema: &AttributeSchema) -> CohortResult<Self>
    where
        I: IntoIterator<Item = (Record, ClusterId)>,
    {
        let labeled: Vec<(Record, ClusterId)> = labeled.into_iter().collect();
        validate_rows(labeled.iter().map(|(record, _)| record), schema)?;

        let index = Self::partition(labeled);
        info!(
            records = index.len,
            clusters = index.groups.len(),
            "Population index built from labeled records"
        );
        Ok(index)
    }

    fn partition<I>(labeled: I) -> Self
    where
        I: IntoIterator<Item = (Record, ClusterId)>,
    {
        let mut groups: BTreeMap<ClusterId, Vec<PopulationRecord>> = BTreeMap::new();
        let mut len = 0;
        for (record, cluster_id) in labeled {
            groups
                .entry(cluster_id.clone())
                .or_default()
                .push(PopulationRecord { record, cluster_id });
            len += 1;
        }
        Self { groups, len }
    }

    /// Members of one cluster. Unknown ids yield an empty slice.
    pub fn group(&self, cluster_id: &ClusterId) -> &[PopulationRecord] {
        self.groups
            .get(cluster_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The bare records of one cluster, in source order.
    pub fn records<'a>(&'a self, cluster_id: &ClusterId) -> impl Iterator<Item = &'a Record> + 'a {
        self.group(cluster_id).iter().map(|member| &member.record)
    }

    /// Every cluster id observed in the population, ascending.
    pub fn cluster_ids(&self) -> impl Iterator<Item = &ClusterId> {
        self.groups.keys()
    }

    pub fn contains(&self, cluster_id: &ClusterId) -> bool {
        self.groups.contains_key(cluster_id)
    }

    pub fn size(&self, cluster_id: &ClusterId) -> usize {
        self.group(cluster_id).len()
    }

    /// Number of clusters with at least one member.
    pub fn cluster_count(&self) -> usize {
        self.groups.len()
    }

    /// Total population size.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

fn validate_rows<'a, I>(records: I, schema: &AttributeSchema) -> CohortResult<()>
where
    I: IntoIterator<Item = &'a Record>,
{
    for (row, record) in records.into_iter().enumerate() {
        schema
            .validate(record)
            .map_err(|reason| CohortError::InvalidPopulationRecord {
                row,
                reason: Box::new(reason),
            })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_types::Attribute;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Clusters by education level only.
    struct EducationModel {
        calls: AtomicUsize,
    }

    impl ClusterModel for EducationModel {
        fn assign(&self, record: &Record) -> CohortResult<ClusterId> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let id = match record.get(Attribute::EduLevel) {
                Some("Podstawowe") => 0u32,
                Some("Średnie") => 1,
                _ => 2,
            };
            Ok(ClusterId::from(id))
        }
    }

    fn population() -> Vec<Record> {
        vec![
            Record::new("25-34", "Wyższe", "Psy", "W górach", "Mężczyzna"),
            Record::new("18-24", "Średnie", "Koty", "Nad wodą", "Kobieta"),
            Record::new("35-44", "Wyższe", "Koty", "W lesie", "Kobieta"),
            Record::new("<18", "Podstawowe", "Inne", "Inne", "Mężczyzna"),
        ]
    }

    #[test]
    fn build_groups_by_model_assignment() {
        let model = EducationModel {
            calls: AtomicUsize::new(0),
        };
        let index = PopulationIndex::build(population(), &model, &AttributeSchema::survey()).unwrap();

        assert_eq!(index.len(), 4);
        assert_eq!(index.cluster_count(), 3);
        assert_eq!(index.size(&ClusterId::from(2u32)), 2);
        assert_eq!(model.calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn groups_keep_source_order() {
        let model = EducationModel {
            calls: AtomicUsize::new(0),
        };
        let index = PopulationIndex::build(population(), &model, &AttributeSchema::survey()).unwrap();
        let ages: Vec<_> = index
            .records(&ClusterId::from(2u32))
            .map(|r| r.get(Attribute::Age).unwrap())
            .collect();
        assert_eq!(ages, vec!["25-34", "35-44"]);
    }

    #[test]
    fn cluster_ids_are_ascending() {
        let labeled = vec![
            (population()[0].clone(), ClusterId::from("Cluster 10")),
            (population()[1].clone(), ClusterId::from("Cluster 2")),
            (population()[2].clone(), ClusterId::from("Cluster 0")),
        ];
        let index = PopulationIndex::from_labeled(labeled, &AttributeSchema::survey()).unwrap();
        let ids: Vec<_> = index.cluster_ids().map(ClusterId::as_str).collect();
        assert_eq!(ids, vec!["Cluster 0", "Cluster 2", "Cluster 10"]);
    }

    #[test]
    fn absent_cluster_yields_empty_group() {
        let index =
            PopulationIndex::from_labeled(Vec::new(), &AttributeSchema::survey()).unwrap();
        assert!(index.group(&ClusterId::from(9u32)).is_empty());
        assert_eq!(index.size(&ClusterId::from(9u32)), 0);
        assert!(index.is_empty());
    }

    #[test]
    fn invalid_row_aborts_build_before_model_runs() {
        let model = EducationModel {
            calls: AtomicUsize::new(0),
        };
        let mut records = population();
        records[2] = records[2].with(Attribute::FavPlace, "Na Marsie");

        let err = PopulationIndex::build(records, &model, &AttributeSchema::survey()).unwrap_err();
        match err {
            CohortError::InvalidPopulationRecord { row, reason } => {
                assert_eq!(row, 2);
                assert!(matches!(*reason, CohortError::InvalidValue { .. }));
            }
            other => panic!("expected InvalidPopulationRecord, got {other:?}"),
        }
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn mismatched_assignment_count_is_a_model_error() {
        struct ShortModel;
        impl ClusterModel for ShortModel {
            fn assign(&self, _record: &Record) -> CohortResult<ClusterId> {
                Ok(ClusterId::from(0u32))
            }
            fn assign_all(&self, _records: &[Record]) -> CohortResult<Vec<ClusterId>> {
                Ok(vec![ClusterId::from(0u32)])
            }
        }

        let err = PopulationIndex::build(population(), &ShortModel, &AttributeSchema::survey())
            .unwrap_err();
        assert!(matches!(err, CohortError::Model { .. }));
    }
}
