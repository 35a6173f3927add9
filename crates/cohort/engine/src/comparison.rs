//! Cross-cluster comparison table, radar profile and histograms.

use std::collections::BTreeMap;

use cohort_types::{
    Attribute, AttributeSchema, ClusterId, ClusterMetadata, CohortError, CohortResult, Record,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::index::PopulationIndex;
use crate::profile::{ClusterProfile, ProfileAggregator};

/// Closed mapping from education level to the color used for a cluster bar.
///
/// A dominant education level without an entry is a configuration defect,
/// never silently defaulted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EducationPalette {
    colors: BTreeMap<String, String>,
}

impl Default for EducationPalette {
    fn default() -> Self {
        Self::from_pairs([
            ("Podstawowe", "#FF9999"),
            ("Średnie", "#99CCFF"),
            ("Wyższe", "#99FF99"),
        ])
    }
}

impl EducationPalette {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            colors: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn color_for(&self, education: &str) -> Option<&str> {
        self.colors.get(education).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.colors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// One cluster's line in the comparison table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ComparisonRow {
    pub cluster_id: ClusterId,
    /// Metadata name, or `Group <id>` when metadata is missing.
    pub label: String,
    pub size: usize,
    pub dominant_education: Option<String>,
    /// Palette color of the dominant education level.
    pub color_tag: Option<String>,
    /// Set when the dominant education level has no palette entry.
    pub color_error: Option<CohortError>,
    pub metadata_complete: bool,
    /// Marks the respondent's own cluster.
    pub is_assigned: bool,
}

impl ComparisonRow {
    /// The row's color, or the palette error that prevented it.
    pub fn color(&self) -> CohortResult<Option<&str>> {
        match &self.color_error {
            Some(error) => Err(error.clone()),
            None => Ok(self.color_tag.as_deref()),
        }
    }
}

/// Per-attribute peak frequency within a group.
///
/// Measures how concentrated each attribute is on its most common value,
/// independent of the other attributes' cardinalities.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RadarProfile {
    peaks: BTreeMap<Attribute, usize>,
}

impl RadarProfile {
    /// Peaks of an already computed profile; every attribute gets an entry.
    pub fn from_profile(profile: &ClusterProfile) -> Self {
        Self {
            peaks: Attribute::ALL
                .into_iter()
                .map(|attribute| (attribute, profile.peak(attribute)))
                .collect(),
        }
    }

    pub fn get(&self, attribute: Attribute) -> usize {
        self.peaks.get(&attribute).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, usize)> + '_ {
        self.peaks.iter().map(|(a, p)| (*a, *p))
    }

    /// Largest peak across attributes.
    pub fn max(&self) -> usize {
        self.peaks.values().copied().max().unwrap_or(0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HistogramBin {
    pub value: String,
    pub count: usize,
}

/// Counts over an attribute's whole codomain, in axis order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Histogram {
    pub attribute: Attribute,
    pub label: String,
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.bins.iter().map(|bin| bin.count).sum()
    }

    pub fn count(&self, value: &str) -> usize {
        self.bins
            .iter()
            .find(|bin| bin.value == value)
            .map_or(0, |bin| bin.count)
    }
}

/// Compares every cluster in a population and profiles a single group.
#[derive(Clone, Debug, Default)]
pub struct ComparisonEngine {
    schema: AttributeSchema,
    palette: EducationPalette,
}

impl ComparisonEngine {
    pub fn new(schema: AttributeSchema, palette: EducationPalette) -> Self {
        Self { schema, palette }
    }

    pub fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    pub fn palette(&self) -> &EducationPalette {
        &self.palette
    }

    /// One row per cluster present in `index`, ascending by cluster id.
    ///
    /// Missing metadata and palette misses degrade the affected row only.
    pub fn comparison_table(
        &self,
        index: &PopulationIndex,
        metadata: &ClusterMetadata,
        assigned: Option<&ClusterId>,
    ) -> Vec<ComparisonRow> {
        let rows: Vec<ComparisonRow> = index
            .cluster_ids()
            .map(|cluster_id| {
                let profile = ProfileAggregator::profile(index.records(cluster_id));
                self.row(cluster_id, &profile, metadata, assigned)
            })
            .collect();

        debug!(
            rows = rows.len(),
            population = index.len(),
            "Comparison table computed"
        );
        rows
    }

    fn row(
        &self,
        cluster_id: &ClusterId,
        profile: &ClusterProfile,
        metadata: &ClusterMetadata,
        assigned: Option<&ClusterId>,
    ) -> ComparisonRow {
        let resolved = metadata.resolve(cluster_id);
        if !resolved.complete {
            warn!(cluster_id = %cluster_id, "No metadata for cluster, using fallback label");
        }

        let dominant_education = profile.dominant(Attribute::EduLevel).map(str::to_string);
        let (color_tag, color_error) = match dominant_education.as_deref() {
            None => (None, None),
            Some(education) => match self.palette.color_for(education) {
                Some(color) => (Some(color.to_string()), None),
                None => {
                    warn!(
                        cluster_id = %cluster_id,
                        education,
                        "Dominant education level has no palette entry"
                    );
                    (
                        None,
                        Some(CohortError::UnsupportedCategory {
                            cluster_id: cluster_id.clone(),
                            attribute: Attribute::EduLevel,
                            value: education.to_string(),
                        }),
                    )
                }
            },
        };

        ComparisonRow {
            cluster_id: cluster_id.clone(),
            label: resolved.name,
            size: profile.size,
            dominant_education,
            color_tag,
            color_error,
            metadata_complete: resolved.complete,
            is_assigned: assigned == Some(cluster_id),
        }
    }

    /// Peak single-value count per attribute; all zeros for an empty group.
    pub fn radar_profile<'a, I>(records: I) -> RadarProfile
    where
        I: IntoIterator<Item = &'a Record>,
    {
        RadarProfile::from_profile(&ProfileAggregator::profile(records))
    }

    /// Histograms over each attribute's declared codomain.
    ///
    /// Values with zero observations keep their bin so chart axes stay
    /// stable across groups. Observed values outside the codomain are
    /// appended after it.
    pub fn histograms(&self, profile: &ClusterProfile) -> BTreeMap<Attribute, Histogram> {
        Attribute::ALL
            .into_iter()
            .map(|attribute| {
                let spec = self.schema.spec(attribute);
                let table = profile.frequency(attribute);
                let count = |value: &str| table.map_or(0, |t| t.count(value));

                let mut bins: Vec<HistogramBin> = spec
                    .values
                    .iter()
                    .map(|value| HistogramBin {
                        value: value.clone(),
                        count: count(value),
                    })
                    .collect();
                if let Some(table) = table {
                    bins.extend(
                        table
                            .iter()
                            .filter(|(value, _)| !spec.contains(value))
                            .map(|(value, count)| HistogramBin {
                                value: value.to_string(),
                                count,
                            }),
                    );
                }

                let histogram = Histogram {
                    attribute,
                    label: spec.label.clone(),
                    bins,
                };
                (attribute, histogram)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_types::ClusterDescriptor;

    fn index() -> PopulationIndex {
        let labeled = vec![
            (Record::new("25-34", "Wyższe", "Psy", "W górach", "Mężczyzna"), ClusterId::from(1u32)),
            (Record::new("25-34", "Wyższe", "Koty", "W górach", "Kobieta"), ClusterId::from(1u32)),
            (Record::new("18-24", "Średnie", "Koty", "Nad wodą", "Kobieta"), ClusterId::from(0u32)),
            (Record::new("<18", "Podstawowe", "Inne", "Inne", "Mężczyzna"), ClusterId::from(2u32)),
        ];
        PopulationIndex::from_labeled(labeled, &AttributeSchema::survey()).unwrap()
    }

    fn metadata() -> ClusterMetadata {
        ClusterMetadata::new()
            .with(0u32, ClusterDescriptor::new("Beach cats", "Cat owners by the water"))
            .with(1u32, ClusterDescriptor::new("Mountain grads", "Graduates who hike"))
    }

    #[test]
    fn rows_cover_every_cluster_in_order() {
        let engine = ComparisonEngine::default();
        let rows = engine.comparison_table(&index(), &metadata(), None);
        let ids: Vec<_> = rows.iter().map(|r| r.cluster_id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1", "2"]);
        assert_eq!(rows[1].size, 2);
        assert_eq!(rows[1].label, "Mountain grads");
        assert_eq!(rows[1].dominant_education.as_deref(), Some("Wyższe"));
        assert_eq!(rows[1].color_tag.as_deref(), Some("#99FF99"));
    }

    #[test]
    fn missing_metadata_uses_fallback_label() {
        let engine = ComparisonEngine::default();
        let rows = engine.comparison_table(&index(), &metadata(), None);
        let row = &rows[2];
        assert_eq!(row.label, "Group 2");
        assert!(!row.metadata_complete);
        assert!(rows[0].metadata_complete);
    }

    #[test]
    fn assigned_cluster_is_marked() {
        let engine = ComparisonEngine::default();
        let assigned = ClusterId::from(1u32);
        let rows = engine.comparison_table(&index(), &metadata(), Some(&assigned));
        let marked: Vec<_> = rows.iter().filter(|r| r.is_assigned).collect();
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].cluster_id, assigned);
    }

    #[test]
    fn palette_miss_fails_only_that_row() {
        let palette = EducationPalette::from_pairs([("Średnie", "#99CCFF"), ("Wyższe", "#99FF99")]);
        let engine = ComparisonEngine::new(AttributeSchema::survey(), palette);
        let rows = engine.comparison_table(&index(), &metadata(), None);

        let broken = &rows[2];
        assert!(broken.color_tag.is_none());
        match broken.color() {
            Err(CohortError::UnsupportedCategory {
                cluster_id,
                attribute,
                value,
            }) => {
                assert_eq!(cluster_id, ClusterId::from(2u32));
                assert_eq!(attribute, Attribute::EduLevel);
                assert_eq!(value, "Podstawowe");
            }
            other => panic!("expected UnsupportedCategory, got {other:?}"),
        }

        assert_eq!(rows[0].color().unwrap(), Some("#99CCFF"));
        assert_eq!(rows[1].color().unwrap(), Some("#99FF99"));
    }

    #[test]
    fn radar_profile_takes_peak_per_attribute() {
        let records = vec![
            Record::new("25-34", "Wyższe", "Psy", "W górach", "Mężczyzna"),
            Record::new("25-34", "Wyższe", "Koty", "W lesie", "Kobieta"),
            Record::new("25-34", "Średnie", "Koty", "Inne", "Kobieta"),
        ];
        let radar = ComparisonEngine::radar_profile(&records);
        assert_eq!(radar.get(Attribute::Age), 3);
        assert_eq!(radar.get(Attribute::EduLevel), 2);
        assert_eq!(radar.get(Attribute::FavAnimals), 2);
        assert_eq!(radar.get(Attribute::FavPlace), 1);
        assert_eq!(radar.get(Attribute::Gender), 2);
        assert_eq!(radar.max(), 3);
    }

    #[test]
    fn radar_profile_of_empty_group_is_zero() {
        let radar = ComparisonEngine::radar_profile(&Vec::<Record>::new());
        assert_eq!(radar.iter().count(), Attribute::ALL.len());
        assert!(radar.iter().all(|(_, peak)| peak == 0));
    }

    #[test]
    fn histograms_cover_codomain_in_axis_order() {
        let engine = ComparisonEngine::default();
        let records = vec![
            Record::new("35-44", "Wyższe", "Psy", "W górach", "Mężczyzna"),
            Record::new("<18", "Wyższe", "Koty", "W lesie", "Kobieta"),
        ];
        let profile = ProfileAggregator::profile(&records);
        let histograms = engine.histograms(&profile);

        let age = &histograms[&Attribute::Age];
        let axis: Vec<_> = age.bins.iter().map(|b| b.value.as_str()).collect();
        assert_eq!(
            axis,
            vec!["<18", "18-24", "25-34", "35-44", "45-54", "55-64", ">=65", "unknown"]
        );
        assert_eq!(age.count("<18"), 1);
        assert_eq!(age.count("45-54"), 0);
        assert_eq!(age.label, "Age");

        for histogram in histograms.values() {
            assert_eq!(histogram.total(), profile.size);
        }
    }

    #[test]
    fn palette_deserializes_from_plain_mapping() {
        let palette: EducationPalette =
            serde_json::from_str(r#"{"Wyższe": "blue", "Średnie": "green"}"#).unwrap();
        assert_eq!(palette.color_for("Wyższe"), Some("blue"));
        assert_eq!(palette.color_for("Podstawowe"), None);
        assert_eq!(palette.len(), 2);
    }
}
