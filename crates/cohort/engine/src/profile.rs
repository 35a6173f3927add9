//! Per-group summary statistics: size, dominant values, frequency tables.

use std::collections::BTreeMap;

use cohort_types::{Attribute, Record};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Counts of each observed value of one attribute.
///
/// Values appear in the order they were first encountered. Only observed
/// values have entries; use
/// [`ComparisonEngine::histograms`](crate::ComparisonEngine::histograms) for
/// a table over the full codomain.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<(String, usize)>,
}

impl FrequencyTable {
    pub fn observe(&mut self, value: &str) {
        match self.entries.iter_mut().find(|(v, _)| v == value) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((value.to_string(), 1)),
        }
    }

    pub fn count(&self, value: &str) -> usize {
        self.entries
            .iter()
            .find(|(v, _)| v == value)
            .map_or(0, |(_, count)| *count)
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Highest single-value count.
    pub fn peak(&self) -> Option<usize> {
        self.entries.iter().map(|(_, count)| *count).max()
    }

    /// Most frequent value; ties go to the value encountered first.
    pub fn dominant(&self) -> Option<&str> {
        let mut best: Option<&(String, usize)> = None;
        for entry in &self.entries {
            match best {
                Some((_, best_count)) if entry.1 <= *best_count => {}
                _ => best = Some(entry),
            }
        }
        best.map(|(value, _)| value.as_str())
    }

    /// Entries in first-encountered order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(value, count)| (value.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for FrequencyTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (value, count) in &self.entries {
            map.serialize_entry(value, count)?;
        }
        map.end()
    }
}

/// Summary of one group of records.
///
/// An empty group has `size == 0` and empty mappings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ClusterProfile {
    pub size: usize,
    pub dominant_value: BTreeMap<Attribute, String>,
    pub frequency: BTreeMap<Attribute, FrequencyTable>,
}

impl ClusterProfile {
    pub fn dominant(&self, attribute: Attribute) -> Option<&str> {
        self.dominant_value.get(&attribute).map(String::as_str)
    }

    pub fn frequency(&self, attribute: Attribute) -> Option<&FrequencyTable> {
        self.frequency.get(&attribute)
    }

    /// Highest single-value count for `attribute`, 0 for an empty group.
    pub fn peak(&self, attribute: Attribute) -> usize {
        self.frequency(attribute)
            .and_then(FrequencyTable::peak)
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// Computes [`ClusterProfile`]s. Pure; knows nothing about models or metadata.
pub struct ProfileAggregator;

impl ProfileAggregator {
    /// Profile any group of records.
    ///
    /// Records lacking an attribute are counted in `size` but not in that
    /// attribute's table; validated records always carry every attribute.
    pub fn profile<'a, I>(records: I) -> ClusterProfile
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut size = 0;
        let mut frequency: BTreeMap<Attribute, FrequencyTable> = BTreeMap::new();

        for record in records {
            size += 1;
            for (attribute, value) in record.iter() {
                frequency.entry(attribute).or_default().observe(value);
            }
        }

        let dominant_value = frequency
            .iter()
            .filter_map(|(attribute, table)| {
                table.dominant().map(|value| (*attribute, value.to_string()))
            })
            .collect();

        ClusterProfile {
            size,
            dominant_value,
            frequency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group() -> Vec<Record> {
        vec![
            Record::new("25-34", "Wyższe", "Psy", "W górach", "Mężczyzna"),
            Record::new("25-34", "Średnie", "Koty", "W górach", "Kobieta"),
            Record::new("18-24", "Wyższe", "Psy", "Nad wodą", "Kobieta"),
        ]
    }

    #[test]
    fn empty_group_profiles_to_zero() {
        let profile = ProfileAggregator::profile(&Vec::<Record>::new());
        assert_eq!(profile.size, 0);
        assert!(profile.dominant_value.is_empty());
        assert!(profile.frequency.is_empty());
        for attribute in Attribute::ALL {
            assert_eq!(profile.peak(attribute), 0);
            assert_eq!(profile.dominant(attribute), None);
        }
    }

    #[test]
    fn counts_and_dominants() {
        let profile = ProfileAggregator::profile(&group());
        assert_eq!(profile.size, 3);
        assert_eq!(profile.dominant(Attribute::Age), Some("25-34"));
        assert_eq!(profile.dominant(Attribute::EduLevel), Some("Wyższe"));
        assert_eq!(profile.dominant(Attribute::Gender), Some("Kobieta"));

        let places = profile.frequency(Attribute::FavPlace).unwrap();
        assert_eq!(places.count("W górach"), 2);
        assert_eq!(places.count("Nad wodą"), 1);
        assert_eq!(places.count("W lesie"), 0);
    }

    #[test]
    fn frequencies_sum_to_size() {
        let profile = ProfileAggregator::profile(&group());
        for attribute in Attribute::ALL {
            assert_eq!(profile.frequency(attribute).unwrap().total(), profile.size);
        }
    }

    #[test]
    fn tie_goes_to_first_encountered_value() {
        let forward = vec![
            Record::new("25-34", "Średnie", "Psy", "W górach", "Kobieta"),
            Record::new("25-34", "Wyższe", "Psy", "W górach", "Kobieta"),
        ];
        let backward: Vec<Record> = forward.iter().rev().cloned().collect();

        assert_eq!(
            ProfileAggregator::profile(&forward).dominant(Attribute::EduLevel),
            Some("Średnie")
        );
        assert_eq!(
            ProfileAggregator::profile(&backward).dominant(Attribute::EduLevel),
            Some("Wyższe")
        );
    }

    #[test]
    fn later_majority_overtakes_first_value() {
        let records = vec![
            Record::new("25-34", "Średnie", "Psy", "W górach", "Kobieta"),
            Record::new("25-34", "Wyższe", "Psy", "W górach", "Kobieta"),
            Record::new("25-34", "Wyższe", "Psy", "W górach", "Kobieta"),
        ];
        let profile = ProfileAggregator::profile(&records);
        assert_eq!(profile.dominant(Attribute::EduLevel), Some("Wyższe"));
    }

    #[test]
    fn frequency_table_serializes_in_encounter_order() {
        let mut table = FrequencyTable::default();
        table.observe("Psy");
        table.observe("Koty");
        table.observe("Psy");
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"Psy":2,"Koty":1}"#);
    }

    #[test]
    fn profile_serializes_attribute_keys() {
        let profile = ProfileAggregator::profile(&group());
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["size"], 3);
        assert_eq!(json["dominant_value"]["edu_level"], "Wyższe");
        assert_eq!(json["frequency"]["fav_animals"]["Psy"], 2);
    }
}
