use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::attribute::Attribute;

/// One respondent's answers, keyed by attribute.
///
/// A record is a plain mapping; completeness and domain membership are
/// checked by [`AttributeSchema::validate`](crate::AttributeSchema::validate).
/// Serializes as `{"age": "...", "edu_level": "...", ...}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    values: BTreeMap<Attribute, String>,
}

impl Record {
    /// Build a complete record from the five survey answers.
    pub fn new(
        age: impl Into<String>,
        edu_level: impl Into<String>,
        fav_animals: impl Into<String>,
        fav_place: impl Into<String>,
        gender: impl Into<String>,
    ) -> Self {
        Self::from_pairs([
            (Attribute::Age, age.into()),
            (Attribute::EduLevel, edu_level.into()),
            (Attribute::FavAnimals, fav_animals.into()),
            (Attribute::FavPlace, fav_place.into()),
            (Attribute::Gender, gender.into()),
        ])
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Attribute, S)>,
        S: Into<String>,
    {
        Self {
            values: pairs.into_iter().map(|(a, v)| (a, v.into())).collect(),
        }
    }

    /// Copy of this record with one answer replaced.
    pub fn with(&self, attribute: Attribute, value: impl Into<String>) -> Self {
        let mut values = self.values.clone();
        values.insert(attribute, value.into());
        Self { values }
    }

    pub fn get(&self, attribute: Attribute) -> Option<&str> {
        self.values.get(&attribute).map(String::as_str)
    }

    /// Answers in canonical attribute order.
    pub fn iter(&self) -> impl Iterator<Item = (Attribute, &str)> + '_ {
        self.values.iter().map(|(a, v)| (*a, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_flat_mapping() {
        let record = Record::new("18-24", "Średnie", "Koty", "Nad wodą", "Mężczyzna");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["age"], "18-24");
        assert_eq!(json["edu_level"], "Średnie");
        assert_eq!(json["fav_place"], "Nad wodą");
        assert_eq!(json.as_object().unwrap().len(), 5);
    }

    #[test]
    fn with_leaves_original_untouched() {
        let record = Record::new("18-24", "Średnie", "Koty", "Nad wodą", "Mężczyzna");
        let changed = record.with(Attribute::Gender, "Kobieta");
        assert_eq!(record.get(Attribute::Gender), Some("Mężczyzna"));
        assert_eq!(changed.get(Attribute::Gender), Some("Kobieta"));
    }

    #[test]
    fn iterates_in_canonical_order() {
        let record = Record::from_pairs([
            (Attribute::Gender, "Kobieta"),
            (Attribute::Age, "<18"),
        ]);
        let attrs: Vec<_> = record.iter().map(|(a, _)| a).collect();
        assert_eq!(attrs, vec![Attribute::Age, Attribute::Gender]);
    }
}
