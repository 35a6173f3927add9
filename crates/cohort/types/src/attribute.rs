//! Survey attributes and their closed value domains.

use serde::{Deserialize, Serialize};

use crate::error::{CohortError, CohortResult};
use crate::record::Record;

/// Sentinel value for an answer the respondent did not give.
pub const UNKNOWN: &str = "unknown";

/// The categorical fields every survey record carries.
///
/// Declaration order is the canonical order: per-attribute mappings,
/// chart axes and CSV columns are all emitted in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Age,
    EduLevel,
    FavAnimals,
    FavPlace,
    Gender,
}

impl Attribute {
    /// All attributes, in canonical order.
    pub const ALL: [Attribute; 5] = [
        Attribute::Age,
        Attribute::EduLevel,
        Attribute::FavAnimals,
        Attribute::FavPlace,
        Attribute::Gender,
    ];

    /// Column / wire name of the attribute.
    pub fn name(self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::EduLevel => "edu_level",
            Self::FavAnimals => "fav_animals",
            Self::FavPlace => "fav_place",
            Self::Gender => "gender",
        }
    }

    /// Parse a column name. Surrounding whitespace and ASCII case are ignored.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|a| a.name() == normalized)
    }

    /// Position in canonical order.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Declaration of one attribute: display label and ordered codomain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSpec {
    pub attribute: Attribute,
    /// Human-readable axis label.
    pub label: String,
    /// Valid values, in chart axis order. Includes [`UNKNOWN`] when allowed.
    pub values: Vec<String>,
}

impl AttributeSpec {
    pub fn new<I, S>(attribute: Attribute, label: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            attribute,
            label: label.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    pub fn allows_unknown(&self) -> bool {
        self.contains(UNKNOWN)
    }
}

/// The fixed set of attributes and the values each may take.
///
/// Used to constrain respondent input, to reject malformed population rows
/// and to give histograms a stable axis across groups.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSchema {
    specs: Vec<AttributeSpec>,
}

impl Default for AttributeSchema {
    fn default() -> Self {
        Self::survey()
    }
}

impl AttributeSchema {
    /// Build a schema from one spec per attribute.
    ///
    /// Specs are stored in canonical attribute order regardless of input
    /// order; a missing or duplicated attribute is rejected.
    pub fn new(specs: Vec<AttributeSpec>) -> CohortResult<Self> {
        let mut ordered: Vec<Option<AttributeSpec>> = vec![None; Attribute::ALL.len()];
        for spec in specs {
            let slot = &mut ordered[spec.attribute.index()];
            if slot.is_some() {
                return Err(CohortError::InvalidSchema {
                    message: format!("attribute `{}` declared twice", spec.attribute),
                });
            }
            *slot = Some(spec);
        }

        let specs = ordered
            .into_iter()
            .zip(Attribute::ALL)
            .map(|(spec, attribute)| {
                spec.ok_or_else(|| CohortError::InvalidSchema {
                    message: format!("attribute `{attribute}` not declared"),
                })
            })
            .collect::<CohortResult<Vec<_>>>()?;

        Ok(Self { specs })
    }

    /// The welcome-survey schema the population data was collected with.
    pub fn survey() -> Self {
        Self {
            specs: vec![
                AttributeSpec::new(
                    Attribute::Age,
                    "Age",
                    ["<18", "18-24", "25-34", "35-44", "45-54", "55-64", ">=65", UNKNOWN],
                ),
                AttributeSpec::new(
                    Attribute::EduLevel,
                    "Education",
                    ["Podstawowe", "Średnie", "Wyższe"],
                ),
                AttributeSpec::new(
                    Attribute::FavAnimals,
                    "Favorite animals",
                    ["Brak ulubionych", "Psy", "Koty", "Inne", "Koty i Psy"],
                ),
                AttributeSpec::new(
                    Attribute::FavPlace,
                    "Favorite place",
                    ["Nad wodą", "W lesie", "W górach", "Inne"],
                ),
                AttributeSpec::new(Attribute::Gender, "Gender", ["Mężczyzna", "Kobieta"]),
            ],
        }
    }

    pub fn spec(&self, attribute: Attribute) -> &AttributeSpec {
        &self.specs[attribute.index()]
    }

    pub fn specs(&self) -> &[AttributeSpec] {
        &self.specs
    }

    pub fn label(&self, attribute: Attribute) -> &str {
        &self.spec(attribute).label
    }

    pub fn domain(&self, attribute: Attribute) -> &[String] {
        &self.spec(attribute).values
    }

    pub fn allows_unknown(&self, attribute: Attribute) -> bool {
        self.spec(attribute).allows_unknown()
    }

    /// Axis position of `value` within the attribute's codomain.
    pub fn position(&self, attribute: Attribute, value: &str) -> Option<usize> {
        self.domain(attribute).iter().position(|v| v == value)
    }

    /// Map a raw input cell to a domain value.
    ///
    /// Blank cells become [`UNKNOWN`] when the attribute allows it and stay
    /// blank otherwise (validation then rejects them).
    pub fn normalize_missing(&self, attribute: Attribute, raw: &str) -> String {
        let trimmed = raw.trim();
        if trimmed.is_empty() && self.allows_unknown(attribute) {
            UNKNOWN.to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// Check that `record` has a value for every attribute and that every
    /// value is inside its attribute's domain.
    pub fn validate(&self, record: &Record) -> CohortResult<()> {
        for spec in &self.specs {
            let value = record
                .get(spec.attribute)
                .ok_or(CohortError::MissingAttribute {
                    attribute: spec.attribute,
                })?;
            if !spec.contains(value) {
                return Err(CohortError::InvalidValue {
                    attribute: spec.attribute,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn is_valid(&self, record: &Record) -> bool {
        self.validate(record).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_record() -> Record {
        Record::new("25-34", "Wyższe", "Psy", "W górach", "Kobieta")
    }

    #[test]
    fn attribute_names_round_trip() {
        for attribute in Attribute::ALL {
            assert_eq!(Attribute::from_name(attribute.name()), Some(attribute));
        }
        assert_eq!(Attribute::from_name(" EDU_LEVEL "), Some(Attribute::EduLevel));
        assert_eq!(Attribute::from_name("Cluster"), None);
    }

    #[test]
    fn survey_schema_accepts_valid_record() {
        let schema = AttributeSchema::survey();
        assert!(schema.validate(&valid_record()).is_ok());
        assert!(schema.is_valid(&valid_record()));
    }

    #[test]
    fn value_outside_domain_is_rejected_with_context() {
        let schema = AttributeSchema::survey();
        let record = valid_record().with(Attribute::EduLevel, "Doktorat");
        match schema.validate(&record) {
            Err(CohortError::InvalidValue { attribute, value }) => {
                assert_eq!(attribute, Attribute::EduLevel);
                assert_eq!(value, "Doktorat");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn missing_attribute_is_rejected() {
        let schema = AttributeSchema::survey();
        let record = Record::from_pairs([
            (Attribute::Age, "25-34"),
            (Attribute::EduLevel, "Wyższe"),
            (Attribute::FavAnimals, "Psy"),
            (Attribute::FavPlace, "W górach"),
        ]);
        let err = schema.validate(&record).unwrap_err();
        assert!(matches!(
            err,
            CohortError::MissingAttribute {
                attribute: Attribute::Gender
            }
        ));
        assert!(err.is_invalid_record());
    }

    #[test]
    fn unknown_sentinel_only_where_declared() {
        let schema = AttributeSchema::survey();
        assert!(schema.allows_unknown(Attribute::Age));
        assert!(!schema.allows_unknown(Attribute::Gender));
        assert!(schema.is_valid(&valid_record().with(Attribute::Age, UNKNOWN)));
        assert!(!schema.is_valid(&valid_record().with(Attribute::Gender, UNKNOWN)));
    }

    #[test]
    fn normalize_missing_maps_blank_to_sentinel() {
        let schema = AttributeSchema::survey();
        assert_eq!(schema.normalize_missing(Attribute::Age, "  "), UNKNOWN);
        assert_eq!(schema.normalize_missing(Attribute::Gender, ""), "");
        assert_eq!(schema.normalize_missing(Attribute::FavPlace, " Inne "), "Inne");
    }

    #[test]
    fn position_follows_declared_axis_order() {
        let schema = AttributeSchema::survey();
        assert_eq!(schema.position(Attribute::Age, "<18"), Some(0));
        assert_eq!(schema.position(Attribute::Age, "unknown"), Some(7));
        assert_eq!(schema.position(Attribute::Age, "100+"), None);
    }

    #[test]
    fn custom_schema_is_reordered_canonically() {
        let schema = AttributeSchema::new(vec![
            AttributeSpec::new(Attribute::Gender, "G", ["m", "f"]),
            AttributeSpec::new(Attribute::Age, "A", ["young", "old"]),
            AttributeSpec::new(Attribute::FavPlace, "P", ["sea"]),
            AttributeSpec::new(Attribute::EduLevel, "E", ["low", "high"]),
            AttributeSpec::new(Attribute::FavAnimals, "F", ["cats"]),
        ])
        .unwrap();
        let order: Vec<_> = schema.specs().iter().map(|s| s.attribute).collect();
        assert_eq!(order, Attribute::ALL.to_vec());
        assert_eq!(schema.label(Attribute::Gender), "G");
    }

    #[test]
    fn custom_schema_requires_every_attribute_once() {
        let missing = AttributeSchema::new(vec![AttributeSpec::new(Attribute::Age, "A", ["x"])]);
        assert!(matches!(missing, Err(CohortError::InvalidSchema { .. })));

        let duplicated = AttributeSchema::new(vec![
            AttributeSpec::new(Attribute::Age, "A", ["x"]),
            AttributeSpec::new(Attribute::Age, "A", ["y"]),
        ]);
        assert!(matches!(duplicated, Err(CohortError::InvalidSchema { .. })));
    }
}
