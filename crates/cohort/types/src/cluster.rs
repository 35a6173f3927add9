//! Cluster identifiers and externally supplied cluster metadata.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Opaque cluster identifier produced by a clustering model.
///
/// Ids are carried in their string form; numeric ids are converted to
/// decimal on construction so that metadata keyed by `"3"` matches a model
/// that emits `3`. Surrounding whitespace is trimmed.
///
/// Ordering is natural: by non-numeric prefix, then by the value of a
/// trailing decimal number, then by the full string. `Cluster 2` sorts
/// before `Cluster 10` and `-1` before `0`. Numbers of any length compare
/// by value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ClusterId(String);

impl ClusterId {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.len() == id.len() {
            Self(id)
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Label used when no metadata exists for this id.
    pub fn fallback_label(&self) -> String {
        format!("Group {}", self.0)
    }

    fn sort_key(&self) -> (&str, Option<TrailingNumber<'_>>) {
        let digits_start = self.0.trim_end_matches(|c: char| c.is_ascii_digit()).len();
        if digits_start == self.0.len() {
            return (&self.0, None);
        }

        // A `-` counts as a sign only at the start or after whitespace.
        let head = &self.0[..digits_start];
        let negative = head
            .strip_suffix('-')
            .is_some_and(|rest| rest.is_empty() || rest.ends_with(char::is_whitespace));
        let prefix = if negative { &head[..head.len() - 1] } else { head };

        let digits = self.0[digits_start..].trim_start_matches('0');
        let number = TrailingNumber {
            negative: negative && !digits.is_empty(),
            digits,
        };
        (prefix, Some(number))
    }
}

/// Trailing decimal number of an id, compared by value without parsing.
#[derive(Debug, PartialEq, Eq)]
struct TrailingNumber<'a> {
    negative: bool,
    /// Digits with leading zeros removed; empty for zero.
    digits: &'a str,
}

impl TrailingNumber<'_> {
    fn magnitude_cmp(&self, other: &Self) -> Ordering {
        self.digits
            .len()
            .cmp(&other.digits.len())
            .then_with(|| self.digits.cmp(other.digits))
    }
}

impl Ord for TrailingNumber<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.magnitude_cmp(other),
            (true, true) => other.magnitude_cmp(self),
        }
    }
}

impl PartialOrd for TrailingNumber<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ClusterId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for ClusterId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for ClusterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ClusterId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl From<&str> for ClusterId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<ClusterId> for String {
    fn from(id: ClusterId) -> Self {
        id.0
    }
}

macro_rules! numeric_cluster_id {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ClusterId {
                fn from(id: $ty) -> Self {
                    Self(id.to_string())
                }
            }
        )*
    };
}

numeric_cluster_id!(u8, u16, u32, u64, usize, i32, i64);

/// Name and description of one cluster.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterDescriptor {
    pub name: String,
    pub description: String,
}

impl ClusterDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Metadata for a cluster after fallback resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMetadata {
    pub cluster_id: ClusterId,
    pub name: String,
    pub description: String,
    /// `false` when the name and description are fallbacks.
    pub complete: bool,
}

/// Cluster id -> name/description, as supplied by the metadata file.
///
/// Keys are strings on the wire and are normalized the same way as
/// [`ClusterId`], so lookups never depend on whether the model emits
/// numbers or strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, ClusterDescriptor>",
    into = "BTreeMap<String, ClusterDescriptor>"
)]
pub struct ClusterMetadata {
    entries: BTreeMap<String, ClusterDescriptor>,
}

impl ClusterMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, cluster_id: impl Into<ClusterId>, descriptor: ClusterDescriptor) {
        self.entries
            .insert(String::from(cluster_id.into()), descriptor);
    }

    pub fn with(mut self, cluster_id: impl Into<ClusterId>, descriptor: ClusterDescriptor) -> Self {
        self.insert(cluster_id, descriptor);
        self
    }

    pub fn get(&self, cluster_id: &ClusterId) -> Option<&ClusterDescriptor> {
        self.entries.get(cluster_id.as_str())
    }

    pub fn contains(&self, cluster_id: &ClusterId) -> bool {
        self.get(cluster_id).is_some()
    }

    /// Look up `cluster_id`, substituting a deterministic fallback when the
    /// metadata has no entry for it.
    pub fn resolve(&self, cluster_id: &ClusterId) -> ResolvedMetadata {
        match self.get(cluster_id) {
            Some(descriptor) => ResolvedMetadata {
                cluster_id: cluster_id.clone(),
                name: descriptor.name.clone(),
                description: descriptor.description.clone(),
                complete: true,
            },
            None => ResolvedMetadata {
                cluster_id: cluster_id.clone(),
                name: cluster_id.fallback_label(),
                description: format!("No description is available for {}.", cluster_id.fallback_label()),
                complete: false,
            },
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<BTreeMap<String, ClusterDescriptor>> for ClusterMetadata {
    fn from(raw: BTreeMap<String, ClusterDescriptor>) -> Self {
        let entries = raw
            .into_iter()
            .map(|(key, descriptor)| (String::from(ClusterId::new(key)), descriptor))
            .collect();
        Self { entries }
    }
}

impl From<ClusterMetadata> for BTreeMap<String, ClusterDescriptor> {
    fn from(metadata: ClusterMetadata) -> Self {
        metadata.entries
    }
}
