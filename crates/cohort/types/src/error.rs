//! Error taxonomy shared by the cohort crates.
//!
//! Every variant carries the cluster id, attribute and offending value it
//! concerns, so a presentation layer can render an actionable message.
//! Errors serialize, because recoverable ones travel inside result bundles.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::attribute::Attribute;
use crate::cluster::ClusterId;

/// Errors raised by schema validation, clustering and profiling.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CohortError {
    /// A record lacks a value for an attribute.
    #[error("invalid record: attribute `{attribute}` is missing")]
    MissingAttribute { attribute: Attribute },

    /// A record holds a value outside its attribute's domain.
    #[error("invalid record: `{value}` is not a valid value for `{attribute}`")]
    InvalidValue { attribute: Attribute, value: String },

    /// A population row failed validation while building the index.
    #[error("population row {row} is invalid: {reason}")]
    InvalidPopulationRecord { row: usize, reason: Box<CohortError> },

    /// The model produced a cluster id with no metadata entry.
    #[error("no metadata for cluster {cluster_id}")]
    UnknownClusterMetadata { cluster_id: ClusterId },

    /// A dominant value has no entry in a fixed downstream mapping.
    #[error("cluster {cluster_id}: dominant `{attribute}` value `{value}` has no palette entry")]
    UnsupportedCategory {
        cluster_id: ClusterId,
        attribute: Attribute,
        value: String,
    },

    /// An attribute schema declaration is malformed.
    #[error("invalid attribute schema: {message}")]
    InvalidSchema { message: String },

    /// A clustering model has no clusters to assign to.
    #[error("clustering model has no clusters")]
    EmptyModel,

    /// The clustering model failed for a reason of its own.
    #[error("clustering model failed: {message}")]
    Model { message: String },

    /// The population snapshot could not be loaded.
    #[error("population snapshot unavailable: {message}")]
    SnapshotUnavailable { message: String },
}

impl CohortError {
    /// Whether this error means the input record itself is malformed.
    pub fn is_invalid_record(&self) -> bool {
        matches!(
            self,
            Self::MissingAttribute { .. }
                | Self::InvalidValue { .. }
                | Self::InvalidPopulationRecord { .. }
        )
    }

    /// Whether the request can continue with a degraded field.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnknownClusterMetadata { .. } | Self::UnsupportedCategory { .. }
        )
    }
}

/// Result type for cohort operations.
pub type CohortResult<T> = Result<T, CohortError>;
