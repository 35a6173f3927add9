//! # cohort-engine
//!
//! Places a survey respondent in one of a fixed set of population clusters
//! and profiles that cluster against the rest of the population.
//!
//! Pipeline for one respondent:
//! - **Validate** the record against the [`AttributeSchema`](cohort_types::AttributeSchema)
//! - **Assign** it with a [`ClusterModel`]
//! - **Profile** the assigned group ([`ProfileAggregator`])
//! - **Compare** every cluster in the [`PopulationIndex`] ([`ComparisonEngine`])
//!
//! [`SnapshotStore`] holds the model, population and metadata as one
//! read-only unit shared by every request of a process.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod comparison;
pub mod index;
pub mod model;
pub mod profile;
pub mod service;
pub mod snapshot;

pub use comparison::{
    ComparisonEngine, ComparisonRow, EducationPalette, Histogram, HistogramBin, RadarProfile,
};
pub use index::{PopulationIndex, PopulationRecord};
pub use model::{CentroidArtifact, CentroidModel, ClusterModel};
pub use profile::{ClusterProfile, FrequencyTable, ProfileAggregator};
pub use service::{AssignmentService, ResultBundle};
pub use snapshot::{Snapshot, SnapshotLoader, SnapshotStore};
