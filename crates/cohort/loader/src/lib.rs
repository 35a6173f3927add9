//! # cohort-loader
//!
//! Reads the survey population, cluster metadata and clustering model from
//! disk and assembles them into an engine [`Snapshot`](cohort_engine::Snapshot).

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod artifacts;
mod error;
mod population;
mod snapshot;

pub use artifacts::{load_metadata, load_model};
pub use error::{LoadError, LoadResult};
pub use population::{load_population, read_population, Population, CLUSTER_COLUMN};
pub use snapshot::SnapshotSources;
