//! # cohort-types
//!
//! Shared vocabulary for the cohort engine:
//! - **Attributes**: the five categorical survey fields and their closed domains
//! - **Records**: one respondent's answers, keyed by attribute
//! - **Clusters**: opaque cluster ids and the externally supplied names/descriptions
//! - **Errors**: the error taxonomy surfaced to presentation layers

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

pub mod attribute;
pub mod cluster;
pub mod error;
pub mod record;

pub use attribute::{Attribute, AttributeSchema, AttributeSpec, UNKNOWN};
pub use cluster::{ClusterDescriptor, ClusterId, ClusterMetadata, ResolvedMetadata};
pub use error::{CohortError, CohortResult};
pub use record::Record;
