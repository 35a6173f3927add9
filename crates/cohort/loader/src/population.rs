//! Survey population CSV reader.
//!
//! The population file is `;`-separated with a header row naming the five
//! attribute columns. Extra columns are ignored. When a `Cluster` column is
//! present every row carries a precomputed cluster id.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use cohort_engine::{ClusterModel, PopulationIndex};
use cohort_types::{Attribute, AttributeSchema, ClusterId, Record};
use tracing::{debug, info};

use crate::error::{LoadError, LoadResult};

/// Header of the optional precomputed cluster column.
pub const CLUSTER_COLUMN: &str = "Cluster";

const DELIMITER: u8 = b';';

/// Population rows as read from disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Population {
    /// Rows still to be assigned by a model.
    Unlabeled(Vec<Record>),
    /// Rows with cluster ids computed upstream.
    Labeled(Vec<(Record, ClusterId)>),
}

impl Population {
    pub fn len(&self) -> usize {
        match self {
            Population::Unlabeled(records) => records.len(),
            Population::Labeled(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_labeled(&self) -> bool {
        matches!(self, Population::Labeled(_))
    }

    /// Group the rows by cluster.
    ///
    /// Labeled rows keep their ids; unlabeled rows are assigned by `model`.
    pub fn into_index(
        self,
        model: &dyn ClusterModel,
        schema: &AttributeSchema,
    ) -> LoadResult<PopulationIndex> {
        let index = match self {
            Population::Unlabeled(records) => PopulationIndex::build(records, model, schema)?,
            Population::Labeled(rows) => PopulationIndex::from_labeled(rows, schema)?,
        };
        Ok(index)
    }
}

/// Read the population file at `path`.
pub fn load_population(path: impl AsRef<Path>, schema: &AttributeSchema) -> LoadResult<Population> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let population = read_population(file, path, schema)?;
    info!(
        path = %path.display(),
        rows = population.len(),
        labeled = population.is_labeled(),
        "Population loaded"
    );
    Ok(population)
}

/// Read population rows from any reader. `path` is used for error reports.
pub fn read_population<R: Read>(
    reader: R,
    path: &Path,
    schema: &AttributeSchema,
) -> LoadResult<Population> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .from_reader(reader);

    let csv_error = |source: csv::Error| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let headers = reader.headers().map_err(csv_error)?.clone();
    let columns = Columns::locate(&headers, path)?;
    debug!(path = %path.display(), labeled = columns.cluster.is_some(), "Population header parsed");

    let mut records = Vec::new();
    let mut labels = Vec::new();
    for (offset, row) in reader.records().enumerate() {
        let row = row.map_err(csv_error)?;
        // Header is line 1.
        let line = row
            .position()
            .map_or(offset as u64 + 2, |position| position.line());

        let record = Record::from_pairs(Attribute::ALL.into_iter().zip(columns.attributes).map(
            |(attribute, column)| {
                let raw = row.get(column).unwrap_or_default();
                (attribute, schema.normalize_missing(attribute, raw))
            },
        ));
        schema
            .validate(&record)
            .map_err(|source| LoadError::InvalidRow {
                path: path.to_path_buf(),
                line,
                source,
            })?;

        if let Some(column) = columns.cluster {
            let label = row.get(column).map(str::trim).unwrap_or_default();
            if label.is_empty() {
                return Err(LoadError::MissingLabel {
                    path: path.to_path_buf(),
                    line,
                });
            }
            labels.push(ClusterId::new(label));
        }
        records.push(record);
    }

    Ok(match columns.cluster {
        Some(_) => Population::Labeled(records.into_iter().zip(labels).collect()),
        None => Population::Unlabeled(records),
    })
}

/// Header positions of the columns the loader reads.
struct Columns {
    attributes: [usize; 5],
    cluster: Option<usize>,
}

impl Columns {
    fn locate(headers: &csv::StringRecord, path: &Path) -> LoadResult<Self> {
        let mut attributes = [0usize; 5];
        for attribute in Attribute::ALL {
            attributes[attribute.index()] = headers
                .iter()
                .position(|header| Attribute::from_name(header) == Some(attribute))
                .ok_or_else(|| LoadError::MissingColumn {
                    path: path.to_path_buf(),
                    column: attribute.name().to_string(),
                })?;
        }
        let cluster = headers
            .iter()
            .position(|header| header.trim().eq_ignore_ascii_case(CLUSTER_COLUMN));

        Ok(Self {
            attributes,
            cluster,
        })
    }
}
