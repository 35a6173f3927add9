//! Subcommand definitions and execution

use clap::{Args, Subcommand};
use cohort_engine::{AssignmentService, SnapshotStore};
use cohort_types::{AttributeSchema, Record};
use tracing::debug;

use crate::config::CohortConfig;
use crate::error::CliResult;
use crate::output::{render_bundle, render_groups, render_schema, OutputFormat};

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Find the closest group for a respondent and compare it with the rest
    Assign(RespondentArgs),

    /// Show every group with its size and dominant education level
    Groups,

    /// Show the survey attributes and their valid answers
    Schema,
}

/// Survey answers of one respondent
#[derive(Debug, Args)]
pub struct RespondentArgs {
    /// Age bracket, e.g. `25-34`
    #[arg(long)]
    pub age: String,

    /// Education level
    #[arg(long)]
    pub edu_level: String,

    /// Favorite animals
    #[arg(long)]
    pub fav_animals: String,

    /// Favorite place
    #[arg(long)]
    pub fav_place: String,

    /// Gender
    #[arg(long)]
    pub gender: String,
}

impl RespondentArgs {
    pub fn record(&self) -> Record {
        Record::new(
            self.age.as_str(),
            self.edu_level.as_str(),
            self.fav_animals.as_str(),
            self.fav_place.as_str(),
            self.gender.as_str(),
        )
    }
}

/// Load the configured files into a ready store.
fn open_store(config: &CohortConfig, schema: &AttributeSchema) -> CliResult<SnapshotStore> {
    let snapshot = config.data.sources().load(schema)?;
    let service = AssignmentService::new(schema.clone(), config.education_palette());
    Ok(SnapshotStore::with_snapshot(service, snapshot))
}

/// Execute a command and return its rendered output
pub fn execute(command: Commands, config: &CohortConfig, format: OutputFormat) -> CliResult<String> {
    let schema = AttributeSchema::survey();
    debug!(?command, ?format, "Executing command");

    match command {
        Commands::Assign(respondent) => {
            let store = open_store(config, &schema)?;
            let bundle = store.evaluate(&respondent.record())?;
            render_bundle(&bundle, &schema, format)
        }
        Commands::Groups => {
            let store = open_store(config, &schema)?;
            render_groups(&store.comparison_table()?, format)
        }
        Commands::Schema => render_schema(&schema, format),
    }
}
