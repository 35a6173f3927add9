//! Output formatting utilities

use cohort_engine::{ComparisonRow, ResultBundle};
use cohort_types::{Attribute, AttributeSchema, AttributeSpec};
use colored::*;
use serde::Serialize;
use tabled::{Table, Tabled};

use crate::error::CliResult;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// Human-readable tables
    Table,
}

fn to_json<T: Serialize + ?Sized>(data: &T) -> CliResult<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

#[derive(Tabled)]
struct GroupLine {
    #[tabled(rename = "Cluster")]
    cluster: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Size")]
    size: usize,
    #[tabled(rename = "Education")]
    education: String,
    #[tabled(rename = "Color")]
    color: String,
    #[tabled(rename = "")]
    marker: &'static str,
}

impl From<&ComparisonRow> for GroupLine {
    fn from(row: &ComparisonRow) -> Self {
        let color = match row.color() {
            Ok(Some(color)) => color.to_string(),
            Ok(None) => "-".to_string(),
            Err(_) => "missing".to_string(),
        };
        Self {
            cluster: row.cluster_id.to_string(),
            name: row.label.clone(),
            size: row.size,
            education: row.dominant_education.clone().unwrap_or_else(|| "-".into()),
            color,
            marker: if row.is_assigned { "<- you" } else { "" },
        }
    }
}

#[derive(Tabled)]
struct ProfileLine {
    #[tabled(rename = "Attribute")]
    attribute: String,
    #[tabled(rename = "Most common")]
    dominant: String,
    #[tabled(rename = "Count")]
    peak: usize,
}

#[derive(Tabled)]
struct SchemaLine {
    #[tabled(rename = "Attribute")]
    attribute: Attribute,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Values")]
    values: String,
}

impl From<&AttributeSpec> for SchemaLine {
    fn from(spec: &AttributeSpec) -> Self {
        Self {
            attribute: spec.attribute,
            label: spec.label.clone(),
            values: spec.values.join(", "),
        }
    }
}

fn groups_table(rows: &[ComparisonRow]) -> String {
    Table::new(rows.iter().map(GroupLine::from)).to_string()
}

/// Render the comparison table of every cluster.
pub fn render_groups(rows: &[ComparisonRow], format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(rows),
        OutputFormat::Table if rows.is_empty() => Ok("No clusters".dimmed().to_string()),
        OutputFormat::Table => Ok(groups_table(rows)),
    }
}

/// Render one respondent's result.
pub fn render_bundle(
    bundle: &ResultBundle,
    schema: &AttributeSchema,
    format: OutputFormat,
) -> CliResult<String> {
    if format == OutputFormat::Json {
        return to_json(bundle);
    }

    let profile = &bundle.own_profile;
    let lines: Vec<ProfileLine> = Attribute::ALL
        .into_iter()
        .map(|attribute| ProfileLine {
            attribute: schema.label(attribute).to_string(),
            dominant: profile.dominant(attribute).unwrap_or("-").to_string(),
            peak: bundle.radar_profile.get(attribute),
        })
        .collect();

    let mut out = Vec::new();
    out.push(format!(
        "{} {}",
        "Closest group:".bold(),
        bundle.cluster_meta.name.green().bold()
    ));
    out.push(bundle.cluster_meta.description.clone());
    out.push(String::new());
    out.push(format!("Members of your group: {}", profile.size));
    out.push(Table::new(lines).to_string());
    out.push(String::new());
    out.push(groups_table(&bundle.comparison_table));
    for issue in &bundle.issues {
        out.push(format!("{} {}", "⚠".yellow(), issue));
    }
    Ok(out.join("\n"))
}

/// Render the attribute schema.
pub fn render_schema(schema: &AttributeSchema, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(schema.specs()),
        OutputFormat::Table => Ok(Table::new(schema.specs().iter().map(SchemaLine::from)).to_string()),
    }
}
