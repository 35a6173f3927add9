//! Cohort CLI - find the survey group closest to a respondent
//!
//! The CLI loads the survey population, the cluster names and the clustering
//! model, then:
//! - assigns a respondent to a group and profiles that group
//! - compares every group by size and dominant education level
//! - lists the survey attributes and their valid answers

use std::process::ExitCode;

use clap::Parser;
use colored::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod output;

use commands::Commands;
use config::CohortConfig;
use error::CliResult;
use output::OutputFormat;

/// Cohort CLI application
#[derive(Parser)]
#[command(name = "cohort")]
#[command(about = "Cohort - survey group assignment and comparison", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "COHORT_CONFIG")]
    config: Option<String>,

    /// Log level (overrides the configuration file)
    #[arg(long, env = "COHORT_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "COHORT_LOG_JSON")]
    json_logs: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

fn init_tracing(level: &str, json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries command output
    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let config = CohortConfig::load(cli.config.as_deref())?;
    init_tracing(
        cli.log_level.as_deref().unwrap_or(&config.logging.level),
        cli.json_logs || config.logging.json,
    );

    let output = commands::execute(cli.command, &config, cli.output)?;
    println!("{}", output);
    Ok(())
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            ExitCode::FAILURE
        }
    }
}
