//! cycles-runner: headless front end for the business-cycle studies.
//!
//! Usage:
//!   cycles-runner list
//!   cycles-runner run kaldor-curves --format table
//!   cycles-runner run samuelson-frontier --config overrides.json

mod cli;
mod table;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, OutputFormat};
use cycles_core::studies::{run_study, Study, StudyConfig};
use std::fs;
use std::path::Path;

fn load_config(path: Option<&Path>) -> Result<StudyConfig> {
    let Some(path) = path else {
        return Ok(StudyConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    log::debug!("loaded config overrides from {}", path.display());
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::List => {
            for study in Study::ALL {
                println!("{:<22}{}", study.name(), study.description());
            }
        }
        Commands::Run {
            study,
            config,
            format,
        } => {
            let config = load_config(config.as_deref())?;
            let report = run_study(study, &config)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string(&report)?),
                OutputFormat::Pretty => println!("{}", serde_json::to_string_pretty(&report)?),
                OutputFormat::Table => {
                    print!("{}", table::render(&report).context("rendering table")?)
                }
            }
        }
    }
    Ok(())
}
