use clap::{Parser, Subcommand, ValueEnum};
use cycles_core::studies::Study;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cycles-runner", version, about = "Business-cycle study runner")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the available studies.
    List,
    /// Run one study and print its report.
    Run {
        study: Study,
        #[arg(long, help = "JSON file overriding part of the default configuration")]
        config: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Pretty,
    Table,
}
