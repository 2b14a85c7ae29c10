//! Defines the command-line arguments and subcommands for the report CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::PartialConfig;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "feature-report",
    version,
    about = "Merges Cucumber JSON results and renders them through a Handlebars template."
)]
pub struct ReportArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Full pipeline: merge the JSON results and write report.html.
    Render {
        #[command(flatten)]
        paths: PathArgs,
        /// Only print warnings and errors.
        #[arg(short, long)]
        quiet: bool,
    },
    /// Print the merged features document without rendering it.
    Merge {
        #[command(flatten)]
        paths: PathArgs,
    },
    /// List every helper available to templates.
    Helpers,
}

/// Run parameters shared by the subcommands.
#[derive(Debug, Args)]
pub struct PathArgs {
    /// Directory holding the JSON result files.
    #[arg(short, long, value_name = "DIR")]
    pub source: Option<PathBuf>,
    /// Directory the report is written to; created if absent.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
    /// Handlebars template file.
    #[arg(short, long, value_name = "FILE")]
    pub template: Option<PathBuf>,
    /// YAML file supplying any of the paths above.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl PathArgs {
    /// Combines the flags with the config file, flags taking precedence.
    pub fn to_partial_config(&self) -> Result<PartialConfig, crate::ReportError> {
        let flags = PartialConfig {
            source_dir: self.source.clone(),
            output_dir: self.output.clone(),
            template_file: self.template.clone(),
        };
        match &self.config {
            Some(path) => Ok(flags.or(PartialConfig::from_yaml_file(path)?)),
            None => Ok(flags),
        }
    }
}
