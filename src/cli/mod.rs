//! The report command-line interface.
//!
//! Parses arguments, resolves configuration and drives the library.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use miette::Report;

use crate::cli::args::{Command, PathArgs, ReportArgs};
use crate::discovery::discover_report_files;
use crate::helpers::HelperRegistry;
use crate::merge::merge;
use crate::pipeline::ReportPipeline;
use crate::ReportError;

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() -> ExitCode {
    let args = ReportArgs::parse();

    let result = match args.command {
        Command::Render { paths, quiet } => handle_render(&paths, quiet),
        Command::Merge { paths } => handle_merge(&paths),
        Command::Helpers => {
            handle_helpers();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:?}", Report::new(e));
            ExitCode::FAILURE
        }
    }
}

/// Handles the `render` subcommand.
fn handle_render(paths: &PathArgs, quiet: bool) -> Result<(), ReportError> {
    let config = paths.to_partial_config()?.resolve()?;
    let pipeline = ReportPipeline::with_sink(config, Arc::new(output::ConsoleSink::new(quiet)));
    let summary = pipeline.run()?;
    if !quiet {
        output::print_run_summary(&summary);
    }
    Ok(())
}

/// Handles the `merge` subcommand.
fn handle_merge(paths: &PathArgs) -> Result<(), ReportError> {
    let source_dir = paths.to_partial_config()?.require_source_dir()?;
    let files = discover_report_files(&source_dir)?;
    let merged = merge(&files, &output::ConsoleSink::new(true))?;

    let document: serde_json::Value =
        serde_json::from_str(&merged.document).map_err(|e| ReportError::InvalidDocument {
            message: "merged text is not valid JSON".to_string(),
            source: Some(e),
        })?;
    let pretty = serde_json::to_string_pretty(&document).map_err(|e| {
        ReportError::InvalidDocument {
            message: "merged document could not be printed".to_string(),
            source: Some(e),
        }
    })?;
    println!("{pretty}");
    output::print_merge_summary(&merged.summary);
    Ok(())
}

/// Handles the `helpers` subcommand.
fn handle_helpers() {
    for name in HelperRegistry::with_builtins().names() {
        println!("{name}");
    }
}
