//! The merge-and-render pipeline.
//!
//! A run goes through eight stages in order and stops at the first failure:
//!
//! 1. validate the template path
//! 2. discover the JSON result files
//! 3. build the helper registry
//! 4. merge the files into one document
//! 5. decode the document into the template's data context
//! 6. compile the template and its partials
//! 7. apply the template to the data
//! 8. write the report
//!
//! Nothing is written until stage 7 has succeeded, so a failed run leaves any
//! previous report untouched.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::ReportConfig;
use crate::diagnostics::ReportError;
use crate::discovery::discover_report_files;
use crate::events::{NullSink, PipelineEvent, SharedSink};
use crate::helpers::HelperRegistry;
use crate::merge::{merge, MergeResult, MergeSummary};
use crate::template::ReportTemplate;
use crate::value::decode_document;

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub report_path: PathBuf,
    pub inputs: Vec<PathBuf>,
    pub merge: MergeSummary,
    pub bytes_written: usize,
}

/// One report run over a fixed configuration.
pub struct ReportPipeline {
    config: ReportConfig,
    sink: SharedSink,
}

impl ReportPipeline {
    /// A pipeline that reports progress nowhere.
    pub fn new(config: ReportConfig) -> Self {
        Self::with_sink(config, Arc::new(NullSink))
    }

    pub fn with_sink(config: ReportConfig, sink: SharedSink) -> Self {
        Self { config, sink }
    }

    /// Runs every stage and returns a summary of the written report.
    pub fn run(&self) -> Result<RunSummary, ReportError> {
        self.validate_template()?;
        let inputs = self.discover_inputs()?;
        let helpers = self.build_helpers();
        let merged = self.merge(&inputs)?;

        let data = decode_document(&merged.document)?;
        self.sink.emit(&PipelineEvent::DocumentDecoded { keys: data.len() });

        let template = ReportTemplate::compile(&self.config.template_file, &helpers, &self.sink)?;
        let report = template.apply(data)?;
        self.sink.emit(&PipelineEvent::ReportRendered {
            bytes: report.len(),
        });

        let report_path = self.persist(&report)?;
        Ok(RunSummary {
            report_path,
            inputs,
            merge: merged.summary,
            bytes_written: report.len(),
        })
    }

    /// The template must exist and must not be a directory.
    pub fn validate_template(&self) -> Result<(), ReportError> {
        let path = &self.config.template_file;
        if !path.exists() || path.is_dir() {
            return Err(ReportError::TemplateNotFound { path: path.clone() });
        }
        self.sink
            .emit(&PipelineEvent::TemplateLocated { path: path.clone() });
        Ok(())
    }

    /// Lists the input files in merge order.
    pub fn discover_inputs(&self) -> Result<Vec<PathBuf>, ReportError> {
        let files = discover_report_files(&self.config.source_dir)?;
        self.sink.emit(&PipelineEvent::InputsDiscovered {
            source_dir: self.config.source_dir.clone(),
            files: files.clone(),
        });
        Ok(files)
    }

    /// Builds this run's helper registry.
    pub fn build_helpers(&self) -> HelperRegistry {
        let helpers = HelperRegistry::with_builtins();
        self.sink.emit(&PipelineEvent::HelpersRegistered {
            names: helpers.names(),
        });
        helpers
    }

    /// Merges `inputs` into the features document.
    pub fn merge(&self, inputs: &[PathBuf]) -> Result<MergeResult, ReportError> {
        merge(inputs, &*self.sink)
    }

    /// Writes the rendered report, replacing any previous one.
    pub fn persist(&self, report: &str) -> Result<PathBuf, ReportError> {
        let output_dir = &self.config.output_dir;
        std::fs::create_dir_all(output_dir).map_err(|source| ReportError::ReportWrite {
            path: output_dir.clone(),
            source,
        })?;

        let report_path = self.config.report_path();
        write_report(&report_path, report)?;
        self.sink.emit(&PipelineEvent::ReportWritten {
            path: report_path.clone(),
        });
        Ok(report_path)
    }
}

fn write_report(path: &Path, report: &str) -> Result<(), ReportError> {
    std::fs::write(path, report).map_err(|source| ReportError::ReportWrite {
        path: path.to_path_buf(),
        source,
    })
}
