//! Error types for the report pipeline.
//!
//! Every fatal failure of a run is a [`ReportError`]. Its message names the
//! pipeline stage that failed and its `#[source]` keeps the underlying cause,
//! so a `miette` report shows both. Failures raised inside template helpers
//! are [`HelperError`]s; they travel through the template engine as nested
//! render errors and surface as [`ReportError::Render`].

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Coarse classification of a [`ReportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Missing or invalid run parameters, detected before any processing.
    Configuration,
    /// Reading an input file or writing the report failed.
    Io,
    /// Template compilation or application failed.
    Render,
    /// An invariant of the pipeline itself was broken.
    Internal,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Configuration => "Configuration",
            ErrorType::Io => "Io",
            ErrorType::Render => "Render",
            ErrorType::Internal => "Internal",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Failure of a single helper invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum HelperError {
    #[error("helper `{helper}` expected {expected}, found {found}")]
    #[diagnostic(code(feature_report::helper::type_mismatch))]
    TypeMismatch {
        helper: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    #[error("helper `{helper}` expects {expected} argument(s), got {found}")]
    #[diagnostic(code(feature_report::helper::arity))]
    Arity {
        helper: &'static str,
        expected: &'static str,
        found: usize,
    },
}

/// Fatal error of a report run.
#[derive(Debug, Error, Diagnostic)]
pub enum ReportError {
    #[error("Template File Not Found: {}", path.display())]
    #[diagnostic(
        code(feature_report::template_not_found),
        help("the template must be an existing regular file")
    )]
    TemplateNotFound { path: PathBuf },

    #[error("Source directory not found: {}", path.display())]
    #[diagnostic(
        code(feature_report::source_dir_not_found),
        help("point --source at the directory holding the JSON result files")
    )]
    SourceDirNotFound { path: PathBuf },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(feature_report::config))]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },

    #[error("Failed to list input directory {}", path.display())]
    #[diagnostic(code(feature_report::discovery))]
    Discovery {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Error in reading JSON result file {}", path.display())]
    #[diagnostic(code(feature_report::merge_failed))]
    MergeFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Merged document is not a JSON object: {message}")]
    #[diagnostic(code(feature_report::invalid_document))]
    InvalidDocument {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("Failed to compile template `{template}`")]
    #[diagnostic(
        code(feature_report::template_compile),
        help("check the template syntax and that every partial exists next to the template")
    )]
    TemplateCompile {
        template: String,
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    #[error("Failed to render template `{template}`")]
    #[diagnostic(code(feature_report::render))]
    Render {
        template: String,
        #[source]
        source: Box<handlebars::RenderError>,
    },

    #[error("Error in creating report {}", path.display())]
    #[diagnostic(code(feature_report::report_write))]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReportError {
    /// Builds a [`ReportError::Config`] without an underlying cause.
    pub fn config(message: impl Into<String>) -> Self {
        ReportError::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Returns the classification of this error.
    pub fn error_type(&self) -> ErrorType {
        match self {
            ReportError::TemplateNotFound { .. }
            | ReportError::SourceDirNotFound { .. }
            | ReportError::Config { .. } => ErrorType::Configuration,
            ReportError::Discovery { .. }
            | ReportError::MergeFailed { .. }
            | ReportError::ReportWrite { .. } => ErrorType::Io,
            ReportError::TemplateCompile { .. } | ReportError::Render { .. } => ErrorType::Render,
            ReportError::InvalidDocument { .. } => ErrorType::Internal,
        }
    }
}
