//! Merges Cucumber JSON result files into one `{"features": [...]}` document
//! and renders it through a Handlebars template into a single HTML report.
//!
//! The entry point is [`ReportPipeline`]; the pieces it drives
//! ([`merge`](merge::merge), [`HelperRegistry`], [`ReportTemplate`]) are
//! public so they can be used and tested on their own.

pub use crate::config::{ReportConfig, REPORT_FILE_NAME};
pub use crate::diagnostics::{ErrorType, HelperError, ReportError};
pub use crate::events::{EventBuffer, EventSink, NullSink, PipelineEvent, SharedSink};
pub use crate::helpers::HelperRegistry;
pub use crate::pipeline::{ReportPipeline, RunSummary};
pub use crate::template::ReportTemplate;

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod discovery;
pub mod events;
pub mod helpers;
pub mod merge;
pub mod pipeline;
pub mod template;
pub mod value;
