//! Pipeline progress events and the sinks that receive them.
//!
//! The pipeline never prints. It reports what it is doing through an
//! [`EventSink`], which keeps the core testable and lets the CLI decide how
//! (and whether) to show progress.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::merge::{FileOutcomeKind, MergeSummary};

/// A single observable step of a report run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    TemplateLocated {
        path: PathBuf,
    },
    InputsDiscovered {
        source_dir: PathBuf,
        files: Vec<PathBuf>,
    },
    HelpersRegistered {
        names: Vec<&'static str>,
    },
    FileMerged {
        path: PathBuf,
        outcome: FileOutcomeKind,
        records: usize,
        detail: Option<String>,
    },
    MergeCompleted {
        summary: MergeSummary,
    },
    DocumentDecoded {
        keys: usize,
    },
    PartialRegistered {
        name: String,
    },
    PartialSkipped {
        name: String,
        reason: String,
    },
    TemplateCompiled {
        name: String,
    },
    EmbeddedContent {
        chars: usize,
    },
    ReportRendered {
        bytes: usize,
    },
    ReportWritten {
        path: PathBuf,
    },
}

impl PipelineEvent {
    /// Whether the event points at a problem the user should see even in
    /// quiet mode.
    pub fn is_warning(&self) -> bool {
        match self {
            PipelineEvent::FileMerged { outcome, .. } => *outcome != FileOutcomeKind::Accepted,
            PipelineEvent::PartialSkipped { .. } => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineEvent::TemplateLocated { path } => {
                write!(f, "template file exists: {}", path.display())
            }
            PipelineEvent::InputsDiscovered { source_dir, files } => write!(
                f,
                "found {} JSON report file(s) in {}",
                files.len(),
                source_dir.display()
            ),
            PipelineEvent::HelpersRegistered { names } => {
                write!(f, "registered helpers: {}", names.join(", "))
            }
            PipelineEvent::FileMerged {
                path,
                outcome,
                records,
                detail,
            } => {
                write!(f, "{}: {}", path.display(), outcome)?;
                if *outcome == FileOutcomeKind::Accepted {
                    write!(f, " ({records} record(s))")?;
                }
                if let Some(detail) = detail {
                    write!(f, " ({detail})")?;
                }
                Ok(())
            }
            PipelineEvent::MergeCompleted { summary } => write!(f, "merged {summary}"),
            PipelineEvent::DocumentDecoded { keys } => {
                write!(f, "data context ready ({keys} top-level key(s))")
            }
            PipelineEvent::PartialRegistered { name } => write!(f, "partial registered: {name}"),
            PipelineEvent::PartialSkipped { name, reason } => {
                write!(f, "partial skipped: {name} ({reason})")
            }
            PipelineEvent::TemplateCompiled { name } => write!(f, "template compiled: {name}"),
            PipelineEvent::EmbeddedContent { chars } => {
                write!(f, "embedded {chars} character(s) of inline content")
            }
            PipelineEvent::ReportRendered { bytes } => {
                write!(f, "template converted to report ({bytes} bytes)")
            }
            PipelineEvent::ReportWritten { path } => {
                write!(f, "report written to file: {}", path.display())
            }
        }
    }
}

/// Receiver of pipeline events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &PipelineEvent);
}

/// Shared handle to a sink; helpers registered in the template engine hold
/// one too.
pub type SharedSink = Arc<dyn EventSink>;

/// Discards every event.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &PipelineEvent) {}
}

/// Collects events in memory, for tests and programmatic callers.
#[derive(Default)]
pub struct EventBuffer {
    events: Mutex<Vec<PipelineEvent>>,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything emitted so far.
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl EventSink for EventBuffer {
    fn emit(&self, event: &PipelineEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
    }
}
