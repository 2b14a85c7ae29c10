//! Handles all user-facing output for the CLI.
//!
//! Pipeline events are printed to stderr with `termcolor`, so stdout stays
//! free for data such as the merged document.

use std::io::Write;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::events::{EventSink, PipelineEvent};
use crate::merge::MergeSummary;
use crate::pipeline::RunSummary;

/// Prints pipeline events to stderr.
pub struct ConsoleSink {
    quiet: bool,
}

impl ConsoleSink {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl EventSink for ConsoleSink {
    fn emit(&self, event: &PipelineEvent) {
        let warning = event.is_warning();
        if self.quiet && !warning {
            return;
        }
        // Partials are registered by the dozen; only list them when something
        // went wrong with one.
        if matches!(event, PipelineEvent::PartialRegistered { .. }) {
            return;
        }
        let (label, color) = if warning {
            ("warning", Color::Yellow)
        } else {
            ("info", Color::Cyan)
        };
        print_labeled(label, color, &event.to_string());
    }
}

/// Prints the closing line of a successful render.
pub fn print_run_summary(summary: &RunSummary) {
    print_labeled(
        "done",
        Color::Green,
        &format!(
            "{} written ({} bytes, {})",
            summary.report_path.display(),
            summary.bytes_written,
            summary.merge
        ),
    );
}

/// Prints the merge counts after `merge`.
pub fn print_merge_summary(summary: &MergeSummary) {
    print_labeled("done", Color::Green, &format!("merged {summary}"));
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn print_labeled(label: &str, color: Color, message: &str) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    let _ = write!(stderr, "{label:>7}");
    let _ = stderr.reset();
    let _ = writeln!(stderr, " {message}");
}
