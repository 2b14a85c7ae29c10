//! Merging of JSON result files into one document.
//!
//! Every input file is expected to hold a top-level array of feature
//! records. Arrays are concatenated in file order, then element order, into
//! `{"features": [...]}`. Files that are not arrays, or not JSON at all, are
//! skipped without failing the run; each file's [`FileOutcome`] records what
//! happened to it.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use crate::diagnostics::ReportError;
use crate::events::{EventSink, PipelineEvent};

/// Key of the single top-level field of the merged document.
pub const FEATURES_KEY: &str = "features";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// What the merger did with one input file.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Accepted(Vec<Value>),
    SkippedNotArray,
    SkippedParseError(String),
}

impl FileOutcome {
    pub fn kind(&self) -> FileOutcomeKind {
        match self {
            FileOutcome::Accepted(_) => FileOutcomeKind::Accepted,
            FileOutcome::SkippedNotArray => FileOutcomeKind::SkippedNotArray,
            FileOutcome::SkippedParseError(_) => FileOutcomeKind::SkippedParseError,
        }
    }
}

/// Payload-free tag of a [`FileOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileOutcomeKind {
    Accepted,
    SkippedNotArray,
    SkippedParseError,
}

impl std::fmt::Display for FileOutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            FileOutcomeKind::Accepted => "accepted",
            FileOutcomeKind::SkippedNotArray => "skipped, top-level value is not an array",
            FileOutcomeKind::SkippedParseError => "skipped, not valid JSON",
        };
        f.write_str(text)
    }
}

/// Per-outcome counts of a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub accepted: usize,
    pub skipped_not_array: usize,
    pub skipped_parse_error: usize,
    pub records: usize,
}

impl MergeSummary {
    pub fn files(&self) -> usize {
        self.accepted + self.skipped_not_array + self.skipped_parse_error
    }

    fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Accepted(records) => {
                self.accepted += 1;
                self.records += records.len();
            }
            FileOutcome::SkippedNotArray => self.skipped_not_array += 1,
            FileOutcome::SkippedParseError(_) => self.skipped_parse_error += 1,
        }
    }
}

impl std::fmt::Display for MergeSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} record(s) from {} file(s): {} accepted, {} not an array, {} unparsable",
            self.records,
            self.files(),
            self.accepted,
            self.skipped_not_array,
            self.skipped_parse_error
        )
    }
}

/// Result of [`merge`].
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// JSON text of `{"features": [...]}`.
    pub document: String,
    /// Outcome of each input file, in processing order.
    pub outcomes: Vec<(PathBuf, FileOutcomeKind)>,
    pub summary: MergeSummary,
}

/// Classifies the raw bytes of one input file.
pub fn classify(bytes: &[u8]) -> FileOutcome {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Array(records)) => FileOutcome::Accepted(records),
        Ok(_) => FileOutcome::SkippedNotArray,
        Err(e) => FileOutcome::SkippedParseError(e.to_string()),
    }
}

/// Merges `files`, in the order given, into a single features document.
///
/// A file that cannot be read aborts the merge with
/// [`ReportError::MergeFailed`]; nothing is returned for a partial merge.
pub fn merge<P: AsRef<Path>>(files: &[P], sink: &dyn EventSink) -> Result<MergeResult, ReportError> {
    let mut all_features = Vec::new();
    let mut outcomes = Vec::with_capacity(files.len());
    let mut summary = MergeSummary::default();

    for file in files {
        let path = file.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ReportError::MergeFailed {
            path: path.to_path_buf(),
            source,
        })?;

        let outcome = classify(&bytes);
        summary.record(&outcome);
        let kind = outcome.kind();
        let (records, detail) = match outcome {
            FileOutcome::Accepted(records) => {
                let count = records.len();
                all_features.extend(records);
                (count, None)
            }
            FileOutcome::SkippedNotArray => (0, None),
            FileOutcome::SkippedParseError(cause) => (0, Some(cause)),
        };
        sink.emit(&PipelineEvent::FileMerged {
            path: path.to_path_buf(),
            outcome: kind,
            records,
            detail,
        });
        outcomes.push((path.to_path_buf(), kind));
    }

    sink.emit(&PipelineEvent::MergeCompleted { summary });

    let document = json!({ FEATURES_KEY: all_features }).to_string();
    Ok(MergeResult {
        document,
        outcomes,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::events::{EventBuffer, NullSink};

    fn write_files(dir: &Path, files: &[(&str, &str)]) -> Vec<PathBuf> {
        files
            .iter()
            .map(|(name, content)| {
                let path = dir.join(name);
                fs::write(&path, content).unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn concatenates_arrays_in_file_then_element_order() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_files(
            dir.path(),
            &[
                ("a.json", r#"[{"name":"A1"},{"name":"A2"}]"#),
                ("b.json", r#"[{"name":"B1"}]"#),
            ],
        );

        let result = merge(&files, &NullSink).unwrap();
        assert_eq!(
            result.document,
            r#"{"features":[{"name":"A1"},{"name":"A2"},{"name":"B1"}]}"#
        );
        assert_eq!(result.summary.records, 3);
        assert_eq!(result.summary.accepted, 2);
    }

    #[test]
    fn skips_objects_scalars_and_broken_json() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_files(
            dir.path(),
            &[
                ("1.json", r#"{"features":[{"name":"X"}]}"#),
                ("2.json", "42"),
                ("3.json", r#"[{"name":"kept"}]"#),
                ("4.json", "[{\"name\": "),
                ("5.json", ""),
            ],
        );

        let result = merge(&files, &NullSink).unwrap();
        assert_eq!(result.document, r#"{"features":[{"name":"kept"}]}"#);
        assert_eq!(
            result.summary,
            MergeSummary {
                accepted: 1,
                skipped_not_array: 2,
                skipped_parse_error: 2,
                records: 1,
            }
        );
        let kinds: Vec<_> = result.outcomes.iter().map(|(_, kind)| *kind).collect();
        assert_eq!(
            kinds,
            vec![
                FileOutcomeKind::SkippedNotArray,
                FileOutcomeKind::SkippedNotArray,
                FileOutcomeKind::Accepted,
                FileOutcomeKind::SkippedParseError,
                FileOutcomeKind::SkippedParseError,
            ]
        );
    }

    #[test]
    fn empty_input_still_has_features_key() {
        let files: Vec<PathBuf> = Vec::new();
        let result = merge(&files, &NullSink).unwrap();
        assert_eq!(result.document, r#"{"features":[]}"#);
        assert_eq!(result.summary.files(), 0);
    }

    #[test]
    fn unreadable_file_aborts_the_merge() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = write_files(dir.path(), &[("a.json", "[1]")]);
        files.push(dir.path().join("vanished.json"));

        let err = merge(&files, &NullSink).unwrap_err();
        match err {
            ReportError::MergeFailed { path, .. } => assert!(path.ends_with("vanished.json")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn tolerates_byte_order_mark_and_keeps_key_order() {
        let outcome = classify(b"\xEF\xBB\xBF[{\"z\":1,\"a\":2}]");
        let FileOutcome::Accepted(records) = outcome else {
            panic!("expected the file to be accepted");
        };
        assert_eq!(records[0].to_string(), r#"{"z":1,"a":2}"#);
    }

    #[test]
    fn invalid_utf8_is_a_parse_error_not_an_io_error() {
        assert!(matches!(
            classify(b"[\"\xFF\"]"),
            FileOutcome::SkippedParseError(_)
        ));
    }

    #[test]
    fn reports_each_file_to_the_sink() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_files(dir.path(), &[("a.json", "[1,2]"), ("b.json", "nope")]);
        let sink = EventBuffer::new();

        merge(&files, &sink).unwrap();

        let events = sink.events();
        assert_eq!(events.len(), 3);
        assert!(matches!(
            &events[0],
            PipelineEvent::FileMerged { outcome: FileOutcomeKind::Accepted, records: 2, .. }
        ));
        assert!(matches!(
            &events[1],
            PipelineEvent::FileMerged { outcome: FileOutcomeKind::SkippedParseError, detail: Some(_), .. }
        ));
        assert!(matches!(&events[2], PipelineEvent::MergeCompleted { .. }));
    }
}
