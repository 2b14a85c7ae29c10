use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::diagnostics::ReportError;

/// Lists the JSON result files directly inside `source_dir`.
///
/// Only files whose name ends in `.json` (any case) are returned; symbolic
/// links count when they point at a regular file. Subdirectories are not
/// searched. The list is sorted by file name, which
/// fixes the order of records in the merged document.
pub fn discover_report_files<P: AsRef<Path>>(source_dir: P) -> Result<Vec<PathBuf>, ReportError> {
    let source_dir = source_dir.as_ref();
    if !source_dir.is_dir() {
        return Err(ReportError::SourceDirNotFound {
            path: source_dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(source_dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| ReportError::Discovery {
            path: source_dir.to_path_buf(),
            source,
        })?;

        if !entry.path().is_file() {
            continue;
        }
        if !is_json_report(entry.path()) {
            continue;
        }
        files.push(entry.into_path());
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn is_json_report(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.to_ascii_lowercase().ends_with(".json"))
}
