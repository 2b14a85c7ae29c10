//! Shared fixtures for the report integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use feature_report::ReportConfig;
use tempfile::TempDir;

/// A scratch layout with `json/`, `templates/` and an `out/` target.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("json")).unwrap();
        fs::create_dir_all(dir.path().join("templates")).unwrap();
        Self { dir }
    }

    pub fn source_dir(&self) -> PathBuf {
        self.dir.path().join("json")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    pub fn template_path(&self) -> PathBuf {
        self.dir.path().join("templates").join("report.hbs")
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir().join("report.html")
    }

    pub fn write_result(&self, name: &str, content: &str) -> &Self {
        fs::write(self.source_dir().join(name), content).unwrap();
        self
    }

    pub fn write_template(&self, content: &str) -> &Self {
        fs::write(self.template_path(), content).unwrap();
        self
    }

    pub fn write_partial(&self, name: &str, content: &str) -> &Self {
        let path = self.dir.path().join("templates").join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
        self
    }

    pub fn config(&self) -> ReportConfig {
        ReportConfig::new(self.source_dir(), self.output_dir(), self.template_path())
    }

    pub fn read_report(&self) -> String {
        read(&self.report_path())
    }
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}
