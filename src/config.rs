//! Run parameters.
//!
//! The three paths a run needs can come from the command line, from a YAML
//! file, or from both; command-line values win.
//!
//! ```yaml
//! source_dir: target/cucumber
//! output_dir: target/report
//! template_file: templates/report.hbs
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::diagnostics::ReportError;

/// File name of the rendered report inside the output directory.
pub const REPORT_FILE_NAME: &str = "report.html";

/// Fully resolved parameters of a report run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub template_file: PathBuf,
}

impl ReportConfig {
    pub fn new(
        source_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        template_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            template_file: template_file.into(),
        }
    }

    /// Path the report is written to.
    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(REPORT_FILE_NAME)
    }
}

/// Possibly incomplete parameters, as read from one source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    #[serde(default)]
    pub source_dir: Option<PathBuf>,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub template_file: Option<PathBuf>,
}

impl PartialConfig {
    /// Reads a YAML config file. Relative paths inside it are taken relative
    /// to the file's own directory.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ReportError> {
        let text = std::fs::read_to_string(path).map_err(|e| ReportError::Config {
            message: format!("cannot read config file {}", path.display()),
            source: Some(Box::new(e)),
        })?;
        let parsed: PartialConfig = serde_yaml::from_str(&text).map_err(|e| ReportError::Config {
            message: format!("invalid config file {}", path.display()),
            source: Some(Box::new(e)),
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let anchor = |p: Option<PathBuf>| p.map(|p| if p.is_relative() { base.join(p) } else { p });
        Ok(Self {
            source_dir: anchor(parsed.source_dir),
            output_dir: anchor(parsed.output_dir),
            template_file: anchor(parsed.template_file),
        })
    }

    /// Fills the gaps in `self` from `fallback`.
    pub fn or(self, fallback: PartialConfig) -> Self {
        Self {
            source_dir: self.source_dir.or(fallback.source_dir),
            output_dir: self.output_dir.or(fallback.output_dir),
            template_file: self.template_file.or(fallback.template_file),
        }
    }

    /// Source directory alone, for commands that only merge.
    pub fn require_source_dir(&self) -> Result<PathBuf, ReportError> {
        self.source_dir
            .clone()
            .ok_or_else(|| missing("source directory", "--source", "source_dir"))
    }

    /// Turns the parameters into a complete [`ReportConfig`].
    pub fn resolve(self) -> Result<ReportConfig, ReportError> {
        let source_dir = self.require_source_dir()?;
        let output_dir = self
            .output_dir
            .ok_or_else(|| missing("output directory", "--output", "output_dir"))?;
        let template_file = self
            .template_file
            .ok_or_else(|| missing("template file", "--template", "template_file"))?;
        Ok(ReportConfig {
            source_dir,
            output_dir,
            template_file,
        })
    }
}

fn missing(what: &str, flag: &str, key: &str) -> ReportError {
    ReportError::config(format!(
        "no {what} given; pass {flag} or set `{key}` in the config file"
    ))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn command_line_values_override_file_values() {
        let cli = PartialConfig {
            source_dir: Some(PathBuf::from("cli-json")),
            ..Default::default()
        };
        let file = PartialConfig {
            source_dir: Some(PathBuf::from("file-json")),
            output_dir: Some(PathBuf::from("file-out")),
            template_file: Some(PathBuf::from("file.hbs")),
        };

        let config = cli.or(file).resolve().unwrap();
        assert_eq!(config, ReportConfig::new("cli-json", "file-out", "file.hbs"));
        assert_eq!(config.report_path(), PathBuf::from("file-out").join("report.html"));
    }

    #[test]
    fn missing_parameter_names_flag_and_key() {
        let err = PartialConfig {
            source_dir: Some(PathBuf::from("json")),
            output_dir: Some(PathBuf::from("out")),
            template_file: None,
        }
        .resolve()
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("--template"), "{message}");
        assert!(message.contains("template_file"), "{message}");
    }

    #[test]
    fn yaml_paths_resolve_against_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.yaml");
        fs::write(
            &path,
            "source_dir: results\noutput_dir: /abs/out\ntemplate_file: tpl/report.hbs\n",
        )
        .unwrap();

        let partial = PartialConfig::from_yaml_file(&path).unwrap();
        assert_eq!(partial.source_dir, Some(dir.path().join("results")));
        assert_eq!(partial.output_dir, Some(PathBuf::from("/abs/out")));
        assert_eq!(partial.template_file, Some(dir.path().join("tpl/report.hbs")));
    }

    #[test]
    fn unknown_yaml_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.yaml");
        fs::write(&path, "source: results\n").unwrap();

        assert!(matches!(
            PartialConfig::from_yaml_file(&path),
            Err(ReportError::Config { source: Some(_), .. })
        ));
    }
}
