//! Handlebars-based template engine for one report run.
//!
//! Before compiling, each template source gets two adjustments:
//!
//! - `<path>.length` is rewritten to the built-in `len` helper, because the
//!   engine cannot index an array by `length`. `{{features.length}}` becomes
//!   `{{len features}}` and `{{#if features.length}}` becomes
//!   `{{#if (len features)}}`.
//! - `{{> name}}` references are followed so that only partials the template
//!   actually uses are loaded, each from `<template dir>/<name>`.

use std::borrow::Cow;
use std::collections::{BTreeSet, VecDeque};
use std::path::Path;

use handlebars::{Context, Handlebars};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Value};

use crate::diagnostics::ReportError;
use crate::events::{PipelineEvent, SharedSink};
use crate::helpers::HelperRegistry;

static MUSTACHE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\{?[^{}]*\}?\}\}").expect("mustache pattern is valid"));

static LENGTH_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z_@.][\w./@-]*\.length").expect("length path pattern is valid")
});

static PARTIAL_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\{\{~?\s*#?>\s*["']?([^\s}~()"']+)"#).expect("partial pattern is valid")
});

/// A compiled report template with its partials and helpers.
pub struct ReportTemplate {
    engine: Handlebars<'static>,
    name: String,
}

impl std::fmt::Debug for ReportTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportTemplate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl ReportTemplate {
    /// Compiles `template_file` for rendering.
    ///
    /// The template is registered under its file name. Partials it references,
    /// directly or through other partials, are registered under the exact
    /// name used in the reference, resolved against the template's directory;
    /// no suffix is ever appended. A referenced partial that cannot be read or
    /// compiled is skipped with an event, and rendering then fails on it.
    /// Only the main template failing to compile is an error here.
    pub fn compile(
        template_file: &Path,
        helpers: &HelperRegistry,
        sink: &SharedSink,
    ) -> Result<Self, ReportError> {
        let name = template_name(template_file);
        let base_dir = template_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut engine = Handlebars::new();
        helpers.install(&mut engine, sink);

        let source = std::fs::read_to_string(template_file).map_err(|_| {
            ReportError::TemplateNotFound {
                path: template_file.to_path_buf(),
            }
        })?;
        let source = expand_length(&source).into_owned();
        let mut pending: VecDeque<String> = partial_references(&source).collect();
        engine
            .register_template_string(&name, source)
            .map_err(|e| ReportError::TemplateCompile {
                template: name.clone(),
                source: Box::new(e),
            })?;

        let mut seen = BTreeSet::from([name.clone()]);
        while let Some(partial) = pending.pop_front() {
            if !seen.insert(partial.clone()) {
                continue;
            }
            let loaded = std::fs::read_to_string(base_dir.join(&partial))
                .map_err(|e| e.to_string())
                .and_then(|text| {
                    let text = expand_length(&text).into_owned();
                    pending.extend(partial_references(&text));
                    engine
                        .register_template_string(&partial, text)
                        .map_err(|e| e.to_string())
                });
            let event = match loaded {
                Ok(()) => PipelineEvent::PartialRegistered { name: partial },
                Err(reason) => PipelineEvent::PartialSkipped {
                    name: partial,
                    reason,
                },
            };
            sink.emit(&event);
        }

        sink.emit(&PipelineEvent::TemplateCompiled { name: name.clone() });
        Ok(Self { engine, name })
    }

    /// Renders the template with `data` as the root context.
    pub fn apply(&self, data: Map<String, Value>) -> Result<String, ReportError> {
        let context = Context::from(Value::Object(data));
        self.engine
            .render_with_context(&self.name, &context)
            .map_err(|e| ReportError::Render {
                template: self.name.clone(),
                source: Box::new(e),
            })
    }
}

fn template_name(template_file: &Path) -> String {
    template_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| template_file.display().to_string())
}

/// Names of the static partials `source` includes, in order of appearance.
fn partial_references(source: &str) -> impl Iterator<Item = String> + '_ {
    PARTIAL_REF
        .captures_iter(source)
        .map(|caps| caps[1].to_string())
}

/// Rewrites every `<path>.length` in `source` to a `len` call.
fn expand_length(source: &str) -> Cow<'_, str> {
    if !source.contains(".length") {
        return Cow::Borrowed(source);
    }
    MUSTACHE.replace_all(source, |caps: &Captures| rewrite_tag(&caps[0]))
}

fn rewrite_tag(tag: &str) -> String {
    let open = if tag.starts_with("{{{") { 3 } else { 2 };
    let close = if tag.ends_with("}}}") && open == 3 { 3 } else { 2 };
    if tag.len() < open + close {
        return tag.to_string();
    }
    let body = &tag[open..tag.len() - close];

    let lead = body.len()
        - body
            .trim_start_matches(|c: char| c == '~' || c == '&' || c.is_whitespace())
            .len();
    let trail = body.len()
        - body
            .trim_end_matches(|c: char| c == '~' || c.is_whitespace())
            .len();
    if lead + trail >= body.len() || body[lead..].starts_with('!') {
        return tag.to_string();
    }
    let inner = &body[lead..body.len() - trail];

    // `{{features.length}}` has no helper to take a subexpression.
    let rewritten = match LENGTH_PATH.find(inner) {
        Some(m) if m.start() == 0 && m.end() == inner.len() => {
            format!("len {}", length_target(m.as_str()))
        }
        _ => rewrite_params(inner),
    };
    format!(
        "{}{}{}{}{}",
        &tag[..open],
        &body[..lead],
        rewritten,
        &body[body.len() - trail..],
        &tag[tag.len() - close..]
    )
}

/// Replaces `.length` paths used as helper parameters with `(len <path>)`.
fn rewrite_params(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len() + 8);
    let mut last = 0;
    for m in LENGTH_PATH.find_iter(inner) {
        let before = inner[..m.start()].chars().next_back();
        let after = inner[m.end()..].chars().next();
        let starts_token = before.map_or(true, |c| c.is_whitespace() || c == '(' || c == '=');
        let ends_token = after.map_or(true, |c| c.is_whitespace() || c == ')');
        if !(starts_token && ends_token) {
            continue;
        }
        out.push_str(&inner[last..m.start()]);
        out.push_str("(len ");
        out.push_str(length_target(m.as_str()));
        out.push(')');
        last = m.end();
    }
    out.push_str(&inner[last..]);
    out
}

fn length_target(path: &str) -> &str {
    &path[..path.len() - ".length".len()]
}
