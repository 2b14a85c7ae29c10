//! # Template Helper Registry
//!
//! The fixed set of helpers a report template may call, and their bridge into
//! the `handlebars` engine.
//!
//! ## Module Structure
//!
//! - **`format`**: value-to-text helpers (`cleanid`, `duration`, `embedmime`)
//! - **`conditional`**: comparison and logic helpers (`eq`, `gt`, `and`, ...)
//!
//! Helpers are plain functions over `serde_json::Value`, so they can be tested
//! without the engine. A new [`HelperRegistry`] is built for every run and
//! installed into that run's engine instance.

use std::collections::BTreeMap;

use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext, RenderError,
    RenderErrorReason, Renderable, ScopedJson,
};
use serde_json::Value;

use crate::diagnostics::HelperError;
use crate::events::{PipelineEvent, SharedSink};

pub mod conditional;
pub mod format;

pub use conditional::Condition;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Signature of a value-to-text helper.
pub type FormatHelperFn = fn(value: &Value) -> Result<String, HelperError>;

/// A registered helper.
#[derive(Clone, Copy)]
pub enum ReportHelper {
    Format(FormatHelperFn),
    Conditional(Condition),
}

impl std::fmt::Debug for ReportHelper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportHelper::Format(_) => f.write_str("Format"),
            ReportHelper::Conditional(c) => write!(f, "Conditional({})", c.name()),
        }
    }
}

/// Name-to-helper table for one run.
#[derive(Debug, Clone, Default)]
pub struct HelperRegistry {
    helpers: BTreeMap<&'static str, ReportHelper>,
}

impl HelperRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in helper.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("cleanid", ReportHelper::Format(format::HELPER_CLEANID));
        registry.register("duration", ReportHelper::Format(format::HELPER_DURATION));
        registry.register("embedmime", ReportHelper::Format(format::HELPER_EMBEDMIME));
        for (name, condition) in Condition::ALL {
            registry.register(name, ReportHelper::Conditional(condition));
        }
        registry
    }

    pub fn register(&mut self, name: &'static str, helper: ReportHelper) {
        self.helpers.insert(name, helper);
    }

    /// Registered names in alphabetical order.
    pub fn names(&self) -> Vec<&'static str> {
        self.helpers.keys().copied().collect()
    }

    /// Installs every helper into `engine`. Existing helpers with the same
    /// names, including the engine's own `eq`/`and`/..., are replaced.
    pub fn install(&self, engine: &mut Handlebars<'_>, sink: &SharedSink) {
        for (&name, helper) in &self.helpers {
            match *helper {
                ReportHelper::Format(func) => engine.register_helper(
                    name,
                    Box::new(FormatHelper {
                        name,
                        func,
                        sink: sink.clone(),
                    }),
                ),
                ReportHelper::Conditional(condition) => {
                    engine.register_helper(name, Box::new(ConditionalHelper { condition }))
                }
            }
        }
    }
}

// ============================================================================
// ENGINE ADAPTERS
// ============================================================================

fn nested(err: HelperError) -> RenderError {
    RenderErrorReason::NestedError(Box::new(err)).into()
}

struct FormatHelper {
    name: &'static str,
    func: FormatHelperFn,
    sink: SharedSink,
}

impl HelperDef for FormatHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        let value = h.param(0).map(|p| p.value()).ok_or_else(|| {
            nested(HelperError::Arity {
                helper: self.name,
                expected: "1",
                found: 0,
            })
        })?;
        let text = (self.func)(value).map_err(nested)?;
        if self.name == "embedmime" {
            self.sink.emit(&PipelineEvent::EmbeddedContent {
                chars: text.chars().count(),
            });
        }
        Ok(ScopedJson::Derived(Value::String(text)))
    }
}

struct ConditionalHelper {
    condition: Condition,
}

impl ConditionalHelper {
    fn evaluate(&self, h: &Helper<'_>) -> Result<bool, RenderError> {
        let args: Vec<&Value> = h.params().iter().map(|p| p.value()).collect();
        self.condition.evaluate(&args).map_err(nested)
    }
}

impl HelperDef for ConditionalHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        Ok(ScopedJson::Derived(Value::Bool(self.evaluate(h)?)))
    }

    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let holds = self.evaluate(h)?;
        if !h.is_block() {
            out.write(if holds { "true" } else { "false" })?;
            return Ok(());
        }
        let branch = if holds { h.template() } else { h.inverse() };
        match branch {
            Some(template) => template.render(r, ctx, rc, out),
            None => Ok(()),
        }
    }
}
