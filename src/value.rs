//! Typed access to the dynamically typed data handed to the template.
//!
//! The merged document is bound as a `serde_json` value tree. Helpers pull
//! concrete types out of it through [`ValueExt`], which fails with
//! [`HelperError::TypeMismatch`] instead of coercing.

use serde_json::{Map, Value};

use crate::diagnostics::{HelperError, ReportError};

/// Type-checked accessors over [`serde_json::Value`].
pub trait ValueExt {
    /// Name of the runtime type, used in mismatch messages.
    fn type_name(&self) -> &'static str;

    /// Returns the contained text or a mismatch error attributed to `helper`.
    fn expect_str(&self, helper: &'static str) -> Result<&str, HelperError>;

    /// Returns the contained number as `f64` or a mismatch error.
    fn expect_number(&self, helper: &'static str) -> Result<f64, HelperError>;

    /// Handlebars truthiness: null, false, zero, empty text, empty list and
    /// empty mapping are falsy.
    fn is_truthy(&self) -> bool;
}

impl ValueExt for Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::Array(_) => "List",
            Value::Object(_) => "Map",
        }
    }

    fn expect_str(&self, helper: &'static str) -> Result<&str, HelperError> {
        self.as_str().ok_or_else(|| HelperError::TypeMismatch {
            helper,
            expected: "String",
            found: self.type_name(),
        })
    }

    fn expect_number(&self, helper: &'static str) -> Result<f64, HelperError> {
        self.as_f64().ok_or_else(|| HelperError::TypeMismatch {
            helper,
            expected: "Number",
            found: self.type_name(),
        })
    }

    fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(entries) => !entries.is_empty(),
        }
    }
}

/// Decodes merged document text into the root data context of the template.
///
/// The merger always produces an object, so any other shape here means the
/// pipeline itself is broken.
pub fn decode_document(text: &str) -> Result<Map<String, Value>, ReportError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ReportError::InvalidDocument {
            message: "merged text is not valid JSON".to_string(),
            source: Some(e),
        })?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ReportError::InvalidDocument {
            message: format!("expected a Map at the root, found {}", other.type_name()),
            source: None,
        }),
    }
}
