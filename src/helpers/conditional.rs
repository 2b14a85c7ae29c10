//! # Conditional Helpers
//!
//! Comparison and logic helpers usable in three forms:
//!
//! - block: `{{#eq status "passed"}}ok{{else}}failed{{/eq}}`
//! - subexpression: `{{#if (gt count 0)}}...{{/if}}`
//! - inline: `{{eq a b}}` writes `true` or `false`
//!
//! ## Helpers Provided
//!
//! - **Comparison**: `eq`, `neq` (alias `ne`), `gt`, `gte`, `lt`, `lte`
//! - **Logic**: `and`, `or`, `not`

use std::cmp::Ordering;

use serde_json::Value;

use crate::diagnostics::HelperError;
use crate::value::ValueExt;

/// One of the fixed comparison or logic relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    And,
    Or,
    Not,
}

impl Condition {
    /// Every condition with the name it is registered under.
    pub const ALL: [(&'static str, Condition); 10] = [
        ("eq", Condition::Eq),
        ("neq", Condition::Neq),
        ("ne", Condition::Neq),
        ("gt", Condition::Gt),
        ("gte", Condition::Gte),
        ("lt", Condition::Lt),
        ("lte", Condition::Lte),
        ("and", Condition::And),
        ("or", Condition::Or),
        ("not", Condition::Not),
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Condition::Eq => "eq",
            Condition::Neq => "neq",
            Condition::Gt => "gt",
            Condition::Gte => "gte",
            Condition::Lt => "lt",
            Condition::Lte => "lte",
            Condition::And => "and",
            Condition::Or => "or",
            Condition::Not => "not",
        }
    }

    /// Evaluates the relation over `args`.
    ///
    /// Comparisons take exactly two values; logic relations take one or more.
    pub fn evaluate(&self, args: &[&Value]) -> Result<bool, HelperError> {
        match self {
            Condition::Eq => binary(self.name(), args).map(|(a, b)| values_equal(a, b)),
            Condition::Neq => binary(self.name(), args).map(|(a, b)| !values_equal(a, b)),
            Condition::Gt => self.ordered(args, |o| o == Ordering::Greater),
            Condition::Gte => self.ordered(args, |o| o != Ordering::Less),
            Condition::Lt => self.ordered(args, |o| o == Ordering::Less),
            Condition::Lte => self.ordered(args, |o| o != Ordering::Greater),
            Condition::And => variadic(self.name(), args).map(|v| v.iter().all(|a| a.is_truthy())),
            Condition::Or => variadic(self.name(), args).map(|v| v.iter().any(|a| a.is_truthy())),
            Condition::Not => variadic(self.name(), args).map(|v| v.iter().all(|a| !a.is_truthy())),
        }
    }

    fn ordered(&self, args: &[&Value], test: impl Fn(Ordering) -> bool) -> Result<bool, HelperError> {
        let (a, b) = binary(self.name(), args)?;
        compare(self.name(), a, b).map(test)
    }
}

fn binary<'a>(helper: &'static str, args: &[&'a Value]) -> Result<(&'a Value, &'a Value), HelperError> {
    match args {
        [a, b] => Ok((*a, *b)),
        _ => Err(HelperError::Arity {
            helper,
            expected: "2",
            found: args.len(),
        }),
    }
}

fn variadic<'a, 'b>(
    helper: &'static str,
    args: &'b [&'a Value],
) -> Result<&'b [&'a Value], HelperError> {
    if args.is_empty() {
        return Err(HelperError::Arity {
            helper,
            expected: "at least 1",
            found: 0,
        });
    }
    Ok(args)
}

/// Numbers compare by value so that `1` equals `1.0`; everything else
/// compares structurally.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn compare(helper: &'static str, a: &Value, b: &Value) -> Result<Ordering, HelperError> {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => {
            let x = a.expect_number(helper)?;
            let y = b.expect_number(helper)?;
            x.partial_cmp(&y).ok_or(HelperError::TypeMismatch {
                helper,
                expected: "comparable Number",
                found: "NaN",
            })
        }
        (Value::String(x), Value::String(y)) => Ok(x.cmp(y)),
        (Value::Number(_), other) | (Value::String(_), other) => {
            Err(HelperError::TypeMismatch {
                helper,
                expected: a.type_name(),
                found: other.type_name(),
            })
        }
        (other, _) => Err(HelperError::TypeMismatch {
            helper,
            expected: "Number or String",
            found: other.type_name(),
        }),
    }
}
