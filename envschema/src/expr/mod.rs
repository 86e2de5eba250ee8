//! Type-expression engine
//!
//! Compiles textual field specs such as `"number.port"`,
//! `"'dev' | 'prod' = 'dev'"` or `"0 < number <= 100"` into native
//! validators. Compiled only with the `expr` feature.

mod keyword;
mod parse;

use crate::coerce::split_default;
use crate::error::ExpressionError;
use crate::issue::{describe_kind, describe_value, Issue};
use crate::validator::NativeValidator;
use parse::{Bound, Node};
use serde_json::Value;

/// A compiled type expression.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledType {
    source: String,
    node: Node,
    default: Option<Value>,
}

impl CompiledType {
    /// The expression this was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The inline default, if any
    pub fn inline_default(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

impl NativeValidator for CompiledType {
    fn check(&self, value: &Value) -> Result<Value, Vec<Issue>> {
        check(&self.node, value).map_err(|issue| vec![issue])
    }

    fn default_value(&self) -> Option<Value> {
        self.default.clone()
    }

    fn expected(&self) -> String {
        describe(&self.node)
    }
}

/// Compile an expression, including its optional `= <default>` clause.
///
/// ```rust
/// use envschema::expr;
/// use envschema::validator::NativeValidator;
/// use serde_json::json;
///
/// let port = expr::compile("number.port = 3000").unwrap();
/// assert_eq!(port.default_value(), Some(json!(3000)));
/// assert!(port.check(&json!(8080)).is_ok());
/// assert!(port.check(&json!(65536)).is_err());
/// ```
///
/// # Errors
///
/// [`ExpressionError`] for syntax errors, unknown keywords, or a default
/// that is not a literal of the declared type.
pub fn compile(expression: &str) -> Result<CompiledType, ExpressionError> {
    let (declared, default_text) = split_default(expression);
    let node = parse::parse(declared)?;

    let default = match default_text {
        None => None,
        Some(text) => {
            let value = parse_default(text)?;
            if let Err(issue) = check(&node, &value) {
                return Err(ExpressionError::InvalidDefault {
                    default: text.to_string(),
                    message: issue.message(),
                });
            }
            Some(value)
        }
    };

    Ok(CompiledType {
        source: expression.to_string(),
        node,
        default,
    })
}

fn parse_default(text: &str) -> Result<Value, ExpressionError> {
    if let Some(inner) = text
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
    {
        return Ok(Value::String(inner.to_string()));
    }
    serde_json::from_str(text).map_err(|_| ExpressionError::InvalidDefault {
        default: text.to_string(),
        message: "expected a quoted string, number, boolean or JSON literal".to_string(),
    })
}

fn check(node: &Node, value: &Value) -> Result<Value, Issue> {
    match node {
        Node::Keyword(keyword) => keyword.check(value).map(|()| value.clone()),
        Node::Literal(literal) => {
            if literal_matches(literal, value) {
                Ok(value.clone())
            } else {
                Err(Issue::type_mismatch(
                    describe_value(literal),
                    describe_value(value),
                ))
            }
        }
        Node::Bounded { inner, bounds } => {
            let value = check(inner, value)?;
            for bound in bounds {
                check_bound(bound, &value)?;
            }
            Ok(value)
        }
        Node::Union(branches) => branches
            .iter()
            .find_map(|branch| check(branch, value).ok())
            .ok_or_else(|| Issue::type_mismatch(describe(node), describe_value(value))),
        Node::Intersection(parts) => parts
            .iter()
            .try_fold(value.clone(), |current, part| check(part, &current)),
    }
}

fn literal_matches(literal: &Value, value: &Value) -> bool {
    match (literal.as_f64(), value.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => literal == value,
    }
}

fn check_bound(bound: &Bound, value: &Value) -> Result<(), Issue> {
    let (measured, constraint, actual) = match value {
        Value::Number(n) => {
            let n = n.as_f64().unwrap_or(f64::NAN);
            (
                n,
                format!("{} {}", bound.op.describe(), bound.limit),
                describe_value(value),
            )
        }
        Value::String(s) => {
            let len = s.chars().count();
            (
                len as f64,
                format!("{} length {}", bound.op.describe(), bound.limit),
                format!("length {len}"),
            )
        }
        _ => {
            return Err(Issue::type_mismatch(
                "a number or string",
                describe_kind(value),
            ))
        }
    };

    if bound.op.holds(measured, bound.limit) {
        Ok(())
    } else {
        Err(Issue::refinement(constraint, actual))
    }
}

fn describe(node: &Node) -> String {
    match node {
        Node::Keyword(keyword) => keyword.describe(),
        Node::Literal(literal) => describe_value(literal),
        Node::Bounded { inner, bounds } => {
            let constraints = bounds
                .iter()
                .map(|b| format!("{} {}", b.op.describe(), b.limit))
                .collect::<Vec<_>>()
                .join(" and ");
            format!("{} {}", describe(inner), constraints)
        }
        Node::Union(branches) => {
            let mut descriptions: Vec<String> = branches.iter().map(describe).collect();
            let last = descriptions.pop().unwrap_or_default();
            if descriptions.is_empty() {
                last
            } else {
                format!("{} or {}", descriptions.join(", "), last)
            }
        }
        Node::Intersection(parts) => parts
            .iter()
            .map(describe)
            .collect::<Vec<_>>()
            .join(" and "),
    }
}
