//! Validator protocols accepted as field specs
//!
//! Two closed protocols are supported:
//!
//! - [`NativeValidator`]: returns either the validated value or a list of
//!   [`Issue`]s. Compiled type expressions implement this protocol.
//! - [`StandardValidator`]: the minimal cross-library `parse` interface,
//!   returning either a value or a list of [`StandardIssue`]s.
//!
//! Panics raised by a validator are not caught; only in-protocol failures
//! become issues.

use crate::issue::Issue;
use serde_json::Value;
use std::fmt;

/// A validator that produces the value or a list of issues.
pub trait NativeValidator: Send + Sync {
    /// Validate (and possibly transform) a present value.
    fn check(&self, value: &Value) -> Result<Value, Vec<Issue>>;

    /// Value used when the key is absent. `None` makes the key required.
    fn default_value(&self) -> Option<Value> {
        None
    }

    /// Description of the accepted shape, used in "was missing" issues.
    fn expected(&self) -> String {
        "defined".to_string()
    }
}

/// One issue reported by a [`StandardValidator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardIssue {
    /// Message as reported by the validator
    pub message: String,
    /// Path segments inside the value, outermost first
    pub path: Vec<String>,
}

impl StandardIssue {
    /// Create an issue at the root of the value
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
        }
    }

    /// Place the issue at `path` inside the value
    pub fn with_path<I>(mut self, path: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.path = path.into_iter().map(Into::into).collect();
        self
    }
}

/// Result of [`StandardValidator::parse`].
#[derive(Debug, Clone, PartialEq)]
pub enum StandardResult {
    /// The input was accepted; carries the output value
    Value(Value),
    /// The input was rejected
    Issues(Vec<StandardIssue>),
}

/// A third-party validator conforming to the standard `parse` interface.
///
/// Absent keys are passed as [`Value::Null`]; the validator decides whether
/// that is acceptable (and may return a default in its place).
pub trait StandardValidator: Send + Sync {
    /// Name of the library providing the validator
    fn vendor(&self) -> &str;

    /// Parse one input value.
    fn parse(&self, input: &Value) -> StandardResult;
}

/// Native validator built from a closure.
pub struct FnValidator<F> {
    expected: String,
    default: Option<Value>,
    check: F,
}

impl<F> FnValidator<F>
where
    F: Fn(&Value) -> Result<Value, Vec<Issue>> + Send + Sync,
{
    /// Use `value` when the key is absent
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

impl<F> NativeValidator for FnValidator<F>
where
    F: Fn(&Value) -> Result<Value, Vec<Issue>> + Send + Sync,
{
    fn check(&self, value: &Value) -> Result<Value, Vec<Issue>> {
        (self.check)(value)
    }

    fn default_value(&self) -> Option<Value> {
        self.default.clone()
    }

    fn expected(&self) -> String {
        self.expected.clone()
    }
}

impl<F> fmt::Debug for FnValidator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnValidator")
            .field("expected", &self.expected)
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}

/// Build a native validator from a closure.
///
/// `expected` describes the accepted shape for "was missing" issues.
///
/// ```rust
/// use envschema::{validator, Issue};
/// use envschema::validator::NativeValidator;
/// use serde_json::{json, Value};
///
/// let even = validator::native("an even number", |value: &Value| match value.as_i64() {
///     Some(n) if n % 2 == 0 => Ok(value.clone()),
///     _ => Err(vec![Issue::refinement("an even number", value.to_string())]),
/// });
/// assert!(even.check(&json!(4)).is_ok());
/// assert!(even.check(&json!(3)).is_err());
/// ```
pub fn native<F>(expected: impl Into<String>, check: F) -> FnValidator<F>
where
    F: Fn(&Value) -> Result<Value, Vec<Issue>> + Send + Sync,
{
    FnValidator {
        expected: expected.into(),
        default: None,
        check,
    }
}

/// Standard validator built from a closure.
pub struct FnStandard<F> {
    vendor: String,
    parse: F,
}

impl<F> StandardValidator for FnStandard<F>
where
    F: Fn(&Value) -> StandardResult + Send + Sync,
{
    fn vendor(&self) -> &str {
        &self.vendor
    }

    fn parse(&self, input: &Value) -> StandardResult {
        (self.parse)(input)
    }
}

impl<F> fmt::Debug for FnStandard<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnStandard")
            .field("vendor", &self.vendor)
            .finish_non_exhaustive()
    }
}

/// Build a standard validator from a closure.
pub fn standard<F>(vendor: impl Into<String>, parse: F) -> FnStandard<F>
where
    F: Fn(&Value) -> StandardResult + Send + Sync,
{
    FnStandard {
        vendor: vendor.into(),
        parse,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_native_closure_validator() {
        let v = native("a non-empty string", |value: &Value| match value.as_str() {
            Some(s) if !s.is_empty() => Ok(value.clone()),
            _ => Err(vec![Issue::custom("must not be empty")]),
        })
        .with_default("fallback");

        assert_eq!(v.check(&json!("x")).unwrap(), json!("x"));
        assert!(v.check(&json!("")).is_err());
        assert_eq!(v.default_value(), Some(json!("fallback")));
        assert_eq!(v.expected(), "a non-empty string");
    }

    #[test]
    fn test_standard_closure_validator() {
        let v = standard("test", |input: &Value| {
            if input.is_null() {
                StandardResult::Issues(vec![StandardIssue::new("Required")])
            } else {
                StandardResult::Value(input.clone())
            }
        });

        assert_eq!(v.vendor(), "test");
        assert_eq!(v.parse(&json!("a")), StandardResult::Value(json!("a")));
        assert!(matches!(v.parse(&Value::Null), StandardResult::Issues(_)));
    }
}
