//! Per-field validation issues

use serde_json::Value;
use std::fmt;

/// What went wrong with a single environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// Declared key absent from the input and no default is available.
    Missing {
        /// Description of the expected shape (e.g. "a number")
        expected: String,
    },

    /// The (coerced) value has the wrong primitive kind.
    TypeMismatch {
        /// Description of the expected shape
        expected: String,
        /// Description of the observed value (e.g. "a string")
        actual: String,
    },

    /// The value has the right kind but fails a declared constraint.
    Refinement {
        /// Description of the constraint (e.g. "at most 65535")
        constraint: String,
        /// Rendering of the observed value
        actual: String,
    },

    /// Free-form message reported by a third-party validator or a transform.
    Custom {
        /// Message as reported
        message: String,
    },
}

/// A single validation issue, attached to the key it concerns.
///
/// Validators build issues without a key; the dispatcher attaches the key
/// of the field being validated with [`Issue::at`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    key: String,
    kind: IssueKind,
}

impl Issue {
    /// Create an issue of the given kind, not yet attached to a key
    pub fn new(kind: IssueKind) -> Self {
        Self {
            key: String::new(),
            kind,
        }
    }

    /// Create a missing-value issue
    pub fn missing(expected: impl Into<String>) -> Self {
        Self::new(IssueKind::Missing {
            expected: expected.into(),
        })
    }

    /// Create a type-mismatch issue
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::new(IssueKind::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        })
    }

    /// Create a refinement-failure issue
    pub fn refinement(constraint: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::new(IssueKind::Refinement {
            constraint: constraint.into(),
            actual: actual.into(),
        })
    }

    /// Create a free-form issue
    pub fn custom(message: impl Into<String>) -> Self {
        Self::new(IssueKind::Custom {
            message: message.into(),
        })
    }

    /// Attach the issue to `key`. An already attached key is kept.
    pub fn at(mut self, key: impl Into<String>) -> Self {
        if self.key.is_empty() {
            self.key = key.into();
        }
        self
    }

    /// Key the issue concerns (empty for record-level issues)
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Kind of the issue
    pub fn kind(&self) -> &IssueKind {
        &self.kind
    }

    /// Whether this is a missing-value issue
    pub fn is_missing(&self) -> bool {
        matches!(self.kind, IssueKind::Missing { .. })
    }

    /// The message without the leading key.
    pub fn message(&self) -> String {
        match &self.kind {
            IssueKind::Missing { expected } => format!("must be {expected} (was missing)"),
            IssueKind::TypeMismatch { expected, actual } => {
                format!("must be {expected} (was {actual})")
            }
            IssueKind::Refinement { constraint, actual } => {
                format!("must be {constraint} (was {actual})")
            }
            IssueKind::Custom { message } => message.clone(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, self.key.is_empty()) {
            (_, true) => write!(f, "{}", self.message()),
            (IssueKind::Custom { message }, false) => write!(f, "{}: {}", self.key, message),
            (_, false) => write!(f, "{} {}", self.key, self.message()),
        }
    }
}

/// Describe the kind of a value the way issue messages do ("a string", "a number").
pub fn describe_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Render a value for issue messages: strings quoted, scalars as-is.
pub fn describe_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{s}\""),
        Value::Array(_) | Value::Object(_) => describe_kind(value).to_string(),
        other => other.to_string(),
    }
}
