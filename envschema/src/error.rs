//! Error types for schema definition, realization and environment loading

use crate::issue::Issue;
use crate::report;

/// Errors raised while building a [`Schema`](crate::Schema).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    /// A schema key was empty (or consisted only of the optional marker `?`).
    #[error("Schema keys must be non-empty")]
    EmptyKey,

    /// The same key was declared twice.
    #[error("Environment variable '{name}' is declared more than once")]
    DuplicateKey {
        /// Name of the duplicated key
        name: String,
    },
}

/// A transform was chained onto a schema after its realization started.
///
/// This is a usage bug: transforms must be attached while the schema is
/// being defined, before the first validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Cannot add a transform to a schema that has already been realized; attach transforms before the first validation")]
pub struct LateTransformError;

/// A textual field spec needs the type-expression engine, which was not compiled in.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Environment variable '{key}' is declared with the type expression '{expression}', \
     but the type-expression engine is not available. Enable the `expr` feature of \
     envschema, or declare the field with a native or standard validator instead"
)]
pub struct MissingValidatorDependencyError {
    /// Key whose field spec required the engine
    pub key: String,
    /// The expression that could not be compiled
    pub expression: String,
}

/// A type expression could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpressionError {
    /// The expression is not syntactically valid.
    #[error("invalid type expression '{expression}' at offset {offset}: {message}")]
    Syntax {
        /// The full expression
        expression: String,
        /// Byte offset where parsing failed
        offset: usize,
        /// What the parser expected
        message: String,
    },

    /// A keyword or subtype is not known to the engine.
    #[error("unknown type keyword '{keyword}'")]
    UnknownKeyword {
        /// The offending keyword (including any subtype)
        keyword: String,
    },

    /// The inline default is not a literal, or does not satisfy the type.
    #[error("invalid default '{default}': {message}")]
    InvalidDefault {
        /// Default text as written
        default: String,
        /// Why it was rejected
        message: String,
    },
}

/// Errors raised while realizing a schema into a validator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RealizeError {
    /// The type-expression engine is required but not compiled in.
    #[error(transparent)]
    MissingDependency(#[from] MissingValidatorDependencyError),

    /// A field's type expression failed to compile.
    #[error("Environment variable '{key}' has an invalid type: {source}")]
    Expression {
        /// Key whose expression failed
        key: String,
        /// Underlying compile error
        source: ExpressionError,
    },
}

/// Aggregated validation failure for one load.
///
/// Carries every issue found (no fail-fast) and the formatted, uncolored
/// report built from them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{summary}")]
pub struct EnvValidationError {
    summary: String,
    issues: Vec<Issue>,
}

impl EnvValidationError {
    /// Wrap a list of issues, formatting the summary once
    pub fn new(issues: Vec<Issue>) -> Self {
        Self {
            summary: report::format_issues(&issues),
            issues,
        }
    }

    /// The formatted report
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// The raw issues, in declaration order
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Consume the error, returning the raw issues
    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }
}

/// Errors that can occur when loading the environment through a facade.
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    /// One or more variables failed validation.
    #[error(transparent)]
    Validation(#[from] EnvValidationError),

    /// The schema could not be realized.
    #[error(transparent)]
    Realization(#[from] RealizeError),

    /// The schema itself was malformed.
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// A validated value could not be converted into the requested Rust type.
    #[error("Failed to convert environment variable '{key}' as {type_name}: {message}")]
    Deserialize {
        /// Key of the value being converted
        key: String,
        /// Target type name
        type_name: String,
        /// Error message from serde
        message: String,
    },
}

impl EnvError {
    /// Create a deserialize error (used by macro-generated code)
    #[doc(hidden)]
    pub fn deserialize_error<T>(key: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Deserialize {
            key: key.into(),
            type_name: std::any::type_name::<T>().to_string(),
            message: message.to_string(),
        }
    }

    /// The validation issues, if this is a validation failure
    pub fn issues(&self) -> Option<&[Issue]> {
        match self {
            Self::Validation(e) => Some(e.issues()),
            _ => None,
        }
    }
}

/// Errors raised while reading an environment snapshot from a `.env` file.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The file could not be read.
    #[error("Failed to read env file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to be read
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A line is neither blank, a comment, nor `KEY=VALUE`.
    #[error("Invalid line {line} in env file: {message}")]
    Syntax {
        /// 1-based line number
        line: usize,
        /// What was wrong
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_summary_lists_issues() {
        let err = EnvValidationError::new(vec![
            Issue::missing("a string").at("HOST"),
            Issue::type_mismatch("a number", "a string").at("PORT"),
        ]);
        assert_eq!(
            err.summary(),
            "Errors found while validating environment variables:\n  \
             HOST must be a string (was missing)\n  \
             PORT must be a number (was a string)"
        );
        assert_eq!(err.to_string(), err.summary());
        assert_eq!(err.issues().len(), 2);
    }

    #[test]
    fn test_deserialize_error_contains_type_info() {
        let err = EnvError::deserialize_error::<u16>("PORT", "out of range");
        match err {
            EnvError::Deserialize { type_name, key, .. } => {
                assert!(type_name.contains("u16"));
                assert_eq!(key, "PORT");
            }
            _ => panic!("Expected Deserialize error"),
        }
    }

    #[test]
    fn test_missing_dependency_guidance() {
        let err = MissingValidatorDependencyError {
            key: "PORT".to_string(),
            expression: "number.port".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("`expr` feature"));
        assert!(message.contains("standard validator"));
    }
}
