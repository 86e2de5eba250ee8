//! Schema definitions and lazy realization
//!
//! A [`Schema`] maps environment variable names to field specs. Its keys are
//! fixed by [`SchemaBuilder::build`]; the executable validator is only built
//! on first use (or an explicit [`Schema::realize`]) and cached afterwards.
//!
//! Realization goes through three states:
//!
//! ```text
//! Unrealized --realize()--> Realizing --build ok--> Realized
//!     |  ^                      |
//!     |  +------build failed----+
//!     +--pipe()--> Unrealized (transform queued)
//! ```
//!
//! Transforms can only be queued while unrealized; afterwards [`Schema::pipe`]
//! fails with [`LateTransformError`].

use crate::error::{DefinitionError, LateTransformError, RealizeError};
use crate::issue::Issue;
use crate::realize::{self, RealizedSchema};
use crate::record::Record;
use crate::validator::{NativeValidator, StandardValidator};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Record-level transform applied after all fields validated.
pub type Transform = Arc<dyn Fn(Record) -> Result<Record, Vec<Issue>> + Send + Sync>;

/// How a single environment variable is validated.
#[derive(Clone)]
pub enum FieldSpec {
    /// Type expression such as `"number.port"` or `"'dev' | 'prod' = 'dev'"`
    Expr(String),
    /// Pre-built native validator
    Native(Arc<dyn NativeValidator>),
    /// Third-party validator implementing the standard `parse` interface
    Standard(Arc<dyn StandardValidator>),
}

impl FieldSpec {
    /// Wrap a native validator
    pub fn native(validator: impl NativeValidator + 'static) -> Self {
        Self::Native(Arc::new(validator))
    }

    /// Wrap a standard validator
    pub fn standard(validator: impl StandardValidator + 'static) -> Self {
        Self::Standard(Arc::new(validator))
    }

    /// The type expression, for textual specs
    pub fn expression(&self) -> Option<&str> {
        match self {
            Self::Expr(expression) => Some(expression),
            _ => None,
        }
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expr(expression) => f.debug_tuple("Expr").field(expression).finish(),
            Self::Native(v) => f.debug_tuple("Native").field(&v.expected()).finish(),
            Self::Standard(v) => f.debug_tuple("Standard").field(&v.vendor()).finish(),
        }
    }
}

impl From<&str> for FieldSpec {
    fn from(expression: &str) -> Self {
        Self::Expr(expression.to_string())
    }
}

impl From<String> for FieldSpec {
    fn from(expression: String) -> Self {
        Self::Expr(expression)
    }
}

/// A declared environment variable.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    optional: bool,
    spec: FieldSpec,
}

impl Field {
    /// Variable name, without the optional marker
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the key was declared with a trailing `?`
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// How the variable is validated
    pub fn spec(&self) -> &FieldSpec {
        &self.spec
    }
}

/// Observable realization state of a [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RealizationState {
    /// Not built yet; transforms may be queued
    Unrealized,
    /// A build is in progress
    Realizing,
    /// Built and cached
    Realized,
}

enum State {
    Unrealized { pending: Vec<Transform> },
    Realizing { pending: Vec<Transform> },
    Realized(Arc<RealizedSchema>),
}

/// Declarative description of the expected environment.
///
/// ```rust
/// use envschema::{RealizationState, Schema};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let schema = Schema::builder()
///     .field("HOST", "string.host")
///     .field("PORT", "number.port = 3000")
///     .field("LOG_LEVEL?", "'debug' | 'info' | 'warn' | 'error'")
///     .build()?;
///
/// assert_eq!(schema.state(), RealizationState::Unrealized);
/// schema.realize()?;
/// assert_eq!(schema.state(), RealizationState::Realized);
/// # Ok(())
/// # }
/// ```
pub struct Schema {
    fields: Vec<Field>,
    state: Mutex<State>,
}

impl Schema {
    /// Start defining a schema
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Declared fields, in declaration order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Declared variable names, in declaration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(Field::name)
    }

    /// Look up a declared field
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Current realization state
    pub fn state(&self) -> RealizationState {
        match &*self.lock() {
            State::Unrealized { .. } => RealizationState::Unrealized,
            State::Realizing { .. } => RealizationState::Realizing,
            State::Realized(_) => RealizationState::Realized,
        }
    }

    /// Queue a record-level transform, applied in declaration order after
    /// every field validated.
    ///
    /// # Errors
    ///
    /// [`LateTransformError`] once realization has started.
    pub fn pipe<F>(&self, transform: F) -> Result<&Self, LateTransformError>
    where
        F: Fn(Record) -> Result<Record, Vec<Issue>> + Send + Sync + 'static,
    {
        match &mut *self.lock() {
            State::Unrealized { pending } => {
                pending.push(Arc::new(transform));
                Ok(self)
            }
            State::Realizing { .. } | State::Realized(_) => Err(LateTransformError),
        }
    }

    /// Queue a cross-field check; a failing `predicate` reports `message`.
    ///
    /// # Errors
    ///
    /// [`LateTransformError`] once realization has started.
    pub fn refine<P>(
        &self,
        message: impl Into<String>,
        predicate: P,
    ) -> Result<&Self, LateTransformError>
    where
        P: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        let message = message.into();
        self.pipe(move |record| {
            if predicate(&record) {
                Ok(record)
            } else {
                Err(vec![Issue::custom(message.clone())])
            }
        })
    }

    /// Build (or fetch the cached) validator for this schema.
    ///
    /// Concurrent first calls may each build; the builds are equivalent and
    /// the last one to finish is cached.
    ///
    /// # Errors
    ///
    /// [`RealizeError`] if a field spec cannot be compiled. The schema then
    /// stays unrealized with its transforms queued.
    pub fn realize(&self) -> Result<Arc<RealizedSchema>, RealizeError> {
        let pending = {
            let mut state = self.lock();
            match &mut *state {
                State::Realized(realized) => return Ok(Arc::clone(realized)),
                State::Realizing { pending } => pending.clone(),
                State::Unrealized { pending } => {
                    let pending = std::mem::take(pending);
                    *state = State::Realizing {
                        pending: pending.clone(),
                    };
                    pending
                }
            }
        };

        tracing::debug!(
            fields = self.fields.len(),
            transforms = pending.len(),
            "realizing environment schema"
        );

        match realize::build(&self.fields, pending) {
            Ok(realized) => {
                let realized = Arc::new(realized);
                *self.lock() = State::Realized(Arc::clone(&realized));
                Ok(realized)
            }
            Err(e) => {
                let mut state = self.lock();
                if let State::Realizing { pending } = &mut *state {
                    let pending = std::mem::take(pending);
                    *state = State::Unrealized { pending };
                }
                Err(e)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("fields", &self.fields)
            .field("state", &self.state())
            .finish()
    }
}

/// Builder for [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<(String, FieldSpec)>,
}

impl SchemaBuilder {
    /// Declare a variable. A trailing `?` on the key makes it optional.
    pub fn field(mut self, key: impl Into<String>, spec: impl Into<FieldSpec>) -> Self {
        self.fields.push((key.into(), spec.into()));
        self
    }

    /// Fix the keys and create the (unrealized) schema.
    ///
    /// # Errors
    ///
    /// [`DefinitionError`] for empty or duplicated keys.
    pub fn build(self) -> Result<Schema, DefinitionError> {
        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(self.fields.len());

        for (key, spec) in self.fields {
            let (name, optional) = match key.strip_suffix('?') {
                Some(name) => (name.to_string(), true),
                None => (key, false),
            };
            if name.is_empty() {
                return Err(DefinitionError::EmptyKey);
            }
            if !seen.insert(name.clone()) {
                return Err(DefinitionError::DuplicateKey { name });
            }
            fields.push(Field {
                name,
                optional,
                spec,
            });
        }

        Ok(Schema {
            fields,
            state: Mutex::new(State::Unrealized {
                pending: Vec::new(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator;
    use serde_json::Value;

    fn passthrough() -> FieldSpec {
        FieldSpec::native(validator::native("anything", |v: &Value| Ok(v.clone())))
    }

    #[test]
    fn test_builder_parses_optional_marker() {
        let schema = Schema::builder()
            .field("HOST", passthrough())
            .field("LOG_LEVEL?", passthrough())
            .build()
            .unwrap();

        assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["HOST", "LOG_LEVEL"]);
        assert!(!schema.field("HOST").unwrap().is_optional());
        assert!(schema.field("LOG_LEVEL").unwrap().is_optional());
    }

    #[test]
    fn test_builder_rejects_empty_and_duplicate_keys() {
        assert_eq!(
            Schema::builder().field("", "string").build().unwrap_err(),
            DefinitionError::EmptyKey
        );
        assert_eq!(
            Schema::builder().field("?", "string").build().unwrap_err(),
            DefinitionError::EmptyKey
        );
        assert_eq!(
            Schema::builder()
                .field("A", "string")
                .field("A?", "number")
                .build()
                .unwrap_err(),
            DefinitionError::DuplicateKey {
                name: "A".to_string()
            }
        );
    }

    #[test]
    fn test_pipe_before_realization_is_queued() {
        let schema = Schema::builder().field("A", passthrough()).build().unwrap();
        schema.pipe(Ok).unwrap().pipe(Ok).unwrap();
        assert_eq!(schema.state(), RealizationState::Unrealized);

        let realized = schema.realize().unwrap();
        assert_eq!(realized.transform_count(), 2);
        assert_eq!(schema.state(), RealizationState::Realized);
    }

    #[test]
    fn test_pipe_after_realization_fails() {
        let schema = Schema::builder().field("A", passthrough()).build().unwrap();
        schema.realize().unwrap();

        assert_eq!(schema.pipe(Ok).unwrap_err(), LateTransformError);
        assert_eq!(
            schema.refine("never", |_| true).unwrap_err(),
            LateTransformError
        );
    }

    #[test]
    fn test_realize_is_cached() {
        let schema = Schema::builder().field("A", passthrough()).build().unwrap();
        let first = schema.realize().unwrap();
        let second = schema.realize().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[cfg(feature = "expr")]
    #[test]
    fn test_failed_realization_keeps_pending_transforms() {
        let schema = Schema::builder().field("A", "number.nope").build().unwrap();
        schema.pipe(Ok).unwrap();

        assert!(matches!(
            schema.realize(),
            Err(RealizeError::Expression { .. })
        ));
        assert_eq!(schema.state(), RealizationState::Unrealized);
        // still accepts transforms
        schema.pipe(Ok).unwrap();
    }

    #[cfg(not(feature = "expr"))]
    #[test]
    fn test_expression_requires_engine() {
        let schema = Schema::builder().field("PORT", "number").build().unwrap();
        assert!(matches!(
            schema.realize(),
            Err(RealizeError::MissingDependency(_))
        ));
    }
}
