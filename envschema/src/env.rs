//! Loading facades
//!
//! [`Loader::load`] returns validation failures to the caller;
//! [`Loader::define`] treats them as fatal, printing the report to stderr
//! and exiting the process.

use crate::coerce::Coercer;
use crate::dispatch;
use crate::error::{DefinitionError, EnvError, EnvValidationError};
use crate::record::Record;
use crate::report::{self, ColorChoice};
use crate::schema::Schema;
use crate::source::EnvSnapshot;
use serde_json::{Map, Value};

/// Loads a schema from an environment snapshot.
///
/// ```rust
/// use envschema::{EnvSnapshot, Loader, Schema};
///
/// # fn main() -> anyhow::Result<()> {
/// let schema = Schema::builder()
///     .field("PORT", "number.port")
///     .field("DEBUG", "boolean = false")
///     .build()?;
///
/// let env: EnvSnapshot = [("VITE_PORT", "8080"), ("PORT", "1")].into_iter().collect();
/// let record = Loader::new(&schema).prefix("VITE_").load(&env)?;
///
/// assert_eq!(record.get_i64("PORT"), Some(8080));
/// assert_eq!(record.get_bool("DEBUG"), Some(false));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Loader<'s> {
    schema: &'s Schema,
    prefix: Option<String>,
    coercer: Coercer,
    color: ColorChoice,
}

impl<'s> Loader<'s> {
    /// Loader with no prefix, the default coercion table and automatic color
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            prefix: None,
            coercer: Coercer::default(),
            color: ColorChoice::default(),
        }
    }

    /// Read every key `KEY` from `{prefix}KEY`.
    ///
    /// The record keeps the schema's own key names.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Replace the coercion table
    pub fn coercer(mut self, coercer: Coercer) -> Self {
        self.coercer = coercer;
        self
    }

    /// Styling of the report printed by [`Loader::define`]
    pub fn color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    /// Validate the snapshot against the schema.
    ///
    /// Realizes the schema on first use. Variables not declared by the
    /// schema are ignored.
    ///
    /// # Errors
    ///
    /// - [`EnvError::Validation`] with every issue found
    /// - [`EnvError::Realization`] if the schema cannot be realized
    pub fn load(&self, env: &EnvSnapshot) -> Result<Record, EnvError> {
        let candidate = self.candidate(env);
        let coerced = self.coercer.coerce(self.schema, &candidate);
        let realized = self.schema.realize()?;

        let record = dispatch::validate(&realized, &coerced).map_err(EnvValidationError::new)?;
        tracing::debug!(
            keys = record.len(),
            prefix = self.prefix.as_deref().unwrap_or(""),
            "loaded environment"
        );
        Ok(record)
    }

    /// Validate the snapshot, exiting the process with status 1 on failure.
    pub fn define(&self, env: &EnvSnapshot) -> Record {
        match self.load(env) {
            Ok(record) => record,
            Err(err) => {
                let report = match &err {
                    EnvError::Validation(e) => report::render(e.issues(), self.color.enabled()),
                    other => other.to_string(),
                };
                tracing::error!(error = %err, "invalid environment");
                eprintln!("{report}");
                std::process::exit(1)
            }
        }
    }

    /// Schema-declared keys present in the snapshot, as raw strings
    fn candidate(&self, env: &EnvSnapshot) -> Map<String, Value> {
        let prefix = self.prefix.as_deref().unwrap_or("");
        self.schema
            .keys()
            .filter_map(|key| {
                let raw = env.get(&format!("{prefix}{key}"))?;
                Some((key.to_string(), Value::String(raw.to_string())))
            })
            .collect()
    }
}

/// Validate `env` against `schema`, returning failures to the caller.
///
/// # Errors
///
/// See [`Loader::load`].
pub fn load_env(schema: &Schema, env: &EnvSnapshot) -> Result<Record, EnvError> {
    Loader::new(schema).load(env)
}

/// Validate the process environment against `schema`, exiting on failure.
pub fn define_env(schema: &Schema) -> Record {
    Loader::new(schema).define(&EnvSnapshot::from_process())
}

/// A type that can be loaded from the environment.
///
/// Usually implemented with `#[derive(EnvSchema)]`.
pub trait EnvSchema: Sized {
    /// Schema describing the variables of this type
    fn schema() -> Result<Schema, DefinitionError>;

    /// Prefix applied to every key when reading
    fn prefix() -> Option<&'static str> {
        None
    }

    /// Convert a validated record
    fn from_record(record: Record) -> Result<Self, EnvError>;

    /// Validate `env` and convert the resulting record.
    fn load(env: &EnvSnapshot) -> Result<Self, EnvError> {
        let schema = Self::schema()?;
        let mut loader = Loader::new(&schema);
        if let Some(prefix) = Self::prefix() {
            loader = loader.prefix(prefix);
        }
        Self::from_record(loader.load(env)?)
    }
}
