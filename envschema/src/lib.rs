//! Typesafe environment variable loading
//!
//! `envschema` validates environment variables against a declarative schema
//! and returns a record of coerced, typed values. A single call reports
//! every problem at once, so a misconfigured deployment fails with the full
//! list of what is wrong rather than the first missing variable.
//!
//! # Features
//!
//! - **Type expressions**: `"number.port"`, `"'dev' | 'prod' = 'dev'"`,
//!   `"0 < number <= 100"` (with the default `expr` feature)
//! - **Coercion**: `"8080"` becomes `8080`, `"true"` becomes `true`
//! - **Custom validators**: native closures or third-party validators
//!   implementing the standard `parse` interface
//! - **Lazy schemas**: validators are built on first use; record-level
//!   transforms can be queued until then
//! - **Prefixes**: read `VITE_PORT` into `PORT`
//! - **Derive**: `#[derive(EnvSchema)]` for typed structs
//!
//! # Example
//!
//! ```rust
//! use envschema::{load_env, EnvSnapshot, Schema};
//!
//! # fn main() -> anyhow::Result<()> {
//! let schema = Schema::builder()
//!     .field("DATABASE_URL", "string.url")
//!     .field("PORT", "number.port = 3000")
//!     .field("NODE_ENV", "'development' | 'production' = 'development'")
//!     .build()?;
//!
//! let env: EnvSnapshot = [("DATABASE_URL", "postgres://localhost/app"), ("PORT", "8080")]
//!     .into_iter()
//!     .collect();
//! let record = load_env(&schema, &env)?;
//!
//! assert_eq!(record.get_i64("PORT"), Some(8080));
//! assert_eq!(record.get_str("NODE_ENV"), Some("development"));
//! # Ok(())
//! # }
//! ```
//!
//! Use [`define_env`] at process startup to print the report and exit with
//! status 1 instead of returning an error.
//!
//! # Error reports
//!
//! ```text
//! Errors found while validating environment variables:
//!   DATABASE_URL must be a URL (was missing)
//!   PORT must be an integer between 0 and 65535 (was 65536)
//! ```
//!
//! # Derive
//!
//! ```rust
//! use envschema::{EnvSchema, EnvSnapshot};
//!
//! #[derive(Debug, EnvSchema)]
//! #[env(prefix = "APP_")]
//! struct Config {
//!     #[env(ty = "string.host")]
//!     host: String,
//!
//!     #[env(ty = "number.port", default = "8080")]
//!     port: u16,
//!
//!     debug: Option<bool>,
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! let env: EnvSnapshot = [("APP_HOST", "localhost")].into_iter().collect();
//! let config = Config::from_snapshot(&env)?;
//! assert_eq!(config.host, "localhost");
//! assert_eq!(config.port, 8080);
//! assert_eq!(config.debug, None);
//! # Ok(())
//! # }
//! ```
//!
//! ## Attributes
//!
//! - `#[env(prefix = "APP_")]` on the struct: read every key with the prefix
//! - `#[env(name = "VAR")]`: variable name (default: field name uppercased)
//! - `#[env(ty = "...")]`: type expression (inferred for strings, booleans
//!   and numbers)
//! - `#[env(default = "...")]`: inline default literal
//!
//! `Option<T>` fields are optional keys and cannot have a default.
//!
//! # Cargo features
//!
//! - `expr` (default): the type-expression engine. Without it, textual
//!   field specs fail to realize with [`MissingValidatorDependencyError`];
//!   native and standard validators keep working.

pub mod coerce;
#[doc(hidden)]
pub mod de;
pub mod dispatch;
mod env;
mod error;
#[cfg(feature = "expr")]
pub mod expr;
mod issue;
mod realize;
mod record;
pub mod report;
mod schema;
mod source;
pub mod validator;

pub use coerce::{Coercer, KindMatcher};
pub use env::{define_env, load_env, EnvSchema, Loader};
pub use envschema_derive::EnvSchema;
pub use error::{
    DefinitionError, EnvError, EnvValidationError, ExpressionError, LateTransformError,
    MissingValidatorDependencyError, RealizeError, SourceError,
};
pub use issue::{describe_kind, describe_value, Issue, IssueKind};
pub use realize::{FieldValidator, RealizedField, RealizedSchema};
pub use record::Record;
pub use report::ColorChoice;
pub use schema::{Field, FieldSpec, RealizationState, Schema, SchemaBuilder, Transform};
pub use source::EnvSnapshot;

// Re-export for macro-generated code
#[doc(hidden)]
pub use anyhow;
