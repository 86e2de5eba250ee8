//! Compiling field specs into executable validators

use crate::error::RealizeError;
use crate::schema::{Field, FieldSpec, Transform};
use crate::validator::{NativeValidator, StandardValidator};
use std::fmt;
use std::sync::Arc;

/// Validator selected for one field, by protocol.
#[derive(Clone)]
pub enum FieldValidator {
    /// Returns the value or a list of issues
    Native(Arc<dyn NativeValidator>),
    /// Standard `parse` interface
    Standard(Arc<dyn StandardValidator>),
}

impl fmt::Debug for FieldValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(v) => f.debug_tuple("Native").field(&v.expected()).finish(),
            Self::Standard(v) => f.debug_tuple("Standard").field(&v.vendor()).finish(),
        }
    }
}

/// A realized field
#[derive(Debug, Clone)]
pub struct RealizedField {
    pub(crate) name: String,
    pub(crate) optional: bool,
    pub(crate) validator: FieldValidator,
}

/// The executable form of a [`Schema`](crate::Schema): one validator per
/// field plus the queued record-level transforms.
pub struct RealizedSchema {
    pub(crate) fields: Vec<RealizedField>,
    pub(crate) transforms: Vec<Transform>,
}

impl RealizedSchema {
    /// Number of record-level transforms
    pub fn transform_count(&self) -> usize {
        self.transforms.len()
    }

    /// Realized fields, in declaration order
    pub fn fields(&self) -> &[RealizedField] {
        &self.fields
    }
}

impl RealizedField {
    /// Variable name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Selected validator
    pub fn validator(&self) -> &FieldValidator {
        &self.validator
    }
}

impl fmt::Debug for RealizedSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealizedSchema")
            .field("fields", &self.fields)
            .field("transforms", &self.transforms.len())
            .finish()
    }
}

pub(crate) fn build(
    fields: &[Field],
    transforms: Vec<Transform>,
) -> Result<RealizedSchema, RealizeError> {
    let fields = fields
        .iter()
        .map(|field| {
            Ok(RealizedField {
                name: field.name().to_string(),
                optional: field.is_optional(),
                validator: select(field)?,
            })
        })
        .collect::<Result<Vec<_>, RealizeError>>()?;

    Ok(RealizedSchema { fields, transforms })
}

fn select(field: &Field) -> Result<FieldValidator, RealizeError> {
    match field.spec() {
        FieldSpec::Native(v) => Ok(FieldValidator::Native(Arc::clone(v))),
        FieldSpec::Standard(v) => Ok(FieldValidator::Standard(Arc::clone(v))),
        FieldSpec::Expr(expression) => compile(field.name(), expression),
    }
}

#[cfg(feature = "expr")]
fn compile(key: &str, expression: &str) -> Result<FieldValidator, RealizeError> {
    crate::expr::compile(expression)
        .map(|compiled| FieldValidator::Native(Arc::new(compiled)))
        .map_err(|source| RealizeError::Expression {
            key: key.to_string(),
            source,
        })
}

#[cfg(not(feature = "expr"))]
fn compile(key: &str, expression: &str) -> Result<FieldValidator, RealizeError> {
    Err(crate::error::MissingValidatorDependencyError {
        key: key.to_string(),
        expression: expression.to_string(),
    }
    .into())
}
