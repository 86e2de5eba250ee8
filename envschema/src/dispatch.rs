//! Running realized validators against a coerced candidate
//!
//! Both validator protocols are normalized to `Result<Record, Vec<Issue>>`.
//! Every field is checked before reporting, so one call surfaces all issues.

use crate::issue::Issue;
use crate::realize::{FieldValidator, RealizedField, RealizedSchema};
use crate::record::Record;
use crate::validator::{StandardIssue, StandardResult};
use serde_json::{Map, Value};

/// Validate a coerced candidate against a realized schema.
///
/// Keys not declared by the schema are ignored and never appear in the
/// record. Record-level transforms run in declaration order once every
/// field validated; the first failing transform ends validation.
pub fn validate(
    realized: &RealizedSchema,
    candidate: &Map<String, Value>,
) -> Result<Record, Vec<Issue>> {
    let mut values = Map::new();
    let mut issues = Vec::new();

    for field in &realized.fields {
        let present = candidate.get(&field.name).filter(|v| !v.is_null());
        match check_field(field, present) {
            Ok(Some(value)) => {
                values.insert(field.name.clone(), value);
            }
            Ok(None) => {}
            Err(found) => issues.extend(found),
        }
    }

    if !issues.is_empty() {
        return Err(issues);
    }

    realized
        .transforms
        .iter()
        .try_fold(Record::new(values), |record, transform| transform(record))
}

fn check_field(
    field: &RealizedField,
    present: Option<&Value>,
) -> Result<Option<Value>, Vec<Issue>> {
    let at_key = |issues: Vec<Issue>| {
        issues
            .into_iter()
            .map(|issue| issue.at(field.name.as_str()))
            .collect::<Vec<_>>()
    };

    match (&field.validator, present) {
        (FieldValidator::Native(v), Some(value)) => v.check(value).map(Some).map_err(at_key),
        (FieldValidator::Native(v), None) => match v.default_value() {
            Some(default) => Ok(Some(default)),
            None if field.optional => Ok(None),
            None => Err(at_key(vec![Issue::missing(v.expected())])),
        },
        (FieldValidator::Standard(v), _) => {
            let input = present.cloned().unwrap_or(Value::Null);
            match v.parse(&input) {
                StandardResult::Value(Value::Null) => Ok(None),
                StandardResult::Value(value) => Ok(Some(value)),
                StandardResult::Issues(_) if present.is_none() && field.optional => Ok(None),
                StandardResult::Issues(found) => Err(found
                    .into_iter()
                    .map(|issue| standard_issue(&field.name, issue))
                    .collect()),
            }
        }
    }
}

fn standard_issue(key: &str, issue: StandardIssue) -> Issue {
    let mut path = key.to_string();
    for segment in &issue.path {
        path.push('.');
        path.push_str(segment);
    }
    Issue::custom(issue.message).at(path)
}
