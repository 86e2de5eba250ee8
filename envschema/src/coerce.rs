//! Type-directed coercion of raw string values
//!
//! Coercion runs before validation and never fails: a value that cannot be
//! converted to the declared kind is kept as the original string, so the
//! validator reports a precise type mismatch for it.

use crate::schema::{FieldSpec, Schema};
use serde_json::{Map, Number, Value};

/// Conversion attempted for a matching field. `None` keeps the original string.
pub type CoerceFn = fn(&str) -> Option<Value>;

/// Selects the fields a rule applies to, by their declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KindMatcher {
    /// The type starts with this keyword (`number` matches `number.port`, `number > 0`)
    Leading(String),
    /// The type is exactly this text (`boolean`)
    Exact(String),
}

impl KindMatcher {
    fn matches(&self, expression: &str) -> bool {
        let declared = type_part(expression);
        match self {
            Self::Leading(keyword) => leading_keyword(declared) == Some(keyword.as_str()),
            Self::Exact(text) => declared == text,
        }
    }
}

/// One entry of the coercion dispatch table
#[derive(Debug, Clone)]
pub struct Rule {
    matcher: KindMatcher,
    coerce: CoerceFn,
}

/// Dispatch table from declared kind to string conversion.
///
/// The default table coerces `number`-kinded fields and `boolean` fields.
/// The first matching rule wins.
///
/// ```rust
/// use envschema::{Coercer, Schema};
/// use serde_json::{json, Map, Value};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let schema = Schema::builder()
///     .field("PORT", "number.port")
///     .field("DEBUG", "boolean")
///     .build()?;
///
/// let mut raw = Map::new();
/// raw.insert("PORT".into(), json!("8080"));
/// raw.insert("DEBUG".into(), json!("yes"));
///
/// let coerced = Coercer::default().coerce(&schema, &raw);
/// assert_eq!(coerced["PORT"], json!(8080));
/// assert_eq!(coerced["DEBUG"], json!("yes"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Coercer {
    rules: Vec<Rule>,
}

impl Default for Coercer {
    fn default() -> Self {
        Self::empty()
            .with_rule(KindMatcher::Leading("number".to_string()), coerce_number)
            .with_rule(KindMatcher::Exact("boolean".to_string()), coerce_boolean)
    }
}

impl Coercer {
    /// A table without rules: every value is passed through as-is
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule
    pub fn with_rule(mut self, matcher: KindMatcher, coerce: CoerceFn) -> Self {
        self.rules.push(Rule { matcher, coerce });
        self
    }

    /// Append JSON parsing for `object`-kinded fields
    pub fn with_json(self) -> Self {
        self.with_rule(KindMatcher::Leading("object".to_string()), coerce_json)
    }

    /// Coerce the values of schema-declared keys.
    ///
    /// Only string values of fields declared with a type expression are
    /// inspected; every other entry is copied unchanged.
    pub fn coerce(&self, schema: &Schema, candidate: &Map<String, Value>) -> Map<String, Value> {
        let mut coerced = candidate.clone();

        for field in schema.fields() {
            let FieldSpec::Expr(expression) = field.spec() else {
                continue;
            };
            let Some(Value::String(raw)) = coerced.get(field.name()) else {
                continue;
            };
            let Some(rule) = self.rules.iter().find(|r| r.matcher.matches(expression)) else {
                continue;
            };
            if let Some(value) = (rule.coerce)(raw) {
                tracing::trace!(key = field.name(), "coerced environment value");
                coerced.insert(field.name().to_string(), value);
            }
        }

        coerced
    }
}

/// Parse a number: integral values (`8080`, `8080.0`, `1e3`) become
/// integers, other finite values become floats.
pub fn coerce_number(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(Value::from(int));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(number_value)
}

/// Integral values within the exactly representable range become JSON
/// integers so they compare equal to integer input.
pub(crate) fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Map exactly `"true"` and `"false"` to booleans.
pub fn coerce_boolean(raw: &str) -> Option<Value> {
    match raw {
        "true" => Some(Value::Bool(true)),
        "false" => Some(Value::Bool(false)),
        _ => None,
    }
}

/// Parse a JSON object.
pub fn coerce_json(raw: &str) -> Option<Value> {
    serde_json::from_str::<Value>(raw)
        .ok()
        .filter(Value::is_object)
}

/// The declared type of an expression, without its inline `= <default>` clause.
pub(crate) fn type_part(expression: &str) -> &str {
    split_default(expression).0
}

/// Split an expression into its declared type and inline default, both trimmed.
///
/// The default starts at the first `=` outside quotes that is not part of a
/// comparator (`<=`, `>=`, `==`).
pub(crate) fn split_default(expression: &str) -> (&str, Option<&str>) {
    let bytes = expression.as_bytes();
    let mut quote = None;

    for (i, &b) in bytes.iter().enumerate() {
        match (quote, b) {
            (Some(q), _) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'\'' | b'"') => quote = Some(b),
            (None, b'=') => {
                let prev = i.checked_sub(1).map(|p| bytes[p]);
                let next = bytes.get(i + 1).copied();
                let comparator =
                    matches!(prev, Some(b'<' | b'>' | b'=' | b'!')) || next == Some(b'=');
                if !comparator {
                    return (expression[..i].trim(), Some(expression[i + 1..].trim()));
                }
            }
            _ => {}
        }
    }

    (expression.trim(), None)
}

/// First keyword of a declared type, skipping a leading `<literal> <comparator>` bound.
pub(crate) fn leading_keyword(declared: &str) -> Option<&str> {
    let mut rest = declared.trim_start();

    let unbounded =
        rest.trim_start_matches(|c: char| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'));
    if unbounded.len() != rest.len() {
        rest = unbounded.trim_start();
        rest = ["<=", ">=", "==", "<", ">"]
            .iter()
            .find_map(|op| rest.strip_prefix(op))?
            .trim_start();
    }

    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator;
    use serde_json::json;

    fn raw(pairs: &[(&str, &str)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect()
    }

    fn schema(fields: &[(&str, &str)]) -> Schema {
        let mut builder = Schema::builder();
        for (k, v) in fields {
            builder = builder.field(*k, *v);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_number_kinds_are_parsed() {
        let s = schema(&[
            ("PORT", "number.port"),
            ("RATE", "number"),
            ("EPOCH", "number.epoch"),
            ("LIMIT", "number > 0"),
            ("RANGED", "0 < number <= 10"),
        ]);
        let coerced = Coercer::default().coerce(
            &s,
            &raw(&[
                ("PORT", "8080"),
                ("RATE", "0.5"),
                ("EPOCH", "1700000000"),
                ("LIMIT", " 3 "),
                ("RANGED", "7"),
            ]),
        );
        assert_eq!(coerced["PORT"], json!(8080));
        assert_eq!(coerced["RATE"], json!(0.5));
        assert_eq!(coerced["EPOCH"], json!(1_700_000_000_i64));
        assert_eq!(coerced["LIMIT"], json!(3));
        assert_eq!(coerced["RANGED"], json!(7));
    }

    #[test]
    fn test_integral_floats_become_integers() {
        let s = schema(&[("PORT", "number.port"), ("LIMIT", "number"), ("RATE", "number")]);
        let coerced = Coercer::default().coerce(
            &s,
            &raw(&[("PORT", "8080.0"), ("LIMIT", "1e3"), ("RATE", "2.5e-1")]),
        );
        assert_eq!(coerced["PORT"], json!(8080));
        assert!(coerced["PORT"].is_i64());
        assert_eq!(coerced["LIMIT"], json!(1000));
        assert_eq!(coerced["RATE"], json!(0.25));
    }

    #[test]
    fn test_unparseable_number_is_kept() {
        let s = schema(&[("PORT", "number"), ("EMPTY", "number"), ("NAN", "number")]);
        let coerced = Coercer::default().coerce(
            &s,
            &raw(&[("PORT", "not-a-number"), ("EMPTY", ""), ("NAN", "NaN")]),
        );
        assert_eq!(coerced["PORT"], json!("not-a-number"));
        assert_eq!(coerced["EMPTY"], json!(""));
        assert_eq!(coerced["NAN"], json!("NaN"));
    }

    #[test]
    fn test_number_coercion_is_idempotent() {
        let s = schema(&[("PORT", "number.port")]);
        let coercer = Coercer::default();
        let once = coercer.coerce(&s, &raw(&[("PORT", "8080")]));
        let twice = coercer.coerce(&s, &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_only_exact_boolean_strings_coerce() {
        let s = schema(&[("A", "boolean"), ("B", "boolean"), ("C", "boolean"), ("D", "boolean")]);
        let coerced = Coercer::default().coerce(
            &s,
            &raw(&[("A", "true"), ("B", "false"), ("C", "True"), ("D", "1")]),
        );
        assert_eq!(coerced["A"], json!(true));
        assert_eq!(coerced["B"], json!(false));
        assert_eq!(coerced["C"], json!("True"));
        assert_eq!(coerced["D"], json!("1"));
    }

    #[test]
    fn test_default_clause_is_ignored_for_kind() {
        let s = schema(&[("DEBUG", "boolean = false"), ("PORT", "number = 3000")]);
        let coerced =
            Coercer::default().coerce(&s, &raw(&[("DEBUG", "true"), ("PORT", "4000")]));
        assert_eq!(coerced["DEBUG"], json!(true));
        assert_eq!(coerced["PORT"], json!(4000));
    }

    #[test]
    fn test_other_kinds_untouched() {
        let s = Schema::builder()
            .field("HOST", "string.host")
            .field("CONFIG", "object")
            .field("BOOLS", "boolean | 'auto'")
            .field(
                "CUSTOM",
                crate::FieldSpec::native(validator::native("anything", |v: &Value| Ok(v.clone()))),
            )
            .build()
            .unwrap();
        let input = raw(&[
            ("HOST", "localhost"),
            ("CONFIG", r#"{"a":1}"#),
            ("BOOLS", "true"),
            ("CUSTOM", "42"),
        ]);
        assert_eq!(Coercer::default().coerce(&s, &input), input);
    }

    #[test]
    fn test_json_extension() {
        let s = schema(&[("CONFIG", "object"), ("BROKEN", "object")]);
        let coerced = Coercer::default()
            .with_json()
            .coerce(&s, &raw(&[("CONFIG", r#"{"a":1}"#), ("BROKEN", "{nope")]));
        assert_eq!(coerced["CONFIG"], json!({"a": 1}));
        assert_eq!(coerced["BROKEN"], json!("{nope"));
    }

    #[test]
    fn test_extra_keys_pass_through() {
        let s = schema(&[("PORT", "number")]);
        let coerced = Coercer::default().coerce(&s, &raw(&[("PORT", "1"), ("OTHER", "2")]));
        assert_eq!(coerced["OTHER"], json!("2"));
    }

    #[test]
    fn test_type_part() {
        assert_eq!(type_part("number = 3000"), "number");
        assert_eq!(type_part("'a=b' | 'c' = 'c'"), "'a=b' | 'c'");
        assert_eq!(type_part("number >= 3"), "number >= 3");
        assert_eq!(type_part("number == 3 = 3"), "number == 3");
        assert_eq!(type_part(" boolean "), "boolean");
    }

    #[test]
    fn test_split_default() {
        assert_eq!(split_default("number = 3000"), ("number", Some("3000")));
        assert_eq!(
            split_default("'dev' | 'prod' = 'dev'"),
            ("'dev' | 'prod'", Some("'dev'"))
        );
        assert_eq!(split_default("string"), ("string", None));
    }

    #[test]
    fn test_leading_keyword() {
        assert_eq!(leading_keyword("number.port"), Some("number"));
        assert_eq!(leading_keyword("-1 <= number"), Some("number"));
        assert_eq!(leading_keyword("'literal'"), None);
        assert_eq!(leading_keyword("5"), None);
    }
}
