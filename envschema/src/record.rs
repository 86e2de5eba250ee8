//! Validated records

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::ops::Index;

/// The validated environment: schema key to coerced, validated value.
///
/// Contains only schema-declared keys, with defaults applied. Absent
/// optional keys are omitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Wrap an already validated map
    pub fn new(values: Map<String, Value>) -> Self {
        Self(values)
    }

    /// Value of `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String value of `key`
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Integer value of `key`
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    /// Numeric value of `key`
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    /// Boolean value of `key`
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// Whether `key` is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterate over the keys
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no entries
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert or replace a value (used by transforms)
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Keep only the keys starting with `prefix`.
    ///
    /// Build-tool integrations use this to expose client-visible variables only.
    pub fn with_prefix(&self, prefix: &str) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(k, _)| k.starts_with(prefix))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// Deserialize the whole record into a typed struct whose field names match the keys.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.0.clone()))
    }

    /// Borrow the underlying map
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume the record, returning the underlying map
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl Index<&str> for Record {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.0.get(key).unwrap_or(&NULL)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn sample() -> Record {
        let Value::Object(map) = json!({
            "PORT": 8080,
            "DEBUG": true,
            "HOST": "localhost",
            "VITE_API_URL": "https://api.example.com",
            "RATIO": 0.5,
        }) else {
            unreachable!()
        };
        Record::new(map)
    }

    #[test]
    fn test_typed_getters() {
        let record = sample();
        assert_eq!(record.get_i64("PORT"), Some(8080));
        assert_eq!(record.get_bool("DEBUG"), Some(true));
        assert_eq!(record.get_str("HOST"), Some("localhost"));
        assert_eq!(record.get_f64("RATIO"), Some(0.5));
        assert_eq!(record.get_str("PORT"), None);
        assert_eq!(record["PORT"], json!(8080));
        assert_eq!(record["NOPE"], Value::Null);
    }

    #[test]
    fn test_with_prefix() {
        let public = sample().with_prefix("VITE_");
        assert_eq!(public.len(), 1);
        assert!(public.contains_key("VITE_API_URL"));
    }

    #[test]
    fn test_deserialize_into_struct() {
        #[derive(Deserialize)]
        #[allow(non_snake_case)]
        struct Env {
            PORT: u16,
            DEBUG: bool,
        }

        let env: Env = sample().deserialize().unwrap();
        assert_eq!(env.PORT, 8080);
        assert!(env.DEBUG);
    }
}
