//! Typed extraction from validated records
//!
//! Used by the derive macro to turn record values into field types.

use crate::error::EnvError;
use crate::record::Record;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Convert the value at `key` into `T`.
///
/// An absent key is read as `null`, so `Option<T>` yields `None`.
#[doc(hidden)]
pub fn field<T: DeserializeOwned>(record: &Record, key: &str) -> Result<T, EnvError> {
    let value = record.get(key).cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| EnvError::deserialize_error::<T>(key, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn record(value: Value) -> Record {
        let mut map = Map::new();
        map.insert("VALUE".to_string(), value);
        Record::new(map)
    }

    #[test]
    fn test_field_integer() {
        let port: u16 = field(&record(json!(8080)), "VALUE").unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn test_field_float_from_integer() {
        let ratio: f64 = field(&record(json!(2)), "VALUE").unwrap();
        assert_eq!(ratio, 2.0);
    }

    #[test]
    fn test_field_bool_and_string() {
        let debug: bool = field(&record(json!(true)), "VALUE").unwrap();
        assert!(debug);
        let name: String = field(&record(json!("hello world")), "VALUE").unwrap();
        assert_eq!(name, "hello world");
    }

    #[test]
    fn test_field_optional_missing() {
        let missing: Option<String> = field(&Record::default(), "VALUE").unwrap();
        assert_eq!(missing, None);
        let present: Option<i64> = field(&record(json!(3)), "VALUE").unwrap();
        assert_eq!(present, Some(3));
    }

    #[test]
    fn test_field_conversion_error() {
        let result: Result<u8, _> = field(&record(json!(300)), "VALUE");
        match result {
            Err(EnvError::Deserialize { key, type_name, .. }) => {
                assert_eq!(key, "VALUE");
                assert_eq!(type_name, "u8");
            }
            other => panic!("Expected Deserialize error, got {other:?}"),
        }
    }
}
