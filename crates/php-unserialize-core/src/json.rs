//! JSON conversion for PHP values.
//!
//! This module provides conversion from `PhpValue` to JSON using serde_json,
//! plus a `Serialize` impl so decoded values can be fed to any serde format.
//! Enable the `serde` feature to use this module.

use bstr::ByteSlice;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{json, Map, Value as JsonValue};

use crate::types::PhpValue;

/// Convert a PHP value to a JSON value.
///
/// # Mapping Rules
///
/// | PHP Value | JSON Type |
/// |-----------|-----------|
/// | `Null` | `null` |
/// | `Bool` | `boolean` |
/// | `Int` | `number` |
/// | `Float` | `number` (`null` for NaN, `"Infinity"` / `"-Infinity"`) |
/// | `String` | `string` (lossy UTF-8 conversion) |
/// | `List` | `array` |
/// | `Map` | `object`, keys in source order |
///
/// # Example
///
/// ```rust
/// use php_unserialize_core::{from_bytes, to_json};
///
/// let data = br#"a:2:{s:4:"name";s:5:"Alice";s:3:"age";i:30;}"#;
/// let php_value = from_bytes(data).unwrap();
/// let json = to_json(&php_value);
/// assert_eq!(json, serde_json::json!({"name": "Alice", "age": 30}));
/// ```
pub fn to_json(value: &PhpValue) -> JsonValue {
    match value {
        PhpValue::Null => JsonValue::Null,
        PhpValue::Bool(b) => JsonValue::Bool(*b),
        PhpValue::Int(i) => json!(*i),
        PhpValue::Float(f) => {
            if f.is_nan() {
                JsonValue::Null
            } else if f.is_infinite() {
                if f.is_sign_positive() {
                    json!("Infinity")
                } else {
                    json!("-Infinity")
                }
            } else {
                json!(*f)
            }
        }
        PhpValue::String(s) => JsonValue::String(s.to_str_lossy().into_owned()),
        PhpValue::List(items) => JsonValue::Array(items.iter().map(to_json).collect()),
        PhpValue::Map(entries) => {
            let mut map = Map::with_capacity(entries.len());
            for (k, v) in entries {
                map.insert(k.to_str_lossy().into_owned(), to_json(v));
            }
            JsonValue::Object(map)
        }
    }
}

/// Convert a PHP value to a JSON string.
///
/// # Example
///
/// ```rust
/// use php_unserialize_core::{from_bytes, json::to_json_string};
///
/// let data = br#"a:2:{i:0;s:3:"foo";i:1;s:3:"bar";}"#;
/// let php_value = from_bytes(data).unwrap();
/// assert_eq!(to_json_string(&php_value).unwrap(), r#"["foo","bar"]"#);
/// ```
pub fn to_json_string(value: &PhpValue) -> serde_json::Result<String> {
    let json = to_json(value);
    serde_json::to_string(&json)
}

/// Convert a PHP value to a pretty-printed JSON string.
pub fn to_json_string_pretty(value: &PhpValue) -> serde_json::Result<String> {
    let json = to_json(value);
    serde_json::to_string_pretty(&json)
}

impl Serialize for PhpValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PhpValue::Null => serializer.serialize_unit(),
            PhpValue::Bool(b) => serializer.serialize_bool(*b),
            PhpValue::Int(i) => serializer.serialize_i64(*i),
            PhpValue::Float(f) => serializer.serialize_f64(*f),
            PhpValue::String(s) => serializer.serialize_str(&s.to_str_lossy()),
            PhpValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            PhpValue::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(&*k.to_str_lossy(), v)?;
                }
                map.end()
            }
        }
    }
}
