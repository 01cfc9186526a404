//! PHP value types.

use std::fmt;

use bstr::{BStr, BString, ByteSlice};
use indexmap::IndexMap;

/// Key-ordered map produced for associative arrays and objects.
///
/// Keys are raw PHP string bytes; integer array keys are stored in their
/// decimal form. Iteration follows source order.
pub type PhpMap = IndexMap<BString, PhpValue>;

/// A decoded PHP value.
///
/// PHP arrays come out as either [`PhpValue::List`] or [`PhpValue::Map`]
/// depending on their keys; objects always come out as [`PhpValue::Map`]
/// of their property names.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PhpValue {
    /// PHP null value.
    #[default]
    Null,

    /// PHP boolean value.
    Bool(bool),

    /// PHP integer value.
    Int(i64),

    /// PHP float/double value.
    Float(f64),

    /// PHP string value, byte-exact (may contain non-UTF8 bytes).
    String(BString),

    /// Array whose keys were exactly `0, 1, 2, ...` in source order.
    List(Vec<PhpValue>),

    /// Any other array, or an object's properties.
    Map(PhpMap),
}

impl PhpValue {
    /// Check if the value is null.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, PhpValue::Null)
    }

    /// Check if the value is a boolean.
    #[inline]
    pub fn is_bool(&self) -> bool {
        matches!(self, PhpValue::Bool(_))
    }

    /// Check if the value is an integer.
    #[inline]
    pub fn is_int(&self) -> bool {
        matches!(self, PhpValue::Int(_))
    }

    /// Check if the value is a float.
    #[inline]
    pub fn is_float(&self) -> bool {
        matches!(self, PhpValue::Float(_))
    }

    /// Check if the value is a string.
    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, PhpValue::String(_))
    }

    /// Check if the value is a list.
    #[inline]
    pub fn is_list(&self) -> bool {
        matches!(self, PhpValue::List(_))
    }

    /// Check if the value is a map.
    #[inline]
    pub fn is_map(&self) -> bool {
        matches!(self, PhpValue::Map(_))
    }

    /// Get the value as a boolean.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PhpValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the value as an integer.
    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PhpValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a float. Integers are widened.
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PhpValue::Float(f) => Some(*f),
            PhpValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get the raw string bytes.
    #[inline]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            PhpValue::String(s) => Some(s.as_slice()),
            _ => None,
        }
    }

    /// Get the string as UTF-8 text, if it is valid UTF-8.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PhpValue::String(s) => s.to_str().ok(),
            _ => None,
        }
    }

    /// Get the string as text, replacing invalid UTF-8 sequences.
    pub fn to_string_lossy(&self) -> Option<String> {
        match self {
            PhpValue::String(s) => Some(s.to_str_lossy().into_owned()),
            _ => None,
        }
    }

    /// Get the list elements.
    #[inline]
    pub fn as_list(&self) -> Option<&[PhpValue]> {
        match self {
            PhpValue::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Get the map entries.
    #[inline]
    pub fn as_map(&self) -> Option<&PhpMap> {
        match self {
            PhpValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Take the list elements.
    pub fn into_list(self) -> Option<Vec<PhpValue>> {
        match self {
            PhpValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Take the map entries.
    pub fn into_map(self) -> Option<PhpMap> {
        match self {
            PhpValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a map entry by key.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&PhpValue> {
        self.as_map()?.get(BStr::new(key.as_ref()))
    }

    /// Get a type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            PhpValue::Null => "null",
            PhpValue::Bool(_) => "boolean",
            PhpValue::Int(_) => "integer",
            PhpValue::Float(_) => "float",
            PhpValue::String(_) => "string",
            PhpValue::List(_) => "list",
            PhpValue::Map(_) => "map",
        }
    }
}

impl fmt::Display for PhpValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhpValue::Null => write!(f, "null"),
            PhpValue::Bool(b) => write!(f, "{}", b),
            PhpValue::Int(i) => write!(f, "{}", i),
            PhpValue::Float(fl) => write!(f, "{}", fl),
            PhpValue::String(s) => match s.to_str() {
                Ok(s) => write!(f, "\"{}\"", s),
                Err(_) => write!(f, "<binary {} bytes>", s.len()),
            },
            PhpValue::List(items) => {
                write!(f, "[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            PhpValue::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?} => {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for PhpValue {
    fn from(b: bool) -> Self {
        PhpValue::Bool(b)
    }
}

impl From<i64> for PhpValue {
    fn from(i: i64) -> Self {
        PhpValue::Int(i)
    }
}

impl From<f64> for PhpValue {
    fn from(f: f64) -> Self {
        PhpValue::Float(f)
    }
}

impl From<&str> for PhpValue {
    fn from(s: &str) -> Self {
        PhpValue::String(BString::from(s))
    }
}

impl From<Vec<PhpValue>> for PhpValue {
    fn from(items: Vec<PhpValue>) -> Self {
        PhpValue::List(items)
    }
}

impl From<PhpMap> for PhpValue {
    fn from(map: PhpMap) -> Self {
        PhpValue::Map(map)
    }
}
