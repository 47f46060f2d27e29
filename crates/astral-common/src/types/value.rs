//! Attribute values for graph elements.
//!
//! [`Value`] is the dynamic type that attribute slots hold - booleans,
//! numbers, strings. [`AttrType`] is the declared type of an attribute and
//! knows how to parse raw import strings into typed values.

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::utils::error::{Error, Result};

/// The declared type of a registered attribute.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum AttrType {
    /// Boolean attribute.
    Boolean,
    /// 64-bit signed integer attribute.
    Integer,
    /// 64-bit floating point attribute.
    Float,
    /// UTF-8 string attribute.
    String,
}

impl AttrType {
    /// Returns the type name as used in error messages and CLI output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
        }
    }

    /// Parses a raw string (as read from an import file) into a typed value.
    ///
    /// Empty input parses to [`Value::Null`] for every type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Attribute`] if the string is not valid for this type.
    pub fn parse(self, raw: &str) -> Result<Value> {
        if raw.is_empty() {
            return Ok(Value::Null);
        }
        match self {
            Self::Boolean => match raw {
                "true" | "True" | "TRUE" | "1" => Ok(Value::Bool(true)),
                "false" | "False" | "FALSE" | "0" => Ok(Value::Bool(false)),
                _ => Err(Error::Attribute(format!("invalid boolean: {raw:?}"))),
            },
            Self::Integer => raw
                .parse::<i64>()
                .map(Value::Int64)
                .map_err(|_| Error::Attribute(format!("invalid integer: {raw:?}"))),
            Self::Float => raw
                .parse::<f64>()
                .map(Value::Float64)
                .map_err(|_| Error::Attribute(format!("invalid float: {raw:?}"))),
            Self::String => Ok(Value::String(raw.into())),
        }
    }

    /// Returns `true` if `value` is acceptable for an attribute of this type.
    ///
    /// `Null` is acceptable everywhere; integers widen into float slots.
    #[must_use]
    pub const fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Null)
                | (Self::Boolean, Value::Bool(_))
                | (Self::Integer, Value::Int64(_))
                | (Self::Float, Value::Float64(_) | Value::Int64(_))
                | (Self::String, Value::String(_))
        )
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A dynamically-typed attribute value.
///
/// # Examples
///
/// ```
/// use astral_common::types::Value;
///
/// let name = Value::from("Alice");
/// let weight = Value::from(2.5f64);
///
/// assert_eq!(name.as_str(), Some("Alice"));
/// assert_eq!(weight.as_float64(), Some(2.5));
/// ```
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Null/unset value.
    Null,

    /// Boolean value.
    Bool(bool),

    /// 64-bit signed integer.
    Int64(i64),

    /// 64-bit floating point.
    Float64(f64),

    /// UTF-8 string (uses ArcStr for cheap cloning).
    String(ArcStr),
}

impl Value {
    /// Returns `true` if this value is null.
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the boolean value if this is a Bool, otherwise None.
    #[inline]
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer value if this is an Int64, otherwise None.
    #[inline]
    #[must_use]
    pub const fn as_int64(&self) -> Option<i64> {
        match self {
            Value::Int64(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the float value if this is a Float64 (or Int64, widened),
    /// otherwise None.
    #[inline]
    #[must_use]
    pub const fn as_float64(&self) -> Option<f64> {
        match self {
            Value::Float64(f) => Some(*f),
            Value::Int64(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Returns the string value if this is a String, otherwise None.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the type name of this value.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOL",
            Value::Int64(_) => "INT64",
            Value::Float64(_) => "FLOAT64",
            Value::String(_) => "STRING",
        }
    }

    /// Converts this value into the given attribute type, if possible.
    ///
    /// Used by schema migration when an attribute is retyped: integers widen
    /// to floats, anything renders to string, strings re-parse.
    #[must_use]
    pub fn convert_to(&self, ty: AttrType) -> Option<Value> {
        if ty.accepts(self) {
            return Some(self.clone());
        }
        match (self, ty) {
            (Value::Int64(i), AttrType::Float) => Some(Value::Float64(*i as f64)),
            (Value::Float64(f), AttrType::Integer) => Some(Value::Int64(*f as i64)),
            (Value::String(s), _) => ty.parse(s).ok(),
            (v, AttrType::String) => Some(Value::String(v.to_string().into())),
            _ => None,
        }
    }

    /// Serializes this value to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| Error::Corrupt(e.to_string()))
    }

    /// Deserializes a value from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes do not represent a valid Value.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (value, _) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())
            .map_err(|e| Error::Corrupt(e.to_string()))?;
        Ok(value)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int64(i) => write!(f, "Int64({i})"),
            Value::Float64(fl) => write!(f, "Float64({fl})"),
            Value::String(s) => write!(f, "String({s:?})"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, ""),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int64(i) => write!(f, "{i}"),
            Value::Float64(fl) => write!(f, "{fl}"),
            Value::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int64(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int64(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float64(f)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float64(f64::from(f))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.into())
    }
}

impl From<ArcStr> for Value {
    fn from(s: ArcStr) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// A hashable wrapper around [`Value`] for use as a hash-map key.
///
/// `Value` itself cannot implement `Hash` because it contains `f64` (which
/// has NaN issues). This wrapper hashes floats by bit pattern, so
/// `NaN == NaN` (same bits) and positive/negative zero are distinct.
#[derive(Clone, Debug)]
pub struct HashableValue(pub Value);

impl HashableValue {
    /// Creates a new hashable value from a value.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Returns a reference to the inner value.
    #[must_use]
    pub fn inner(&self) -> &Value {
        &self.0
    }

    /// Consumes the wrapper and returns the inner value.
    #[must_use]
    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl Hash for HashableValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(&self.0).hash(state);
        match &self.0 {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int64(i) => i.hash(state),
            Value::Float64(f) => f.to_bits().hash(state),
            Value::String(s) => s.hash(state),
        }
    }
}

impl PartialEq for HashableValue {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Value::Float64(a), Value::Float64(b)) => a.to_bits() == b.to_bits(),
            _ => self.0 == other.0,
        }
    }
}

impl Eq for HashableValue {}

impl From<Value> for HashableValue {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<HashableValue> for Value {
    fn from(hv: HashableValue) -> Self {
        hv.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_checks() {
        assert!(Value::Null.is_null());
        assert!(!Value::Bool(true).is_null());

        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Int64(42).as_bool(), None);

        assert_eq!(Value::Int64(42).as_int64(), Some(42));
        assert_eq!(Value::String("test".into()).as_int64(), None);

        assert_eq!(Value::Float64(1.234).as_float64(), Some(1.234));
        assert_eq!(Value::Int64(2).as_float64(), Some(2.0));
        assert_eq!(Value::String("hello".into()).as_str(), Some("hello"));
    }

    #[test]
    fn test_attr_type_parse() {
        assert_eq!(AttrType::Boolean.parse("true").unwrap(), Value::Bool(true));
        assert_eq!(AttrType::Boolean.parse("0").unwrap(), Value::Bool(false));
        assert_eq!(AttrType::Integer.parse("-3").unwrap(), Value::Int64(-3));
        assert_eq!(AttrType::Float.parse("2.5").unwrap(), Value::Float64(2.5));
        assert_eq!(
            AttrType::String.parse("x").unwrap(),
            Value::String("x".into())
        );

        // Empty string parses to Null regardless of type
        assert_eq!(AttrType::Integer.parse("").unwrap(), Value::Null);

        assert!(AttrType::Integer.parse("abc").is_err());
        assert!(AttrType::Boolean.parse("maybe").is_err());
    }

    #[test]
    fn test_attr_type_accepts() {
        assert!(AttrType::Float.accepts(&Value::Int64(1)));
        assert!(AttrType::Float.accepts(&Value::Float64(1.0)));
        assert!(!AttrType::Integer.accepts(&Value::Float64(1.0)));
        assert!(AttrType::String.accepts(&Value::Null));
        assert!(!AttrType::Boolean.accepts(&Value::String("true".into())));
    }

    #[test]
    fn test_convert_to() {
        assert_eq!(
            Value::Int64(3).convert_to(AttrType::Float),
            Some(Value::Float64(3.0))
        );
        assert_eq!(
            Value::String("4.5".into()).convert_to(AttrType::Float),
            Some(Value::Float64(4.5))
        );
        assert_eq!(
            Value::Float64(1.5).convert_to(AttrType::String),
            Some(Value::String("1.5".into()))
        );
        assert_eq!(Value::Bool(true).convert_to(AttrType::Integer), None);
    }

    #[test]
    fn test_value_serialization_roundtrip() {
        let values = vec![
            Value::Null,
            Value::Bool(true),
            Value::Int64(i64::MAX),
            Value::Float64(std::f64::consts::PI),
            Value::String("hello world".into()),
        ];

        for v in values {
            let bytes = v.to_bytes().unwrap();
            let decoded = Value::from_bytes(&bytes).unwrap();
            assert_eq!(v, decoded);
        }
    }

    #[test]
    fn test_hashable_value_float_edge_cases() {
        use std::collections::HashMap;

        let mut map: HashMap<HashableValue, i32> = HashMap::new();

        let nan = f64::NAN;
        map.insert(HashableValue::new(Value::Float64(nan)), 1);
        assert_eq!(map.get(&HashableValue::new(Value::Float64(nan))), Some(&1));

        map.insert(HashableValue::new(Value::Float64(0.0)), 2);
        map.insert(HashableValue::new(Value::Float64(-0.0)), 3);
        assert_eq!(map.get(&HashableValue::new(Value::Float64(0.0))), Some(&2));
        assert_eq!(map.get(&HashableValue::new(Value::Float64(-0.0))), Some(&3));
    }
}
