//! Typed values
//!
//! The closed set of things a key or a value can be.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{EmberError, Result};

/// Wire tag for each value variant
///
/// The discriminant is the byte written to the record header.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Integer = 1,
    Float = 2,
    Text = 3,
}

impl TryFrom<u8> for ValueType {
    type Error = EmberError;

    fn try_from(tag: u8) -> Result<Self> {
        match tag {
            1 => Ok(ValueType::Integer),
            2 => Ok(ValueType::Float),
            3 => Ok(ValueType::Text),
            other => Err(EmberError::InvalidType(format!(
                "unknown type tag 0x{:02x}",
                other
            ))),
        }
    }
}

/// A storable key or value
///
/// Floats compare and hash by bit pattern, so they can key the index:
/// `0.0` and `-0.0` are different keys, and a NaN key matches the same NaN bits.
#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// The wire tag for this variant
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Integer(_) => ValueType::Integer,
            Value::Float(_) => ValueType::Float,
            Value::Text(_) => ValueType::Text,
        }
    }

    /// Length of the encoded payload in bytes (UTF-8 byte count for Text)
    pub fn encoded_len(&self) -> usize {
        match self {
            Value::Integer(_) | Value::Float(_) => 8,
            Value::Text(s) => s.len(),
        }
    }

    /// Append the payload bytes to `buf`
    pub(crate) fn encode_payload(&self, buf: &mut impl bytes::BufMut) {
        match self {
            Value::Integer(i) => buf.put_i64_le(*i),
            Value::Float(f) => buf.put_f64_le(*f),
            Value::Text(s) => buf.put_slice(s.as_bytes()),
        }
    }

    /// Inverse of `encode_payload` for a given tag
    pub(crate) fn decode_payload(value_type: ValueType, payload: &[u8]) -> Result<Self> {
        match value_type {
            ValueType::Integer => Ok(Value::Integer(i64::from_le_bytes(fixed8(payload)?))),
            ValueType::Float => Ok(Value::Float(f64::from_le_bytes(fixed8(payload)?))),
            ValueType::Text => String::from_utf8(payload.to_vec())
                .map(Value::Text)
                .map_err(|e| EmberError::InvalidType(format!("text payload is not UTF-8: {}", e))),
        }
    }

    /// The empty text value used by the decode sentinel
    pub fn empty() -> Self {
        Value::Text(String::new())
    }

    /// Parse a typed literal: `int:42`, `float:1.5`, `text:abc`.
    ///
    /// Anything else, including other `word:` prefixes, is taken as text.
    pub fn parse_typed(input: &str) -> Result<Self> {
        match input.split_once(':') {
            Some(("int", raw)) => raw.trim().parse::<i64>().map(Value::Integer).map_err(|e| {
                EmberError::InvalidType(format!("'{}' is not an integer: {}", raw, e))
            }),
            Some(("float", raw)) => raw.trim().parse::<f64>().map(Value::Float).map_err(|e| {
                EmberError::InvalidType(format!("'{}' is not a float: {}", raw, e))
            }),
            Some(("text", raw)) => Ok(Value::Text(raw.to_string())),
            _ => Ok(Value::Text(input.to_string())),
        }
    }
}

fn fixed8(payload: &[u8]) -> Result<[u8; 8]> {
    payload.try_into().map_err(|_| {
        EmberError::InvalidType(format!(
            "numeric payload must be 8 bytes, got {}",
            payload.len()
        ))
    })
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value_type().hash(state);
        match self {
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}
