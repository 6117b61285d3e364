//! Embedding byte arrays in JSON-shaped documents.
//!
//! JSON has no binary type, so [`Value::Bytes`] leaves travel as strings
//! tagged with [`BYTES_PREFIX`] followed by standard base64. The mapping is
//! applied recursively through lists and maps.

use std::collections::BTreeMap;

use serde_json::{Map, Number};

use crate::base64url::{decode_bytes, encode_bytes};
use crate::error::Result;

/// Tag marking a JSON string as base64-packed bytes.
pub const BYTES_PREFIX: &str = "data:;base64,";

/// Document value that can hold raw bytes next to ordinary JSON data.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Number(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value.into())
    }
}

/// Lower a [`Value`] into plain JSON, packing every byte leaf as text.
pub fn encode_value(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => serde_json::Value::Number(n.clone()),
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Bytes(bytes) => {
            serde_json::Value::String(format!("{BYTES_PREFIX}{}", encode_bytes(bytes)))
        }
        Value::List(items) => serde_json::Value::Array(items.iter().map(encode_value).collect()),
        Value::Map(entries) => serde_json::Value::Object(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), encode_value(value)))
                .collect::<Map<_, _>>(),
        ),
    }
}

/// Lift plain JSON back into a [`Value`], unpacking tagged strings into
/// bytes.
pub fn decode_value(json: &serde_json::Value) -> Result<Value> {
    Ok(match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => Value::Number(n.clone()),
        serde_json::Value::String(s) => match s.strip_prefix(BYTES_PREFIX) {
            Some(encoded) => Value::Bytes(decode_bytes(encoded)?),
            None => Value::Text(s.clone()),
        },
        serde_json::Value::Array(items) => {
            Value::List(items.iter().map(decode_value).collect::<Result<_>>()?)
        }
        serde_json::Value::Object(entries) => Value::Map(
            entries
                .iter()
                .map(|(key, value)| decode_value(value).map(|value| (key.clone(), value)))
                .collect::<Result<_>>()?,
        ),
    })
}
