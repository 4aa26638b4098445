//! JSON encoding of interpreter results.
//!
//! Key order is part of the output contract, so every type serializes
//! through an explicit map rather than a derive.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::InterpretError;
use crate::tree::{SceneGraph, SceneNode, SizeNode};
use crate::value::Value;
use crate::Output;

/// JSON formatting style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    /// Compact: no whitespace between tokens.
    Compact,
    /// Pretty: 2-space indented, one entry per line.
    #[default]
    Pretty,
}

/// Serialize to compact JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    write(value, JsonStyle::Compact)
}

/// Serialize to pretty-printed JSON (2-space indent).
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> String {
    write(value, JsonStyle::Pretty)
}

pub fn write<T: Serialize + ?Sized>(value: &T, style: JsonStyle) -> String {
    let encoded = match style {
        JsonStyle::Compact => serde_json::to_string(value),
        JsonStyle::Pretty => serde_json::to_string_pretty(value),
    };
    // Only non-string map keys can fail, and none of these types produce them.
    encoded.unwrap_or_else(|_| String::from("null"))
}

/// A number that prints integral values without a fractional part.
struct Number(f64);

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let n = self.0;
        // Integers that fit in 2^53 print as integers
        if n.is_finite() && n == n.trunc() && n.abs() < (1u64 << 53) as f64 {
            serializer.serialize_i64(n as i64)
        } else {
            serializer.serialize_f64(n)
        }
    }
}

impl Serialize for InterpretError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("type", self.kind.as_str())?;
        map.serialize_entry("message", &self.message)?;
        map.serialize_entry("line", &self.line())?;
        map.serialize_entry("column", &self.column())?;
        map.end()
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if matches!(self, Value::Attribute { .. }) { 3 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("type", self.type_name())?;
        match *self {
            Value::Null => map.serialize_entry("value", &())?,
            Value::Int(n) => map.serialize_entry("value", &n)?,
            Value::Float(n) => map.serialize_entry("value", &Number(n))?,
            Value::Boolean(b) => map.serialize_entry("value", &b)?,
            Value::Attribute { key, value } => {
                map.serialize_entry("key", key.as_str())?;
                map.serialize_entry("value", &Number(value))?;
            }
        }
        map.end()
    }
}

impl Serialize for SizeNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("id", "size")?;
        map.serialize_entry("width", &Number(self.width))?;
        map.serialize_entry("height", &Number(self.height))?;
        map.end()
    }
}

impl Serialize for SceneNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("parent", &self.parent)?;
        map.serialize_entry("tag", &self.tag)?;
        for (key, value) in &self.attributes {
            map.serialize_entry(key, &Number(*value))?;
        }
        if let Some(children) = &self.children {
            map.serialize_entry("children", children)?;
        }
        map.end()
    }
}

impl Serialize for SceneGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("size", &self.size)?;
        map.serialize_entry("grid", &self.grid)?;
        map.end()
    }
}

/// `{success, error}` on failure; `{success, log, data}` on success, with
/// `data` null when no size block ran.
impl Serialize for Output {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("success", &self.success)?;
        if let Some(error) = &self.error {
            map.serialize_entry("error", error)?;
        }
        if self.success {
            map.serialize_entry("log", &self.log.unwrap_or_default())?;
            map.serialize_entry("data", &self.data)?;
        }
        map.end()
    }
}
