use crate::token::AttributeName;

/// The result of evaluating a node.
///
/// `Int` and `Float` are distinct: arithmetic on two `Int`s stays integral
/// (floor division, floored exponent), anything involving a `Float` does not.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Int(i64),
    Float(f64),
    Boolean(bool),
    /// A declared attribute, e.g. the result of `width 30`.
    Attribute { key: AttributeName, value: f64 },
}

impl Value {
    /// The type name used in JSON output and diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Boolean(_) => "Boolean",
            Value::Attribute { .. } => "Attribute",
        }
    }

    /// The numeric payload of an `Int` or `Float`.
    pub fn as_number(&self) -> Option<f64> {
        match *self {
            Value::Int(n) => Some(n as f64),
            Value::Float(n) => Some(n),
            _ => None,
        }
    }
}
