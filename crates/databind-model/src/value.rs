//! Cell values and the value types a binding can request.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A single cell value produced by a row.
///
/// Equality and hashing are structural so that tuples of values can be used
/// as map keys. Floats compare by bit pattern, which makes `NaN == NaN` and
/// keeps `Eq` lawful.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// The runtime kind of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    Text,
}

/// The type a binding asks a row value to be delivered as.
///
/// Deserializes through [`FromStr`], so the aliases it accepts (`integer`,
/// `string`, ...) are valid in configuration files too.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ValueType {
    /// Accept the value as produced.
    #[default]
    Any,
    Bool,
    Int,
    Float,
    Text,
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Text(_) => ValueKind::Text,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Returns true if the value can be delivered as `target` without conversion.
    ///
    /// `Null` is assignable to `Any` and `Text` only; the numeric and boolean
    /// types have no null representation.
    pub fn is_assignable_to(&self, target: ValueType) -> bool {
        match (self.kind(), target) {
            (_, ValueType::Any) => true,
            (ValueKind::Null, ValueType::Text) => true,
            (kind, target) => kind.matches(target),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            Value::Null => {}
            Value::Bool(value) => value.hash(state),
            Value::Int(value) => value.hash(state),
            Value::Float(value) => value.to_bits().hash(state),
            Value::Text(value) => value.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Text(value) => f.write_str(value),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
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

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl ValueKind {
    fn matches(self, target: ValueType) -> bool {
        matches!(
            (self, target),
            (ValueKind::Bool, ValueType::Bool)
                | (ValueKind::Int, ValueType::Int)
                | (ValueKind::Float, ValueType::Float)
                | (ValueKind::Text, ValueType::Text)
        )
    }
}

impl ValueType {
    /// The value delivered for this type when a row has nothing to offer.
    pub fn default_value(self) -> Value {
        match self {
            ValueType::Any => Value::Null,
            ValueType::Bool => Value::Bool(false),
            ValueType::Int => Value::Int(0),
            ValueType::Float => Value::Float(0.0),
            ValueType::Text => Value::Text(String::new()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Any => "any",
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Text => "text",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" | "object" => Ok(ValueType::Any),
            "bool" | "boolean" => Ok(ValueType::Bool),
            "int" | "integer" => Ok(ValueType::Int),
            "float" | "double" | "number" => Ok(ValueType::Float),
            "text" | "string" => Ok(ValueType::Text),
            other => Err(format!("unknown value type: {other}")),
        }
    }
}

impl TryFrom<String> for ValueType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn float_equality_uses_bits() {
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_ne!(Value::Float(0.0), Value::Float(-0.0));
        assert_ne!(Value::Int(1), Value::Float(1.0));
    }

    #[test]
    fn values_hash_structurally() {
        let mut set = HashSet::new();
        set.insert(vec![Value::Int(2), Value::text("a")]);
        assert!(set.contains(&vec![Value::Int(2), Value::text("a")]));
        assert!(!set.contains(&vec![Value::Int(2), Value::text("b")]));
    }

    #[test]
    fn null_is_assignable_to_reference_like_types_only() {
        assert!(Value::Null.is_assignable_to(ValueType::Any));
        assert!(Value::Null.is_assignable_to(ValueType::Text));
        assert!(!Value::Null.is_assignable_to(ValueType::Int));
        assert!(Value::Int(3).is_assignable_to(ValueType::Int));
        assert!(!Value::Int(3).is_assignable_to(ValueType::Float));
    }

    #[test]
    fn defaults_per_type() {
        assert_eq!(ValueType::Int.default_value(), Value::Int(0));
        assert_eq!(ValueType::Text.default_value(), Value::text(""));
        assert_eq!(ValueType::Any.default_value(), Value::Null);
    }

    #[test]
    fn parses_type_names() {
        assert_eq!("Integer".parse::<ValueType>(), Ok(ValueType::Int));
        assert_eq!("string".parse::<ValueType>(), Ok(ValueType::Text));
        assert!("date".parse::<ValueType>().is_err());
    }
}
