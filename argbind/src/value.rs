use std::fmt;

use serde::{Deserialize, Serialize};

/// A value produced by the parser and handed to a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Nil,
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    List(Vec<Value>),
}

impl Value {
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(value) => Some(*value),
            Value::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(values) => Some(values),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::String(value) => write!(f, "{value}"),
            Value::List(values) => {
                write!(f, "[")?;
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

/// Primitive type a command-line token is converted to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ValueType {
    #[default]
    String,
    Int,
    Float,
    Bool,
}

impl ValueType {
    /// Converts one raw token.
    pub fn parse(self, raw: &str) -> Result<Value, String> {
        match self {
            ValueType::String => Ok(Value::String(raw.to_string())),
            ValueType::Int => raw
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|err| err.to_string()),
            ValueType::Float => raw
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|err| err.to_string()),
            ValueType::Bool => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "y" => Ok(Value::Bool(true)),
                "false" | "0" | "no" | "n" => Ok(Value::Bool(false)),
                _ => Err(format!("invalid boolean '{}'", raw)),
            },
        }
    }

    /// Converts a declared default or allowed value to this type.
    pub fn coerce(self, value: &Value) -> Result<Value, String> {
        match (self, value) {
            (_, Value::Nil) => Ok(Value::Nil),
            (ValueType::String, Value::String(_))
            | (ValueType::Int, Value::Int(_))
            | (ValueType::Float, Value::Float(_))
            | (ValueType::Bool, Value::Bool(_)) => Ok(value.clone()),
            (ValueType::String, Value::List(_)) => {
                Err(format!("expected {}, found a list", self.describe()))
            }
            (ValueType::String, other) => Ok(Value::String(other.to_string())),
            (ValueType::Float, Value::Int(value)) => Ok(Value::Float(*value as f64)),
            (_, Value::String(text)) => self.parse(text),
            (_, Value::List(_)) => Err(format!("expected {}, found a list", self.describe())),
            (_, other) => Err(format!("expected {}, found '{}'", self.describe(), other)),
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            ValueType::String => "a String",
            ValueType::Int => "an Int",
            ValueType::Float => "a Float",
            ValueType::Bool => "a Bool",
        }
    }
}
