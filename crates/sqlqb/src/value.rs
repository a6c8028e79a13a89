//! Bound values.
//!
//! Every value that reaches a placeholder is a [`Value`]: a scalar or NULL.
//! Non-scalar input can only arrive through dynamically typed data (JSON),
//! and [`Value::from_json`] rejects it before it ever reaches a query.

use crate::error::{QbError, QbResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// A scalar bind value or NULL.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// Whether this value is NULL (rendered as the bare `NULL` token, never bound).
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short type name used in error messages and logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
        }
    }

    /// Convert a JSON value into a scalar, rejecting arrays and objects.
    ///
    /// `column` is only used to label the error.
    pub fn from_json(column: &str, json: serde_json::Value) -> QbResult<Self> {
        use serde_json::Value as Json;

        match json {
            Json::Null => Ok(Value::Null),
            Json::Bool(b) => Ok(Value::Bool(b)),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Ok(Value::UInt(u))
                } else if let Some(f) = n.as_f64() {
                    Ok(Value::Float(f))
                } else {
                    Err(QbError::NonScalarValue {
                        column: column.to_string(),
                        found: format!("unrepresentable number {n}"),
                    })
                }
            }
            Json::String(s) => Ok(Value::Text(s)),
            Json::Array(_) => Err(QbError::NonScalarValue {
                column: column.to_string(),
                found: "array".to_string(),
            }),
            Json::Object(_) => Err(QbError::NonScalarValue {
                column: column.to_string(),
                found: "object".to_string(),
            }),
        }
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = QbError;

    fn try_from(json: serde_json::Value) -> QbResult<Self> {
        Value::from_json("<value>", json)
    }
}

macro_rules! impl_value_from {
    ($($ty:ty => |$v:ident| $conv:expr),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from($v: $ty) -> Self {
                    $conv
                }
            }

            impl From<Option<$ty>> for Value {
                fn from(value: Option<$ty>) -> Self {
                    value.map(Value::from).unwrap_or(Value::Null)
                }
            }
        )*
    };
}

impl_value_from! {
    bool => |v| Value::Bool(v),
    i8 => |v| Value::Int(i64::from(v)),
    i16 => |v| Value::Int(i64::from(v)),
    i32 => |v| Value::Int(i64::from(v)),
    i64 => |v| Value::Int(v),
    u8 => |v| Value::UInt(u64::from(v)),
    u16 => |v| Value::UInt(u64::from(v)),
    u32 => |v| Value::UInt(u64::from(v)),
    u64 => |v| Value::UInt(v),
    f32 => |v| Value::Float(f64::from(v)),
    f64 => |v| Value::Float(v),
    String => |v| Value::Text(v),
    Vec<u8> => |v| Value::Bytes(v),
    NaiveDate => |v| Value::Text(v.format("%Y-%m-%d").to_string()),
    NaiveDateTime => |v| Value::Text(v.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
    DateTime<Utc> => |v| Value::from(v.naive_utc()),
}

#[cfg(feature = "uuid")]
impl_value_from! {
    uuid::Uuid => |v| Value::Text(v.hyphenated().to_string()),
}

#[cfg(feature = "rust_decimal")]
impl_value_from! {
    rust_decimal::Decimal => |v| Value::Text(v.to_string()),
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<Option<&str>> for Value {
    fn from(value: Option<&str>) -> Self {
        value.map(Value::from).unwrap_or(Value::Null)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::Text(value.clone())
    }
}
