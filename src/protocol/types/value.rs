//! Cell values decoded from the bridge's JSON payloads.

use crate::error::{Error, Result};
use crate::protocol::decode::{f64_to_i64, parse_datetime, parse_f64, parse_i64};
use chrono::NaiveDateTime;
use serde_json::{Number, Value};
use std::fmt;

/// A single cell or parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum DbValue {
    /// Database NULL.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int64(i64),
    /// Floating-point value (also integers beyond the `i64` range).
    Float64(f64),
    /// Text value. Temporal and decimal engine types arrive as text too.
    String(String),
    /// Arrays, maps and rows, kept as raw JSON text.
    Opaque(String),
}

/// Scalar type of a column, as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbType {
    Null,
    Bool,
    Int64,
    Float64,
    String,
    DateTime,
    Opaque,
}

impl DbType {
    /// Map an engine type name (e.g. `"bigint"`, `"varchar(20)"`).
    pub fn from_type_code(code: &str) -> Self {
        let lower = code.trim().to_lowercase();
        let base = lower.split('(').next().unwrap_or_default().trim();
        match base {
            "boolean" => DbType::Bool,
            "tinyint" | "smallint" | "integer" | "int" | "bigint" => DbType::Int64,
            "real" | "double" | "float" => DbType::Float64,
            "date" | "timestamp" | "timestamp with time zone" => DbType::DateTime,
            "array" | "map" | "row" | "json" => DbType::Opaque,
            _ => DbType::String,
        }
    }
}

impl DbValue {
    /// Decode one JSON cell.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => DbValue::Null,
            Value::Bool(b) => DbValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => DbValue::Int64(i),
                // u64 beyond i64::MAX and true floats
                None => DbValue::Float64(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => DbValue::String(s.clone()),
            other => DbValue::Opaque(other.to_string()),
        }
    }

    /// Encode as an outgoing positional parameter.
    pub fn to_json(&self) -> Result<Value> {
        Ok(match self {
            DbValue::Null => Value::Null,
            DbValue::Bool(b) => Value::Bool(*b),
            DbValue::Int64(i) => Value::Number((*i).into()),
            DbValue::Float64(f) => Number::from_f64(*f).map(Value::Number).ok_or_else(|| {
                Error::type_coercion(format!("non-finite value {} cannot be sent", f))
            })?,
            DbValue::String(s) => Value::String(s.clone()),
            DbValue::Opaque(raw) => {
                serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone()))
            }
        })
    }

    /// Check if the value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, DbValue::Null)
    }

    /// Scalar type of this value.
    pub fn db_type(&self) -> DbType {
        match self {
            DbValue::Null => DbType::Null,
            DbValue::Bool(_) => DbType::Bool,
            DbValue::Int64(_) => DbType::Int64,
            DbValue::Float64(_) => DbType::Float64,
            DbValue::String(_) => DbType::String,
            DbValue::Opaque(_) => DbType::Opaque,
        }
    }

    /// Try to get the value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DbValue::String(s) | DbValue::Opaque(s) => Some(s),
            _ => None,
        }
    }

    fn null_error(target: &str) -> Error {
        Error::type_coercion(format!("cannot convert NULL to {}", target))
    }

    /// Coerce to `i64`.
    pub fn to_i64(&self) -> Result<i64> {
        match self {
            DbValue::Int64(i) => Ok(*i),
            DbValue::Float64(f) => f64_to_i64(*f),
            DbValue::Bool(b) => Ok(i64::from(*b)),
            DbValue::String(s) => parse_i64(s),
            DbValue::Null => Err(Self::null_error("Int64")),
            DbValue::Opaque(raw) => Err(Error::type_coercion(format!(
                "cannot convert {} to Int64",
                raw
            ))),
        }
    }

    /// Coerce to `f64`.
    pub fn to_f64(&self) -> Result<f64> {
        match self {
            DbValue::Int64(i) => Ok(*i as f64),
            DbValue::Float64(f) => Ok(*f),
            DbValue::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            DbValue::String(s) => parse_f64(s),
            DbValue::Null => Err(Self::null_error("Double")),
            DbValue::Opaque(raw) => Err(Error::type_coercion(format!(
                "cannot convert {} to Double",
                raw
            ))),
        }
    }

    /// Coerce to text. Every non-NULL value has one.
    pub fn to_string_value(&self) -> Result<String> {
        match self {
            DbValue::Null => Err(Self::null_error("String")),
            other => Ok(other.to_string()),
        }
    }

    /// Coerce to `bool`.
    pub fn to_bool(&self) -> Result<bool> {
        match self {
            DbValue::Bool(b) => Ok(*b),
            DbValue::Int64(i) => Ok(*i != 0),
            DbValue::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(Error::type_coercion(format!(
                    "cannot convert '{}' to Boolean",
                    s
                ))),
            },
            DbValue::Null => Err(Self::null_error("Boolean")),
            other => Err(Error::type_coercion(format!(
                "cannot convert {} to Boolean",
                other
            ))),
        }
    }

    /// Coerce to a timestamp.
    pub fn to_datetime(&self) -> Result<NaiveDateTime> {
        match self {
            DbValue::String(s) => parse_datetime(s),
            DbValue::Null => Err(Self::null_error("DateTime")),
            other => Err(Error::type_coercion(format!(
                "cannot convert {} to DateTime",
                other
            ))),
        }
    }
}

impl fmt::Display for DbValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbValue::Null => write!(f, "NULL"),
            DbValue::Bool(b) => write!(f, "{}", b),
            DbValue::Int64(i) => write!(f, "{}", i),
            DbValue::Float64(v) => write!(f, "{}", v),
            DbValue::String(s) => write!(f, "{}", s),
            DbValue::Opaque(raw) => write!(f, "{}", raw),
        }
    }
}

impl From<bool> for DbValue {
    fn from(v: bool) -> Self {
        DbValue::Bool(v)
    }
}

impl From<i32> for DbValue {
    fn from(v: i32) -> Self {
        DbValue::Int64(v.into())
    }
}

impl From<i64> for DbValue {
    fn from(v: i64) -> Self {
        DbValue::Int64(v)
    }
}

impl From<f64> for DbValue {
    fn from(v: f64) -> Self {
        DbValue::Float64(v)
    }
}

impl From<&str> for DbValue {
    fn from(v: &str) -> Self {
        DbValue::String(v.to_string())
    }
}

impl From<String> for DbValue {
    fn from(v: String) -> Self {
        DbValue::String(v)
    }
}

impl<T: Into<DbValue>> From<Option<T>> for DbValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(DbValue::Null, Into::into)
    }
}
