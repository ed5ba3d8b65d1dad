//! Column description returned by the execute call.
//!
//! This mirrors the engine's cursor description as the bridge reports it.
//! For user-facing API, use `Column`.

use serde::Deserialize;

/// Column description from the execute response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColumnMetadata {
    /// Column name.
    pub name: String,
    /// Engine type name, e.g. `bigint` or `varchar(20)`.
    pub type_code: Option<String>,
    /// Display size, when the engine reports one.
    pub display_size: Option<i64>,
    /// Internal size, when the engine reports one.
    pub internal_size: Option<i64>,
    /// Numeric precision.
    pub precision: Option<i64>,
    /// Numeric scale.
    pub scale: Option<i64>,
    /// Whether NULL values are allowed.
    pub null_ok: Option<bool>,
}

impl ColumnMetadata {
    /// Create new column metadata with minimal info.
    pub fn new(name: impl Into<String>, type_code: Option<String>) -> Self {
        Self {
            name: name.into(),
            type_code,
            ..Self::default()
        }
    }
}
