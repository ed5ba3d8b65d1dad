//! Column and ColumnInfo types for user-facing API.
//!
//! Column order comes from the first row the cursor returns; the execute
//! description, when present, only enriches those columns with type data.

use super::metadata::ColumnMetadata;
use super::value::DbType;

/// A column in a result set (user-facing representation).
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Declared type, when the execute description carries one.
    pub data_type: Option<DbType>,
    /// Raw engine type name.
    pub type_code: Option<String>,
    /// Whether NULL values are allowed, when reported.
    pub nullable: Option<bool>,
}

impl Column {
    /// Create a column with no declared type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: None,
            type_code: None,
            nullable: None,
        }
    }

    /// Create a column from the execute description.
    pub fn from_metadata(meta: &ColumnMetadata) -> Self {
        Self {
            name: meta.name.clone(),
            data_type: meta.type_code.as_deref().map(DbType::from_type_code),
            type_code: meta.type_code.clone(),
            nullable: meta.null_ok,
        }
    }
}

/// Shared column information for all rows in a result set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnInfo {
    /// Column definitions.
    pub columns: Vec<Column>,
}

impl ColumnInfo {
    /// Create new column info from columns.
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Build column info for the given names, enriched from the description.
    pub fn from_names<'a>(
        names: impl IntoIterator<Item = &'a str>,
        metadata: &[ColumnMetadata],
    ) -> Self {
        let columns = names
            .into_iter()
            .map(|name| {
                metadata
                    .iter()
                    .find(|m| m.name == name)
                    .map(Column::from_metadata)
                    .unwrap_or_else(|| Column::new(name))
            })
            .collect();
        Self { columns }
    }

    /// Get column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Get column by index.
    pub fn get(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Find column index by name.
    ///
    /// An exact match wins over a case-insensitive one.
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .or_else(|| {
                let lower = name.to_lowercase();
                self.columns
                    .iter()
                    .position(|c| c.name.to_lowercase() == lower)
            })
    }
}
