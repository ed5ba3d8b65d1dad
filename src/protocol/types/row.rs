//! Owned snapshot of one reader row.

use std::sync::Arc;

use super::column::{Column, ColumnInfo};
use super::value::DbValue;

/// One row, detached from its reader.
///
/// Values are aligned to the reader's frozen column order; the column
/// description is shared by every row of the same result.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: Vec<DbValue>,
    columns: Arc<ColumnInfo>,
}

impl Row {
    pub(crate) fn new(values: Vec<DbValue>, columns: Arc<ColumnInfo>) -> Self {
        Self { values, columns }
    }

    /// Value at `index`, `None` past the last column.
    pub fn get(&self, index: usize) -> Option<&DbValue> {
        self.values.get(index)
    }

    /// Value of the named column, matched like `DataReader::ordinal`.
    pub fn get_by_name(&self, name: &str) -> Option<&DbValue> {
        self.columns
            .find_by_name(name)
            .and_then(|idx| self.values.get(idx))
    }

    pub fn values(&self) -> &[DbValue] {
        &self.values
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.column_names()
    }

    /// Take the values, dropping the column description.
    pub fn into_values(self) -> Vec<DbValue> {
        self.values
    }
}
