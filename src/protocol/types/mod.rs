//! Data types for query results and parameters.

mod column;
mod metadata;
mod row;
mod value;

pub use column::{Column, ColumnInfo};
pub use metadata::ColumnMetadata;
pub use row::Row;
pub use value::{DbType, DbValue};
