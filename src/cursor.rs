//! Forward-only reader over a remote cursor.
//!
//! The bridge only offers bounded fetches; [`DataReader`] stitches those
//! batches into one forward-only sequence of rows. The `Cursor` trait and
//! [`CursorStreamExt`] expose the same sequence as owned [`Row`]s.

use crate::error::{Error, Result};
use crate::protocol::constants::ROWS_AFFECTED_UNKNOWN;
use crate::protocol::messages::FetchMessage;
use crate::protocol::response::ExecuteReply;
use crate::protocol::transport::{HttpTransport, Transport};
use crate::protocol::types::{Column, ColumnInfo, ColumnMetadata, DbType, DbValue, Row};
use crate::statement::Statement;
use chrono::NaiveDateTime;
use futures::Stream;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Base trait for cursor types.
///
/// # Example
///
/// ```no_run
/// use trino_bridge_rs::{Connection, Cursor, Row};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let conn = Connection::new("server=localhost;port=8991;host=trino;port=8080;user=alice");
///     conn.open().await?;
///
///     async fn count_rows<C: Cursor<Item = Row>>(cursor: &mut C) -> u64 {
///         let mut count = 0;
///         while let Some(_) = cursor.next().await.unwrap() {
///             count += 1;
///         }
///         count
///     }
///
///     let mut stmt = conn.create_statement();
///     stmt.set_command_text("SELECT * FROM tpch.tiny.nation").await;
///     let mut reader = stmt.execute().await?;
///     let total = count_rows(&mut reader).await;
///     reader.close().await;
///
///     Ok(())
/// }
/// ```
pub trait Cursor {
    /// The type of item this cursor yields.
    type Item;

    /// Columns, empty until the first row arrives.
    fn columns(&self) -> &[Column];

    /// Number of rows fetched so far.
    fn rowcount(&self) -> u64;

    fn is_closed(&self) -> bool;

    /// Check if more items are available (buffered or on server).
    fn has_more(&self) -> bool;

    /// Rows requested per fetch.
    fn fetch_size(&self) -> u32;

    /// Close the cursor and release server resources.
    fn close(&mut self) -> impl Future<Output = ()> + Send;

    /// Get the next item, fetching from server if the batch is exhausted.
    ///
    /// Returns `Ok(None)` when exhausted.
    fn next(&mut self) -> impl Future<Output = Result<Option<Self::Item>>> + Send;

    /// Fetch all remaining items, then close the cursor.
    fn fetch_all(&mut self) -> impl Future<Output = Result<Vec<Self::Item>>> + Send;
}

/// Forward-only reader over one remote cursor.
///
/// Mutably borrows its [`Statement`], so the statement cannot be changed or
/// re-executed while the reader is alive.
///
/// # Lifecycle
///
/// 1. Created by `Statement::execute()`, first batch already fetched
/// 2. Advanced with `read()`; further batches are fetched on demand
/// 3. Released with `close()`
pub struct DataReader<'s, T: Transport = HttpTransport> {
    statement: &'s mut Statement<T>,
    cursor_id: String,
    base_url: String,
    timeout: Option<Duration>,
    /// Rows requested per fetch.
    batch_size: u32,
    /// Description from the execute reply.
    metadata: Vec<ColumnMetadata>,
    /// Column order, frozen by the first non-empty batch.
    columns: Option<Arc<ColumnInfo>>,
    /// Current batch, aligned to `columns`.
    batch: Vec<Vec<DbValue>>,
    /// Position in `batch`; -1 is before the first row.
    index: isize,
    more_rows: bool,
    exhausted: bool,
    closed: bool,
    records_affected: i64,
    rows_fetched: u64,
}

impl<'s, T: Transport> DataReader<'s, T> {
    /// Build a reader for an executed cursor and fetch its first batch.
    ///
    /// A failed first fetch releases the cursor.
    pub(crate) async fn open(
        statement: &'s mut Statement<T>,
        cursor_id: String,
        base_url: String,
        timeout: Option<Duration>,
        batch_size: u32,
        executed: ExecuteReply,
    ) -> Result<Self> {
        let records_affected = executed
            .rowcount
            .filter(|count| *count >= 0)
            .unwrap_or(ROWS_AFFECTED_UNKNOWN);

        let mut reader = Self {
            statement,
            cursor_id,
            base_url,
            timeout,
            batch_size,
            metadata: executed.columns.unwrap_or_default(),
            columns: None,
            batch: Vec::new(),
            index: -1,
            more_rows: true,
            exhausted: false,
            closed: false,
            records_affected,
            rows_fetched: 0,
        };

        if let Err(e) = reader.fetch_next_batch().await {
            reader.close().await;
            return Err(e);
        }
        Ok(reader)
    }

    /// Fetch the next batch, replacing the current one.
    ///
    /// Either the whole batch decodes or the reader is left untouched.
    async fn fetch_next_batch(&mut self) -> Result<()> {
        let reply = self
            .statement
            .connection()
            .call(
                &FetchMessage::new(&self.cursor_id, self.batch_size),
                &self.base_url,
                self.timeout,
            )
            .await?;

        let (columns, rows) = self.decode_batch(reply.rows)?;
        tracing::debug!(
            cursor_id = %self.cursor_id,
            rows = rows.len(),
            has_more = reply.has_more,
            "fetched batch"
        );

        if self.columns.is_none() {
            self.columns = columns;
        }
        self.rows_fetched += rows.len() as u64;
        self.batch = rows;
        self.more_rows = reply.has_more;
        Ok(())
    }

    /// Align raw rows to the column order, freezing it if needed.
    fn decode_batch(
        &self,
        rows: Vec<Value>,
    ) -> Result<(Option<Arc<ColumnInfo>>, Vec<Vec<DbValue>>)> {
        let columns = match (&self.columns, rows.first()) {
            (Some(columns), _) => Arc::clone(columns),
            (None, Some(first)) => Arc::new(self.columns_from_row(first)?),
            (None, None) => return Ok((None, Vec::new())),
        };

        let decoded = rows
            .iter()
            .map(|row| align_row(row, &columns))
            .collect::<Result<Vec<_>>>()?;
        Ok((Some(columns), decoded))
    }

    fn columns_from_row(&self, row: &Value) -> Result<ColumnInfo> {
        match row {
            Value::Object(map) => Ok(ColumnInfo::from_names(
                map.keys().map(String::as_str),
                &self.metadata,
            )),
            Value::Array(values) => {
                let columns = (0..values.len())
                    .map(|i| match self.metadata.get(i) {
                        Some(meta) => Column::from_metadata(meta),
                        None => Column::new(format!("column{}", i)),
                    })
                    .collect();
                Ok(ColumnInfo::new(columns))
            }
            other => Err(malformed_row(other)),
        }
    }

    /// Advance to the next row. Returns `false` once the rows are exhausted,
    /// and keeps returning `false` without contacting the service.
    pub async fn read(&mut self) -> Result<bool> {
        self.ensure_open()?;
        if self.exhausted {
            return Ok(false);
        }

        let next = self.index + 1;
        if next as usize >= self.batch.len() && self.more_rows {
            self.fetch_next_batch().await?;
            self.index = 0;
        } else {
            self.index = next;
        }

        if (self.index as usize) < self.batch.len() {
            Ok(true)
        } else {
            self.exhausted = true;
            Ok(false)
        }
    }

    /// Always `false`: one result set per execution.
    pub fn next_result(&self) -> bool {
        false
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(Error::invalid_state("reader is closed"))
        } else {
            Ok(())
        }
    }

    fn current(&self) -> Result<&[DbValue]> {
        self.ensure_open()?;
        if self.exhausted {
            return Err(Error::invalid_state("no current row: reader is exhausted"));
        }
        if self.index < 0 {
            return Err(Error::invalid_state("no current row: call read() first"));
        }
        self.batch
            .get(self.index as usize)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::invalid_state("no current row"))
    }

    fn column_info(&self) -> &[Column] {
        self.columns
            .as_deref()
            .map(|info| info.columns.as_slice())
            .unwrap_or_default()
    }

    /// Number of columns; zero when the query produced no rows.
    pub fn field_count(&self) -> usize {
        self.column_info().len()
    }

    /// Name of column `index`.
    pub fn column_name(&self, index: usize) -> Result<&str> {
        self.ensure_open()?;
        self.column_info()
            .get(index)
            .map(|c| c.name.as_str())
            .ok_or(Error::ColumnIndexOutOfBounds {
                index,
                count: self.field_count(),
            })
    }

    /// Index of the named column.
    pub fn ordinal(&self, name: &str) -> Result<usize> {
        self.ensure_open()?;
        self.columns
            .as_ref()
            .and_then(|info| info.find_by_name(name))
            .ok_or_else(|| Error::ColumnNotFound {
                name: name.to_string(),
            })
    }

    /// Scalar type of column `index`: the declared type when the service
    /// described it, otherwise the type of the current value.
    pub fn field_type(&self, index: usize) -> Result<DbType> {
        self.ensure_open()?;
        let column = self
            .column_info()
            .get(index)
            .ok_or(Error::ColumnIndexOutOfBounds {
                index,
                count: self.field_count(),
            })?;
        match column.data_type {
            Some(data_type) => Ok(data_type),
            None => Ok(self.value(index)?.db_type()),
        }
    }

    /// Value of column `index` in the current row.
    pub fn value(&self, index: usize) -> Result<&DbValue> {
        let row = self.current()?;
        row.get(index).ok_or(Error::ColumnIndexOutOfBounds {
            index,
            count: row.len(),
        })
    }

    /// Whether column `index` of the current row is NULL.
    pub fn is_null(&self, index: usize) -> Result<bool> {
        Ok(self.value(index)?.is_null())
    }

    pub fn get_i64(&self, index: usize) -> Result<i64> {
        self.value(index)?.to_i64()
    }

    pub fn get_f64(&self, index: usize) -> Result<f64> {
        self.value(index)?.to_f64()
    }

    pub fn get_string(&self, index: usize) -> Result<String> {
        self.value(index)?.to_string_value()
    }

    pub fn get_bool(&self, index: usize) -> Result<bool> {
        self.value(index)?.to_bool()
    }

    pub fn get_datetime(&self, index: usize) -> Result<NaiveDateTime> {
        self.value(index)?.to_datetime()
    }

    /// Snapshot of the current row.
    pub fn current_row(&self) -> Result<Row> {
        let values = self.current()?.to_vec();
        let columns = self.columns.clone().unwrap_or_default();
        Ok(Row::new(values, columns))
    }

    /// Columns, empty until the first row arrives.
    pub fn columns(&self) -> &[Column] {
        self.column_info()
    }

    /// Description reported by the execute call.
    pub fn schema(&self) -> &[ColumnMetadata] {
        &self.metadata
    }

    /// Row count reported by the service, `-1` when not reported.
    pub fn records_affected(&self) -> i64 {
        self.records_affected
    }

    /// Whether the query produced at least one row.
    pub fn has_rows(&self) -> bool {
        self.rows_fetched > 0
    }

    pub fn cursor_id(&self) -> &str {
        &self.cursor_id
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Release the remote cursor. Idempotent; failures are swallowed.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.statement.release_active_cursor().await;
        self.closed = true;
        self.batch.clear();
        self.more_rows = false;
    }
}

fn align_row(row: &Value, columns: &ColumnInfo) -> Result<Vec<DbValue>> {
    match row {
        Value::Object(map) => Ok(columns
            .columns
            .iter()
            .map(|c| map.get(&c.name).map_or(DbValue::Null, DbValue::from_json))
            .collect()),
        Value::Array(values) => Ok((0..columns.len())
            .map(|i| values.get(i).map_or(DbValue::Null, DbValue::from_json))
            .collect()),
        other => Err(malformed_row(other)),
    }
}

fn malformed_row(row: &Value) -> Error {
    Error::fetch(format!("malformed row: expected object or array, got {}", row))
}

impl<'s, T: Transport> Cursor for DataReader<'s, T> {
    type Item = Row;

    fn columns(&self) -> &[Column] {
        self.column_info()
    }

    fn rowcount(&self) -> u64 {
        self.rows_fetched
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn has_more(&self) -> bool {
        !self.closed
            && !self.exhausted
            && (((self.index + 1) as usize) < self.batch.len() || self.more_rows)
    }

    fn fetch_size(&self) -> u32 {
        self.batch_size
    }

    async fn close(&mut self) {
        DataReader::close(self).await
    }

    async fn next(&mut self) -> Result<Option<Self::Item>> {
        if self.read().await? {
            self.current_row().map(Some)
        } else {
            Ok(None)
        }
    }

    async fn fetch_all(&mut self) -> Result<Vec<Self::Item>> {
        let mut rows = Vec::new();
        let result = loop {
            match Cursor::next(self).await {
                Ok(Some(row)) => rows.push(row),
                Ok(None) => break Ok(rows),
                Err(e) => break Err(e),
            }
        };
        DataReader::close(self).await;
        result
    }
}

/// Extension trait for converting Cursor to Stream.
///
/// # Example
///
/// ```no_run
/// use trino_bridge_rs::{Connection, CursorStreamExt};
/// use futures::stream::TryStreamExt;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let conn = Connection::new("server=localhost;port=8991;host=trino;port=8080;user=alice");
///     conn.open().await?;
///
///     let mut stmt = conn.create_statement();
///     stmt.set_command_text("SELECT name FROM tpch.tiny.nation").await;
///     let reader = stmt.execute().await?;
///
///     let names: Vec<String> = reader
///         .into_stream()
///         .map_ok(|row| row.get(0).unwrap().to_string())
///         .try_collect()
///         .await?;
///
///     stmt.close().await;
///     Ok(())
/// }
/// ```
pub trait CursorStreamExt: Cursor + Sized {
    /// Convert this cursor into a Stream yielding `Result<Item>`.
    ///
    /// The stream takes ownership of the cursor. Each call to `poll_next`
    /// will call `cursor.next()` internally.
    fn into_stream(self) -> impl Stream<Item = Result<Self::Item>>;
}

impl<C: Cursor + Unpin> CursorStreamExt for C {
    fn into_stream(self) -> impl Stream<Item = Result<Self::Item>> {
        use futures::stream;

        stream::unfold(Some(self), |opt_cursor| async move {
            let mut cursor = opt_cursor?;
            match cursor.next().await {
                Ok(Some(item)) => Some((Ok(item), Some(cursor))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }
}
