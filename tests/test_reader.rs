//! Reader behaviour: batching, column order, accessors and closing.

mod common;

use chrono::NaiveDate;
use common::*;
use futures::TryStreamExt;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use trino_bridge_rs::{Cursor, CursorStreamExt, DbType, DbValue, Error};

#[tokio::test]
async fn test_single_batch() {
    let (conn, transport) = open_connection().await;
    transport
        .cursor_created("k1")
        .executed()
        .rows(json!([{"a": 1, "b": "x"}]), false)
        .ack();

    let mut stmt = conn.create_statement();
    stmt.set_command_text("SELECT a, b FROM t").await;
    let mut reader = stmt.execute().await.unwrap();

    assert_eq!(reader.field_count(), 2);
    assert_eq!(reader.column_name(0).unwrap(), "a");
    assert_eq!(reader.column_name(1).unwrap(), "b");

    assert!(reader.read().await.unwrap());
    assert_eq!(reader.value(0).unwrap(), &DbValue::Int64(1));
    assert_eq!(reader.get_string(1).unwrap(), "x");

    assert!(!reader.read().await.unwrap());
    reader.close().await;

    assert_eq!(transport.calls().last().unwrap(), "Delete /cursors/k1");
    assert_eq!(transport.pending_replies(), 0);
}

#[tokio::test]
async fn test_multi_batch_exhaustion_is_terminal() {
    let (conn, transport) = open_connection().await;
    transport
        .cursor_created("k1")
        .executed()
        .rows(json!([{"n": 1}, {"n": 2}]), true)
        .rows(json!([{"n": 3}]), false);

    let mut stmt = conn.create_statement();
    stmt.set_command_text("SELECT n FROM t").await;
    let mut reader = stmt.execute().await.unwrap();

    let mut seen = Vec::new();
    while reader.read().await.unwrap() {
        seen.push(reader.get_i64(0).unwrap());
    }
    assert_eq!(seen, vec![1, 2, 3]);

    let fetches = transport.request_count();
    assert!(!reader.read().await.unwrap());
    assert!(!reader.read().await.unwrap());
    assert_eq!(transport.request_count(), fetches);
    assert_eq!(
        transport
            .calls()
            .iter()
            .filter(|c| c.contains("/fetch"))
            .count(),
        2
    );
}

#[tokio::test]
async fn test_empty_batch_with_more_rows_keeps_fetching() {
    let (conn, transport) = open_connection().await;
    transport
        .cursor_created("k1")
        .executed()
        .rows(json!([]), true)
        .rows(json!([{"n": 7}]), false);

    let mut stmt = conn.create_statement();
    stmt.set_command_text("SELECT n FROM t").await;
    let mut reader = stmt.execute().await.unwrap();

    assert_eq!(reader.field_count(), 0);
    assert!(reader.read().await.unwrap());
    assert_eq!(reader.field_count(), 1);
    assert_eq!(reader.get_i64(0).unwrap(), 7);
    assert!(!reader.read().await.unwrap());
}

#[tokio::test]
async fn test_zero_rows() {
    let (conn, transport) = open_connection().await;
    transport
        .cursor_created("k1")
        .executed()
        .rows(json!([]), false)
        .ack();

    let mut stmt = conn.create_statement();
    stmt.set_command_text("SELECT a FROM t WHERE false").await;
    let mut reader = stmt.execute().await.unwrap();

    assert_eq!(reader.field_count(), 0);
    assert!(!reader.has_rows());

    let requests = transport.request_count();
    for _ in 0..3 {
        assert!(!reader.read().await.unwrap());
    }
    assert_eq!(transport.request_count(), requests);
    assert!(matches!(
        reader.column_name(0),
        Err(Error::ColumnIndexOutOfBounds { index: 0, count: 0 })
    ));
    reader.close().await;
}

#[tokio::test]
async fn test_column_order_frozen_by_first_batch() {
    let (conn, transport) = open_connection().await;
    transport
        .cursor_created("k1")
        .executed()
        .rows(json!([{"z": 1, "a": null}]), true)
        .rows(json!([{"a": "late", "z": 2}, {"z": 3, "extra": true}]), false);

    let mut stmt = conn.create_statement();
    stmt.set_command_text("SELECT z, a FROM t").await;
    let mut reader = stmt.execute().await.unwrap();

    assert_eq!(reader.column_name(0).unwrap(), "z");
    assert_eq!(reader.column_name(1).unwrap(), "a");

    assert!(reader.read().await.unwrap());
    assert!(reader.is_null(1).unwrap());

    assert!(reader.read().await.unwrap());
    assert_eq!(reader.get_i64(0).unwrap(), 2);
    assert_eq!(reader.get_string(1).unwrap(), "late");

    // Missing keys read as NULL, unknown keys are dropped
    assert!(reader.read().await.unwrap());
    assert_eq!(reader.get_i64(0).unwrap(), 3);
    assert!(reader.is_null(1).unwrap());
    assert_eq!(reader.field_count(), 2);
}

#[tokio::test]
async fn test_column_order_follows_row_keys() {
    let (conn, transport) = open_connection().await;
    transport.cursor_created("k1").executed().rows(
        json!([{"name": "ALGERIA", "nationkey": 0}, {"name": "ARGENTINA", "nationkey": 1}]),
        false,
    );

    let mut stmt = conn.create_statement();
    stmt.set_command_text("SELECT nationkey, name FROM nation").await;
    let mut reader = stmt.execute().await.unwrap();

    assert_eq!(reader.column_name(0).unwrap(), "name");
    let key = reader.ordinal("nationkey").unwrap();
    let name = reader.ordinal("name").unwrap();
    assert_eq!(key, 1);

    assert!(reader.read().await.unwrap());
    assert_eq!(reader.get_i64(key).unwrap(), 0);
    assert_eq!(reader.get_string(name).unwrap(), "ALGERIA");
    assert!(matches!(reader.get_i64(0), Err(Error::TypeCoercion { .. })));
}

#[tokio::test]
async fn test_malformed_fetch_reply_is_a_fetch_error() {
    let (conn, transport) = open_connection().await;
    transport
        .cursor_created("k1")
        .executed()
        .rows(json!([{"n": 1}]), true)
        .ack()
        .rows(json!([{"n": 2}]), false);

    let mut stmt = conn.create_statement();
    stmt.set_command_text("SELECT n FROM t").await;
    let mut reader = stmt.execute().await.unwrap();
    assert!(reader.read().await.unwrap());

    // A reply without rows or has_more must not end the result silently
    let err = reader.read().await.unwrap_err();
    assert!(matches!(err, Error::Fetch { .. }));
    assert_eq!(reader.get_i64(0).unwrap(), 1);

    assert!(reader.read().await.unwrap());
    assert_eq!(reader.get_i64(0).unwrap(), 2);
    assert!(!reader.read().await.unwrap());
}

#[tokio::test]
async fn test_fetch_failure_leaves_reader_usable() {
    let (conn, transport) = open_connection().await;
    transport
        .cursor_created("k1")
        .executed()
        .rows(json!([{"n": 1}]), true)
        .reject(500, "worker lost")
        .rows(json!([{"n": 2}]), false);

    let mut stmt = conn.create_statement();
    stmt.set_command_text("SELECT n FROM t").await;
    let mut reader = stmt.execute().await.unwrap();

    assert!(reader.read().await.unwrap());
    assert_eq!(reader.get_i64(0).unwrap(), 1);

    let err = reader.read().await.unwrap_err();
    assert_eq!(err, Error::fetch("worker lost"));
    // Still positioned on the last good row
    assert_eq!(reader.get_i64(0).unwrap(), 1);

    assert!(reader.read().await.unwrap());
    assert_eq!(reader.get_i64(0).unwrap(), 2);
    assert!(!reader.read().await.unwrap());
}

#[tokio::test]
async fn test_malformed_row_is_a_fetch_error() {
    let (conn, transport) = open_connection().await;
    transport
        .cursor_created("k1")
        .executed()
        .rows(json!([{"n": 1}]), true)
        .rows(json!([{"n": 2}, 42]), false);

    let mut stmt = conn.create_statement();
    stmt.set_command_text("SELECT n FROM t").await;
    let mut reader = stmt.execute().await.unwrap();

    assert!(reader.read().await.unwrap());
    let err = reader.read().await.unwrap_err();
    assert!(matches!(err, Error::Fetch { .. }));
    assert_eq!(reader.get_i64(0).unwrap(), 1);
}

#[tokio::test]
async fn test_closed_reader_rejects_access() {
    let (conn, transport) = open_connection().await;
    transport
        .cursor_created("k1")
        .executed()
        .rows(json!([{"a": 1}]), true)
        .ack();

    let mut stmt = conn.create_statement();
    stmt.set_command_text("SELECT a FROM t").await;
    let mut reader = stmt.execute().await.unwrap();
    assert!(reader.read().await.unwrap());

    reader.close().await;
    reader.close().await;
    assert!(reader.is_closed());

    assert!(matches!(reader.read().await, Err(Error::InvalidState { .. })));
    assert!(matches!(reader.value(0), Err(Error::InvalidState { .. })));
    assert!(matches!(reader.column_name(0), Err(Error::InvalidState { .. })));
    assert_eq!(
        transport
            .calls()
            .iter()
            .filter(|c| c.starts_with("Delete"))
            .count(),
        1
    );
    drop(reader);
    assert_eq!(stmt.active_cursor_id(), None);
}

#[tokio::test]
async fn test_no_current_row() {
    let (conn, transport) = open_connection().await;
    transport
        .cursor_created("k1")
        .executed()
        .rows(json!([{"a": 1}]), false);

    let mut stmt = conn.create_statement();
    stmt.set_command_text("SELECT a FROM t").await;
    let mut reader = stmt.execute().await.unwrap();

    // Before the first read
    assert!(matches!(reader.value(0), Err(Error::InvalidState { .. })));
    assert!(reader.read().await.unwrap());
    assert!(!reader.read().await.unwrap());
    // After exhaustion
    assert!(matches!(reader.get_i64(0), Err(Error::InvalidState { .. })));
}

#[tokio::test]
async fn test_index_and_name_lookup() {
    let (conn, transport) = open_connection().await;
    transport
        .cursor_created("k1")
        .executed()
        .rows(json!([{"NationKey": 1, "name": "ALGERIA"}]), false);

    let mut stmt = conn.create_statement();
    stmt.set_command_text("SELECT nationkey, name FROM nation").await;
    let mut reader = stmt.execute().await.unwrap();
    assert!(reader.read().await.unwrap());

    assert_eq!(reader.ordinal("name").unwrap(), 1);
    assert_eq!(reader.ordinal("nationkey").unwrap(), 0);
    assert!(matches!(
        reader.ordinal("missing"),
        Err(Error::ColumnNotFound { .. })
    ));

    let err = reader.value(2).unwrap_err();
    assert!(err.is_index_error());
    assert!(matches!(
        reader.column_name(5),
        Err(Error::ColumnIndexOutOfBounds { index: 5, count: 2 })
    ));
}

#[tokio::test]
async fn test_typed_getters() {
    let (conn, transport) = open_connection().await;
    transport.cursor_created("k1").executed().rows(
        json!([{
            "i": 42,
            "f": 1.5,
            "s": "12",
            "b": true,
            "ts": "2024-03-01 12:30:00.000",
            "d": "2024-03-01",
            "n": null,
            "arr": [1, 2]
        }]),
        false,
    );

    let mut stmt = conn.create_statement();
    stmt.set_command_text("SELECT * FROM t").await;
    let mut reader = stmt.execute().await.unwrap();
    assert!(reader.read().await.unwrap());

    assert_eq!(reader.get_i64(0).unwrap(), 42);
    assert_eq!(reader.get_f64(0).unwrap(), 42.0);
    assert_eq!(reader.get_f64(1).unwrap(), 1.5);
    assert_eq!(reader.get_i64(2).unwrap(), 12);
    assert_eq!(reader.get_string(0).unwrap(), "42");
    assert!(reader.get_bool(3).unwrap());

    let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(12, 30, 0)
        .unwrap();
    assert_eq!(reader.get_datetime(4).unwrap(), expected);
    assert_eq!(
        reader.get_datetime(5).unwrap(),
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    );

    assert!(reader.is_null(6).unwrap());
    assert!(matches!(reader.get_i64(6), Err(Error::TypeCoercion { .. })));
    assert!(matches!(reader.get_string(6), Err(Error::TypeCoercion { .. })));

    assert_eq!(reader.get_string(7).unwrap(), "[1,2]");
    assert!(matches!(reader.get_f64(7), Err(Error::TypeCoercion { .. })));
    assert!(matches!(reader.get_i64(1), Err(Error::TypeCoercion { .. })));
}

#[tokio::test]
async fn test_field_type_from_description_or_value() {
    let (conn, transport) = open_connection().await;
    transport
        .cursor_created("k1")
        .reply(json!({
            "success": true,
            "columns": [
                {"name": "id", "type_code": "bigint"},
                {"name": "created", "type_code": "timestamp(3)"}
            ],
            "rowcount": -1
        }))
        .rows(
            json!([{"id": 1, "created": "2024-01-01 00:00:00.000", "note": "x"}]),
            false,
        );

    let mut stmt = conn.create_statement();
    stmt.set_command_text("SELECT id, created, note FROM t").await;
    let mut reader = stmt.execute().await.unwrap();
    assert_eq!(reader.schema().len(), 2);
    assert_eq!(reader.records_affected(), -1);

    assert_eq!(reader.field_type(0).unwrap(), DbType::Int64);
    assert_eq!(reader.field_type(1).unwrap(), DbType::DateTime);
    // Undescribed column: typed by the current value
    assert!(reader.field_type(2).is_err());
    assert!(reader.read().await.unwrap());
    assert_eq!(reader.field_type(2).unwrap(), DbType::String);
}

#[tokio::test]
async fn test_positional_rows_use_described_names() {
    let (conn, transport) = open_connection().await;
    transport
        .cursor_created("k1")
        .reply(json!({
            "success": true,
            "columns": [{"name": "id", "type_code": "integer"}],
            "rowcount": -1
        }))
        .rows(json!([[1, "a"], [2]]), false);

    let mut stmt = conn.create_statement();
    stmt.set_command_text("SELECT id, tag FROM t").await;
    let mut reader = stmt.execute().await.unwrap();

    assert_eq!(reader.column_name(0).unwrap(), "id");
    assert_eq!(reader.column_name(1).unwrap(), "column1");

    assert!(reader.read().await.unwrap());
    assert_eq!(reader.get_string(1).unwrap(), "a");
    assert!(reader.read().await.unwrap());
    assert_eq!(reader.get_i64(0).unwrap(), 2);
    assert!(reader.is_null(1).unwrap());
}

#[tokio::test]
async fn test_single_result_set() {
    let (conn, transport) = open_connection().await;
    transport
        .cursor_created("k1")
        .executed()
        .rows(json!([{"a": 1}]), false);

    let mut stmt = conn.create_statement();
    stmt.set_command_text("SELECT 1 AS a").await;
    let reader = stmt.execute().await.unwrap();
    assert!(!reader.next_result());
    assert!(reader.has_rows());
}

#[tokio::test]
async fn test_fetch_all_closes_cursor() {
    let (conn, transport) = open_connection().await;
    transport
        .cursor_created("k1")
        .executed()
        .rows(json!([{"n": 1}, {"n": 2}]), true)
        .rows(json!([{"n": 3}]), false)
        .ack();

    let mut stmt = conn.create_statement();
    stmt.set_command_text("SELECT n FROM t").await;
    let mut reader = stmt.execute().await.unwrap();
    assert_eq!(reader.fetch_size(), 1000);

    let rows = assert_ok!(reader.fetch_all().await);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2].get_by_name("n"), Some(&DbValue::Int64(3)));
    assert_eq!(rows[0].column_names(), vec!["n"]);
    assert_eq!(Cursor::rowcount(&reader), 3);
    assert!(reader.is_closed());
    assert_eq!(transport.calls().last().unwrap(), "Delete /cursors/k1");
}

#[tokio::test]
async fn test_stream_of_rows() {
    let (conn, transport) = open_connection().await;
    transport
        .cursor_created("k1")
        .executed()
        .rows(json!([{"name": "ALGERIA"}, {"name": "ARGENTINA"}]), false)
        .ack();

    let mut stmt = conn.create_statement();
    stmt.set_command_text("SELECT name FROM nation").await;
    let reader = stmt.execute().await.unwrap();

    let names: Vec<String> = reader
        .into_stream()
        .map_ok(|row| row.get(0).map(ToString::to_string).unwrap_or_default())
        .try_collect()
        .await
        .unwrap();
    assert_eq!(names, vec!["ALGERIA", "ARGENTINA"]);

    stmt.close().await;
    assert_eq!(transport.calls().last().unwrap(), "Delete /cursors/k1");
}

#[tokio::test]
async fn test_stream_stops_after_error() {
    let (conn, transport) = open_connection().await;
    transport
        .cursor_created("k1")
        .executed()
        .rows(json!([{"n": 1}]), true)
        .reject(500, "worker lost");

    let mut stmt = conn.create_statement();
    stmt.set_command_text("SELECT n FROM t").await;
    let reader = stmt.execute().await.unwrap();

    let results: Vec<_> = futures::StreamExt::collect(reader.into_stream()).await;
    assert_eq!(results.len(), 2);
    assert_ok!(&results[0]);
    assert_err!(&results[1]);
}
