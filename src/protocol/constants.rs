//! Bridge protocol constants.

use std::time::Duration;

/// Rows requested per fetch call.
pub const BATCH_SIZE: u32 = 1000;

/// Rows requested per fetch call under the single-row hint.
pub const SINGLE_ROW_BATCH_SIZE: u32 = 1;

/// Default statement timeout in seconds (`0` disables it).
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u32 = 30;

/// Default timeout for session-level calls.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(20);

/// Scheme used to reach the bridge service.
pub const DEFAULT_SERVICE_SCHEME: &str = "http";

/// Records-affected value meaning "not reported".
pub const ROWS_AFFECTED_UNKNOWN: i64 = -1;

// Connection-string keys that address the bridge service itself
pub const KEY_SERVER: &str = "server";
pub const KEY_PORT: &str = "port";

// Resource paths
pub const PATH_CONNECTIONS: &str = "connections";
pub const PATH_CURSORS: &str = "cursors";
pub const PATH_EXECUTE: &str = "execute";
pub const PATH_FETCH: &str = "fetch";
pub const PATH_INFO: &str = "info";
pub const PATH_STATUS: &str = "status";

// Query parameters
pub const QUERY_MAX_ROWS: &str = "max_rows";
