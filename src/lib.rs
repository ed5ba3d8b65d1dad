//! Trino bridge client for Rust
//!
//! A client for query engines that are reachable only through the Trino
//! ODBC bridge service: a stateful HTTP/JSON protocol of sessions, cursors,
//! execute and bounded fetch calls. The crate turns that protocol into a
//! familiar connection / statement / forward-only reader API.
//!
//! # Example
//!
//! ```no_run
//! use trino_bridge_rs::{Connection, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Service address plus parameters forwarded to the engine
//!     let conn = Connection::new(
//!         "server=localhost;port=8991;host=trino;port=8080;user=alice;catalog=tpch;schema=tiny",
//!     );
//!     conn.open().await?;
//!
//!     let mut stmt = conn.create_statement();
//!     stmt.set_command_text("SELECT nationkey, name FROM nation WHERE regionkey = ?").await;
//!     stmt.add_parameter("region", 1);
//!
//!     let mut reader = stmt.execute().await?;
//!     // Column order follows the service's row keys, not the select list
//!     let key = reader.ordinal("nationkey")?;
//!     let name = reader.ordinal("name")?;
//!     while reader.read().await? {
//!         println!("{} {}", reader.get_i64(key)?, reader.get_string(name)?);
//!     }
//!     reader.close().await;
//!
//!     conn.close().await?;
//!     Ok(())
//! }
//! ```

pub mod connection;
pub mod cursor;
pub mod error;
pub mod protocol;
pub mod statement;

// Re-export main types
pub use connection::{Connection, ConnectionState};
pub use cursor::{Cursor, CursorStreamExt, DataReader};
pub use error::{Error, Result};
pub use protocol::connect::{ConnectOptions, ConnectParams};
pub use protocol::response::ServiceStatus;
pub use protocol::transport::{HttpTransport, Method, Request, Response, Transport};
pub use protocol::types::{Column, ColumnInfo, ColumnMetadata, DbType, DbValue, Row};
pub use statement::{CommandType, ExecuteBehavior, Parameter, ParameterDirection, Statement};
