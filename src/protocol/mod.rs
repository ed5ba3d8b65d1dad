//! Bridge protocol: connection strings, messages, replies and transport.

pub mod connect;
pub mod constants;
pub mod decode;
pub mod message;
pub mod messages;
pub mod response;
pub mod transport;
pub mod types;

pub use message::{build_request, Message};
pub use response::{parse_reply, RemoteOp, ServiceStatus};
pub use transport::{HttpTransport, Method, Request, Response, Transport};
pub use types::{Column, ColumnInfo, ColumnMetadata, DbType, DbValue, Row};
