//! Reply parsing for bridge calls.
//!
//! Every reply is a JSON object carrying `success` (absent on `/status`) and,
//! on rejection, `error`. Rejections are classified by the operation that
//! produced them so the caller sees a connection, query or fetch error with
//! the server message untouched.

use crate::error::{Error, Result};
use crate::protocol::transport::Response;
use crate::protocol::types::ColumnMetadata;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Remote operations, for error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOp {
    CreateSession,
    CloseSession,
    SessionInfo,
    Status,
    CreateCursor,
    Execute,
    Fetch,
    CloseCursor,
}

impl RemoteOp {
    /// Wrap a server message in the error kind for this operation.
    pub fn reject(self, message: impl Into<String>) -> Error {
        match self {
            RemoteOp::CreateSession
            | RemoteOp::CloseSession
            | RemoteOp::SessionInfo
            | RemoteOp::Status => Error::connection(message),
            RemoteOp::CreateCursor | RemoteOp::Execute | RemoteOp::CloseCursor => {
                Error::query(message)
            }
            RemoteOp::Fetch => Error::fetch(message),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReplyStatus {
    success: Option<bool>,
    error: Option<String>,
}

/// Reply without a payload.
#[derive(Debug, Default, Deserialize)]
pub struct Ack {}

/// Session-create reply.
#[derive(Debug, Deserialize)]
pub struct CreateSessionReply {
    pub connection_id: String,
}

/// Cursor-create reply.
#[derive(Debug, Deserialize)]
pub struct CreateCursorReply {
    pub cursor_id: String,
}

/// Execute reply: the engine's description and row count, when known.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExecuteReply {
    pub columns: Option<Vec<ColumnMetadata>>,
    pub rowcount: Option<i64>,
}

/// Fetch reply. Rows stay raw until the cursor aligns them to its columns.
///
/// Both fields are required: a reply without them is malformed, not an
/// empty final batch.
#[derive(Debug, Deserialize)]
pub struct FetchReply {
    pub has_more: bool,
    pub rows: Vec<Value>,
}

/// Health report from `/status`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceStatus {
    pub status: String,
    pub version: String,
    pub name: String,
}

/// Session info reply. The service masks the password.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SessionInfoReply {
    pub info: Map<String, Value>,
}

/// Parse a reply, turning HTTP errors and `success: false` into errors.
pub fn parse_reply<R: DeserializeOwned>(op: RemoteOp, response: &Response) -> Result<R> {
    let parsed: std::result::Result<Value, _> = serde_json::from_slice(&response.body);

    if !response.is_success() {
        let message = parsed
            .ok()
            .and_then(|v| ReplyStatus::deserialize(&v).ok())
            .and_then(|s| s.error)
            .unwrap_or_else(|| fallback_message(response));
        return Err(op.reject(message));
    }

    let value = parsed.map_err(|e| op.reject(format!("malformed response: {}", e)))?;
    let status = ReplyStatus::deserialize(&value)
        .map_err(|e| op.reject(format!("malformed response: {}", e)))?;

    if status.success == Some(false) {
        return Err(op.reject(
            status
                .error
                .unwrap_or_else(|| "request rejected by service".to_string()),
        ));
    }

    R::deserialize(value).map_err(|e| op.reject(format!("malformed response: {}", e)))
}

fn fallback_message(response: &Response) -> String {
    let text = String::from_utf8_lossy(&response.body);
    let text = text.trim();
    if text.is_empty() {
        format!("HTTP {}", response.status)
    } else {
        text.to_string()
    }
}
