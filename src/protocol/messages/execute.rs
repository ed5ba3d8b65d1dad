//! Cursor messages: create, execute and close.

use crate::error::Result;
use crate::protocol::constants::*;
use crate::protocol::message::Message;
use crate::protocol::response::{Ack, CreateCursorReply, ExecuteReply, RemoteOp};
use crate::protocol::transport::Method;
use crate::protocol::types::DbValue;
use serde_json::{Map, Value};

/// Encode parameter values for the wire, in binding order.
pub fn encode_parameters<'a>(values: impl IntoIterator<Item = &'a DbValue>) -> Result<Vec<Value>> {
    values.into_iter().map(DbValue::to_json).collect()
}

/// `POST /connections/{id}/cursors`.
pub struct CreateCursorMessage<'a> {
    pub connection_id: &'a str,
}

impl Message for CreateCursorMessage<'_> {
    type Reply = CreateCursorReply;

    fn op(&self) -> RemoteOp {
        RemoteOp::CreateCursor
    }

    fn method(&self) -> Method {
        Method::Post
    }

    fn path(&self) -> Vec<&str> {
        vec![PATH_CONNECTIONS, self.connection_id, PATH_CURSORS]
    }
}

/// `POST /cursors/{id}/execute`.
///
/// Parameters bind by position: the list follows the `?` placeholders in
/// the query, and names never reach the wire.
pub struct ExecuteMessage<'a> {
    pub cursor_id: &'a str,
    pub query: &'a str,
    /// Encoded positional values (see [`encode_parameters`]).
    pub parameters: Vec<Value>,
}

impl Message for ExecuteMessage<'_> {
    type Reply = ExecuteReply;

    fn op(&self) -> RemoteOp {
        RemoteOp::Execute
    }

    fn method(&self) -> Method {
        Method::Post
    }

    fn path(&self) -> Vec<&str> {
        vec![PATH_CURSORS, self.cursor_id, PATH_EXECUTE]
    }

    fn body(&self) -> Result<Option<Value>> {
        let mut body = Map::new();
        body.insert("query".to_string(), Value::String(self.query.to_string()));
        if !self.parameters.is_empty() {
            body.insert(
                "parameters".to_string(),
                Value::Array(self.parameters.clone()),
            );
        }
        Ok(Some(Value::Object(body)))
    }
}

/// `DELETE /cursors/{id}`.
pub struct CloseCursorMessage<'a> {
    pub cursor_id: &'a str,
}

impl Message for CloseCursorMessage<'_> {
    type Reply = Ack;

    fn op(&self) -> RemoteOp {
        RemoteOp::CloseCursor
    }

    fn method(&self) -> Method {
        Method::Delete
    }

    fn path(&self) -> Vec<&str> {
        vec![PATH_CURSORS, self.cursor_id]
    }
}
