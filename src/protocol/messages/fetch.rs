//! Fetch message for retrieving the next batch from a cursor.

use crate::protocol::constants::*;
use crate::protocol::message::Message;
use crate::protocol::response::{FetchReply, RemoteOp};
use crate::protocol::transport::Method;

/// `GET /cursors/{id}/fetch?max_rows=N`.
pub struct FetchMessage<'a> {
    /// Cursor ID (assigned by the service on cursor create).
    pub cursor_id: &'a str,
    /// Upper bound on rows returned.
    pub max_rows: u32,
}

impl<'a> FetchMessage<'a> {
    /// Create a new fetch message.
    pub fn new(cursor_id: &'a str, max_rows: u32) -> Self {
        Self {
            cursor_id,
            max_rows,
        }
    }
}

impl Message for FetchMessage<'_> {
    type Reply = FetchReply;

    fn op(&self) -> RemoteOp {
        RemoteOp::Fetch
    }

    fn method(&self) -> Method {
        Method::Get
    }

    fn path(&self) -> Vec<&str> {
        vec![PATH_CURSORS, self.cursor_id, PATH_FETCH]
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![(QUERY_MAX_ROWS, self.max_rows.to_string())]
    }
}
