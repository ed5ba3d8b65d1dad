//! Scripted transport shared by the integration tests.
//!
//! Replies are served in the order they were queued; every request is
//! recorded so tests can assert on the exact wire calls.

#![allow(dead_code)]

use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Arc;
use trino_bridge_rs::{
    ConnectOptions, Connection, Error, Request, Response, Result, Transport,
};

pub const CONN_STR: &str =
    "server=localhost;port=8991;host=trino;port=8080;user=alice;catalog=hive;schema=default";
pub const BASE: &str = "http://localhost:8991";

#[derive(Default)]
struct Script {
    replies: VecDeque<Result<Response>>,
    requests: Vec<Request>,
}

#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a 200 reply with a JSON body.
    pub fn reply(&self, body: Value) -> &Self {
        self.push(Ok(Response::new(200, body.to_string())))
    }

    /// Queue an error status with the service's error envelope.
    pub fn reject(&self, status: u16, error: &str) -> &Self {
        self.push(Ok(Response::new(
            status,
            json!({"success": false, "error": error}).to_string(),
        )))
    }

    /// Queue a network failure.
    pub fn fail(&self, message: &str) -> &Self {
        self.push(Err(Error::transport(message)))
    }

    pub fn push(&self, reply: Result<Response>) -> &Self {
        self.script.lock().replies.push_back(reply);
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.script.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.script.lock().requests.len()
    }

    /// `METHOD url` for each recorded request.
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{:?} {}", r.method, r.url.trim_start_matches(BASE)))
            .collect()
    }

    pub fn clear_requests(&self) {
        self.script.lock().requests.clear();
    }

    pub fn pending_replies(&self) -> usize {
        self.script.lock().replies.len()
    }

    // Reply builders for the bridge protocol

    pub fn session_created(&self, id: &str) -> &Self {
        self.reply(json!({"success": true, "connection_id": id}))
    }

    pub fn cursor_created(&self, id: &str) -> &Self {
        self.reply(json!({"success": true, "cursor_id": id}))
    }

    pub fn executed(&self) -> &Self {
        self.reply(json!({"success": true, "columns": [], "rowcount": -1}))
    }

    pub fn rows(&self, rows: Value, has_more: bool) -> &Self {
        self.reply(json!({"success": true, "has_more": has_more, "rows": rows}))
    }

    pub fn ack(&self) -> &Self {
        self.reply(json!({"success": true}))
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: Request) -> Result<Response> {
        let mut script = self.script.lock();
        script.requests.push(request.clone());
        script.replies.pop_front().unwrap_or_else(|| {
            panic!(
                "no scripted reply for {:?} {}",
                request.method, request.url
            )
        })
    }
}

/// A closed connection over a fresh script.
pub fn connection() -> (Connection<ScriptedTransport>, ScriptedTransport) {
    let transport = ScriptedTransport::new();
    let conn = Connection::with_transport(CONN_STR, transport.clone(), ConnectOptions::default());
    (conn, transport)
}

/// An open connection (session `c1`), with the open call cleared from the log.
pub async fn open_connection() -> (Connection<ScriptedTransport>, ScriptedTransport) {
    let (conn, transport) = connection();
    transport.session_created("c1");
    conn.open().await.unwrap();
    transport.clear_requests();
    (conn, transport)
}
