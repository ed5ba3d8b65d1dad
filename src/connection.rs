//! Session handle for the bridge service.
//!
//! A [`Connection`] is a cheap clonable handle. Every clone, and every
//! [`Statement`] created from it, sees the same session state, so a statement
//! created before [`Connection::open`] works once the session opens.

use crate::error::{Error, Result};
use crate::protocol::connect::{ConnectOptions, ConnectParams};
use crate::protocol::message::{build_request, Message};
use crate::protocol::messages::{
    CloseCursorMessage, CloseSessionMessage, CreateSessionMessage, SessionInfoMessage,
    StatusMessage,
};
use crate::protocol::response::{parse_reply, ServiceStatus};
use crate::protocol::transport::{HttpTransport, Transport};
use crate::statement::Statement;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Open,
}

/// Remote session, present only while open.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OpenSession {
    pub base_url: String,
    pub connection_id: String,
}

#[derive(Debug)]
struct SessionState {
    connection_string: String,
    params: ConnectParams,
    session: Option<OpenSession>,
}

struct Shared<T> {
    transport: T,
    options: ConnectOptions,
    state: Mutex<SessionState>,
}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        if let Some(session) = &self.state.get_mut().session {
            tracing::warn!(
                connection_id = %session.connection_id,
                "connection dropped while open; remote session left behind"
            );
        }
    }
}

/// A session against the bridge service.
///
/// # Example
///
/// ```no_run
/// use trino_bridge_rs::Connection;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let conn = Connection::new(
///         "server=localhost;port=8991;host=trino;port=8080;user=alice;catalog=hive;schema=default",
///     );
///     conn.open().await?;
///
///     let mut stmt = conn.create_statement();
///     stmt.set_command_text("SELECT 1").await;
///     let count = stmt.execute_scalar().await?;
///     println!("{:?}", count);
///
///     stmt.close().await;
///     conn.close().await?;
///     Ok(())
/// }
/// ```
pub struct Connection<T: Transport = HttpTransport> {
    shared: Arc<Shared<T>>,
}

impl<T: Transport> Clone for Connection<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Connection<HttpTransport> {
    /// Create a closed connection over a default HTTP client.
    pub fn new(conn_str: &str) -> Self {
        Self::with_options(conn_str, ConnectOptions::default())
    }

    /// Create a closed connection with explicit options.
    pub fn with_options(conn_str: &str, options: ConnectOptions) -> Self {
        Self::with_transport(conn_str, HttpTransport::new(), options)
    }
}

impl<T: Transport> Connection<T> {
    /// Create a closed connection over the given transport.
    pub fn with_transport(conn_str: &str, transport: T, options: ConnectOptions) -> Self {
        let state = SessionState {
            connection_string: conn_str.to_string(),
            params: ConnectParams::parse(conn_str),
            session: None,
        };
        Self {
            shared: Arc::new(Shared {
                transport,
                options,
                state: Mutex::new(state),
            }),
        }
    }

    /// Replace the connection string. Only allowed while closed.
    pub fn set_connection_string(&self, conn_str: &str) -> Result<()> {
        let mut state = self.shared.state.lock();
        if state.session.is_some() {
            return Err(Error::invalid_state(
                "cannot change the connection string of an open connection",
            ));
        }
        state.connection_string = conn_str.to_string();
        state.params = ConnectParams::parse(conn_str);
        Ok(())
    }

    /// The connection string as last set.
    pub fn connection_string(&self) -> String {
        self.shared.state.lock().connection_string.clone()
    }

    /// Parsed connection parameters.
    pub fn params(&self) -> ConnectParams {
        self.shared.state.lock().params.clone()
    }

    /// Client-side options.
    pub fn options(&self) -> &ConnectOptions {
        &self.shared.options
    }

    /// Bridge service base URL derived from `server` and `port`.
    pub fn base_url(&self) -> Result<String> {
        let state = self.shared.state.lock();
        match &state.session {
            Some(session) => Ok(session.base_url.clone()),
            None => state.params.base_url(&self.shared.options.scheme),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        if self.shared.state.lock().session.is_some() {
            ConnectionState::Open
        } else {
            ConnectionState::Closed
        }
    }

    /// Whether the session is open.
    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Remote session id, present iff open.
    pub fn session_id(&self) -> Option<String> {
        self.shared
            .state
            .lock()
            .session
            .as_ref()
            .map(|s| s.connection_id.clone())
    }

    pub(crate) fn open_session(&self) -> Option<OpenSession> {
        self.shared.state.lock().session.clone()
    }

    fn connect_timeout(&self) -> Option<Duration> {
        Some(self.shared.options.connect_timeout)
    }

    /// Open the remote session. A no-op when already open.
    ///
    /// On failure the connection stays closed.
    pub async fn open(&self) -> Result<()> {
        let (base_url, params) = {
            let state = self.shared.state.lock();
            if state.session.is_some() {
                return Ok(());
            }
            (
                state.params.base_url(&self.shared.options.scheme)?,
                state.params.session_body(),
            )
        };

        let reply = self
            .call(
                &CreateSessionMessage { params },
                &base_url,
                self.connect_timeout(),
            )
            .await?;

        tracing::info!(
            connection_id = %reply.connection_id,
            base_url = %base_url,
            "session opened"
        );
        self.shared.state.lock().session = Some(OpenSession {
            base_url,
            connection_id: reply.connection_id,
        });
        Ok(())
    }

    /// Close the remote session. A no-op when closed.
    ///
    /// On failure the connection stays open so the close can be retried.
    pub async fn close(&self) -> Result<()> {
        let Some(session) = self.open_session() else {
            return Ok(());
        };

        self.call(
            &CloseSessionMessage {
                connection_id: &session.connection_id,
            },
            &session.base_url,
            self.connect_timeout(),
        )
        .await?;

        tracing::info!(connection_id = %session.connection_id, "session closed");
        let mut state = self.shared.state.lock();
        if state.session.as_ref() == Some(&session) {
            state.session = None;
        }
        Ok(())
    }

    /// Create a statement bound to this session. Valid in any state.
    pub fn create_statement(&self) -> Statement<T> {
        Statement::new(self.clone())
    }

    /// Health report of the bridge service.
    pub async fn server_status(&self) -> Result<ServiceStatus> {
        let base_url = self.base_url()?;
        self.call(&StatusMessage, &base_url, self.connect_timeout())
            .await
    }

    /// Parameters the service holds for this session (password masked).
    pub async fn info(&self) -> Result<Map<String, Value>> {
        let session = self
            .open_session()
            .ok_or_else(|| Error::invalid_state("connection is not open"))?;
        let reply = self
            .call(
                &SessionInfoMessage {
                    connection_id: &session.connection_id,
                },
                &session.base_url,
                self.connect_timeout(),
            )
            .await?;
        Ok(reply.info)
    }

    /// Transactions are not offered by the bridge protocol.
    pub fn begin_transaction(&self) -> Result<()> {
        Err(Error::unsupported("transactions"))
    }

    /// Send one message and decode its reply.
    pub(crate) async fn call<M: Message>(
        &self,
        message: &M,
        base_url: &str,
        timeout: Option<Duration>,
    ) -> Result<M::Reply> {
        let request = build_request(message, base_url, timeout)?;
        tracing::debug!(
            op = ?message.op(),
            method = ?request.method,
            url = %request.url,
            "bridge request"
        );

        let response = self.shared.transport.send(request).await?;
        tracing::debug!(op = ?message.op(), status = response.status, "bridge response");

        parse_reply(message.op(), &response)
    }

    /// Delete a cursor, swallowing any failure.
    pub(crate) async fn release_cursor(
        &self,
        base_url: &str,
        cursor_id: &str,
        timeout: Option<Duration>,
    ) {
        match self
            .call(&CloseCursorMessage { cursor_id }, base_url, timeout)
            .await
        {
            Ok(_) => tracing::debug!(cursor_id, "cursor released"),
            Err(e) => tracing::warn!(cursor_id, error = %e, "failed to release cursor"),
        }
    }
}
