//! HTTP transport seam.
//!
//! Every remote call is one request/response pair. The core never retries,
//! pools or caches; those are properties of the transport it is handed.

use crate::error::{Error, Result};
use bytes::Bytes;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

/// HTTP method used by the bridge protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

/// One outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    /// Absolute URL, query string included.
    pub url: String,
    /// JSON body, if any.
    pub body: Option<Value>,
    /// Per-call timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            timeout: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Response status and raw body.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The HTTP collaborator.
///
/// Implementations report network failures and timeouts as
/// [`Error::Transport`]; any HTTP status, including error statuses, is a
/// successful [`Response`].
pub trait Transport: Send + Sync + 'static {
    /// Send a request and wait for the full response.
    fn send(&self, request: Request) -> impl Future<Output = Result<Response>> + Send;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with a default client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a preconfigured client (TLS roots, proxies, pooling).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<Response> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(transport_error)?;

        Ok(Response { status, body })
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::transport(format!("request timed out: {}", e))
    } else {
        Error::transport(e.to_string())
    }
}
