//! Connection-string parsing and session options.
//!
//! A connection string is a `;`-separated list of `key=value` pairs. The first
//! `server` and `port` pairs address the bridge service; every other pair is
//! forwarded verbatim to the remote session-create call.

use crate::error::{Error, Result};
use crate::protocol::constants::*;
use reqwest::Url;
use serde_json::{Map, Value};
use std::time::Duration;

/// Parsed connection parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectParams {
    /// Bridge service host.
    pub server: Option<String>,
    /// Bridge service port (validated at open time).
    pub port: Option<String>,
    /// Lower-cased passthrough pairs in first-seen order.
    forwarded: Vec<(String, String)>,
}

impl ConnectParams {
    /// Parse a connection string.
    ///
    /// Parsing never fails: missing or malformed addressing keys are reported
    /// by [`ConnectParams::base_url`] when the session opens.
    pub fn parse(conn_str: &str) -> Self {
        let mut params = Self::default();

        for segment in conn_str.split(';') {
            let Some((key, value)) = segment.split_once('=') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            if key.is_empty() {
                continue;
            }
            let value = value.trim().to_string();

            match key.as_str() {
                KEY_SERVER if params.server.is_none() => params.server = Some(value),
                KEY_PORT if params.port.is_none() => params.port = Some(value),
                _ => params.set_forwarded(key, value),
            }
        }

        params
    }

    fn set_forwarded(&mut self, key: String, value: String) {
        match self.forwarded.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.forwarded.push((key, value)),
        }
    }

    /// Look up a passthrough value (case-insensitive).
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.to_lowercase();
        self.forwarded
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Passthrough pairs forwarded to the session-create call.
    pub fn forwarded(&self) -> &[(String, String)] {
        &self.forwarded
    }

    /// JSON body for the session-create call.
    ///
    /// Values stay strings; the service coerces them.
    pub fn session_body(&self) -> Value {
        let map: Map<String, Value> = self
            .forwarded
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        Value::Object(map)
    }

    /// Derive the bridge service base URL, `scheme://server:port`.
    pub fn base_url(&self, scheme: &str) -> Result<String> {
        let server = self
            .server
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                Error::configuration("connection string is missing required key 'server'")
            })?;
        let port = self
            .port
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                Error::configuration("connection string is missing required key 'port'")
            })?;
        let port: u16 = port
            .parse()
            .map_err(|_| Error::configuration(format!("Invalid port: {}", port)))?;

        let base = format!("{}://{}:{}", scheme, server, port);
        Url::parse(&base)
            .map_err(|e| Error::configuration(format!("Invalid service address {}: {}", base, e)))?;
        Ok(base)
    }
}

/// Client-side options for a session.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// Scheme used to reach the bridge service.
    pub scheme: String,
    /// Timeout for session create/delete, status and info calls.
    pub connect_timeout: Duration,
}

impl ConnectOptions {
    /// Create options with defaults (`http`, 20 seconds).
    pub fn new() -> Self {
        Self {
            scheme: DEFAULT_SERVICE_SCHEME.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Set the bridge service scheme.
    ///
    /// ```
    /// use trino_bridge_rs::ConnectOptions;
    ///
    /// let options = ConnectOptions::new().with_scheme("https");
    /// assert_eq!(options.scheme, "https");
    /// ```
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Set the session-level call timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self::new()
    }
}
