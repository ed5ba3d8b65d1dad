//! Message trait shared by every bridge call.
//!
//! A message knows its HTTP method, resource path, optional query and body,
//! and the reply shape it expects. [`build_request`] turns it into a
//! transport [`Request`].

use crate::error::{Error, Result};
use crate::protocol::response::RemoteOp;
use crate::protocol::transport::{Method, Request};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// A bridge protocol call.
pub trait Message {
    /// Reply payload, decoded after the `success` envelope is checked.
    type Reply: DeserializeOwned;

    /// Which remote operation this is (drives error classification).
    fn op(&self) -> RemoteOp;

    /// HTTP method.
    fn method(&self) -> Method;

    /// Path segments below the base URL.
    fn path(&self) -> Vec<&str>;

    /// Query-string pairs.
    fn query(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// JSON body.
    fn body(&self) -> Result<Option<Value>> {
        Ok(None)
    }
}

/// Join path segments onto the base URL, percent-encoding each one.
pub fn endpoint(base_url: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base_url)
        .map_err(|e| Error::configuration(format!("Invalid base URL {}: {}", base_url, e)))?;
    url.path_segments_mut()
        .map_err(|_| Error::configuration(format!("Base URL cannot hold a path: {}", base_url)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Build the transport request for a message.
pub fn build_request<M: Message>(
    message: &M,
    base_url: &str,
    timeout: Option<Duration>,
) -> Result<Request> {
    let mut url = endpoint(base_url, &message.path())?;
    let query = message.query();
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query.iter());
    }

    let mut request = Request::new(message.method(), url.as_str()).with_timeout(timeout);
    if let Some(body) = message.body()? {
        request = request.with_body(body);
    }
    Ok(request)
}
