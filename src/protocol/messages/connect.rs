//! Session-level messages: create, close, info and service status.

use crate::error::Result;
use crate::protocol::constants::*;
use crate::protocol::message::Message;
use crate::protocol::response::{
    Ack, CreateSessionReply, RemoteOp, ServiceStatus, SessionInfoReply,
};
use crate::protocol::transport::Method;
use serde_json::Value;

/// `POST /connections` with the forwarded connection parameters.
pub struct CreateSessionMessage {
    /// Forwarded parameters, already a JSON object.
    pub params: Value,
}

impl Message for CreateSessionMessage {
    type Reply = CreateSessionReply;

    fn op(&self) -> RemoteOp {
        RemoteOp::CreateSession
    }

    fn method(&self) -> Method {
        Method::Post
    }

    fn path(&self) -> Vec<&str> {
        vec![PATH_CONNECTIONS]
    }

    fn body(&self) -> Result<Option<Value>> {
        Ok(Some(self.params.clone()))
    }
}

/// `DELETE /connections/{id}`.
pub struct CloseSessionMessage<'a> {
    pub connection_id: &'a str,
}

impl Message for CloseSessionMessage<'_> {
    type Reply = Ack;

    fn op(&self) -> RemoteOp {
        RemoteOp::CloseSession
    }

    fn method(&self) -> Method {
        Method::Delete
    }

    fn path(&self) -> Vec<&str> {
        vec![PATH_CONNECTIONS, self.connection_id]
    }
}

/// `GET /connections/{id}/info`.
pub struct SessionInfoMessage<'a> {
    pub connection_id: &'a str,
}

impl Message for SessionInfoMessage<'_> {
    type Reply = SessionInfoReply;

    fn op(&self) -> RemoteOp {
        RemoteOp::SessionInfo
    }

    fn method(&self) -> Method {
        Method::Get
    }

    fn path(&self) -> Vec<&str> {
        vec![PATH_CONNECTIONS, self.connection_id, PATH_INFO]
    }
}

/// `GET /status`.
pub struct StatusMessage;

impl Message for StatusMessage {
    type Reply = ServiceStatus;

    fn op(&self) -> RemoteOp {
        RemoteOp::Status
    }

    fn method(&self) -> Method {
        Method::Get
    }

    fn path(&self) -> Vec<&str> {
        vec![PATH_STATUS]
    }
}
