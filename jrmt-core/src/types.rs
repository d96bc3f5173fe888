//! Wire envelopes exchanged with a JSON-RPC 1.1 peer
//!
//! A request looks like
//!
//! ```json
//! {"method": "add", "params": [1, 2], "id": null, "jsonrpc": "1.1"}
//! ```
//!
//! and a reply carries either `result` or `error`:
//!
//! ```json
//! {"result": 3}
//! {"error": {"code": 123, "message": "bad"}}
//! ```
//!
//! Notifications are requests without an `id`; the peer sends nothing back.
//! The `jsonrpc` tag is optional so that pre-versioned peers can be addressed.

use crate::error::ErrorPayload;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Protocol version emitted in the `jsonrpc` member
pub const JSON_RPC_VERSION: &str = "1.1";

/// Request identifier
///
/// The identifier is opaque to the session: calls carry `Id::Null` unless
/// one is set explicitly, and correlating replies is left to the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    /// String identifier
    String(String),
    /// Numeric identifier
    Number(i64),
    /// Null identifier, the default for calls
    #[default]
    Null,
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::String(s) => write!(f, "\"{}\"", s),
            Id::Number(n) => write!(f, "{}", n),
            Id::Null => write!(f, "null"),
        }
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::String(s)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::String(s.to_string())
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Number(n)
    }
}

/// Outgoing call or notification
///
/// # Examples
///
/// ```rust
/// use jrmt_core::RequestEnvelope;
/// use serde_json::json;
///
/// let call = RequestEnvelope::call("add", vec![json!(1), json!(2)]);
/// assert!(!call.is_notification());
///
/// let notification = RequestEnvelope::notification("log", vec![json!("hello")]);
/// assert!(notification.is_notification());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Remote procedure name
    pub method: String,
    /// Positional parameters
    #[serde(default)]
    pub params: Vec<Value>,
    /// Present for calls, absent for notifications
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    /// Protocol version tag, omitted for pre-versioned peers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
}

impl RequestEnvelope {
    /// A call expecting a reply, with a null `id`
    pub fn call(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            params,
            id: Some(Id::Null),
            jsonrpc: None,
        }
    }

    /// A notification; no `id`, no reply
    pub fn notification(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            params,
            id: None,
            jsonrpc: None,
        }
    }

    /// Replace the call identifier
    pub fn with_id(mut self, id: impl Into<Id>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Tag the envelope with [`JSON_RPC_VERSION`]
    pub fn versioned(mut self) -> Self {
        self.jsonrpc = Some(JSON_RPC_VERSION.to_string());
        self
    }

    /// True when no reply is expected
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Decoded reply: a result or the peer's error payload
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// `result` member; may be null
    Success(Value),
    /// `error` member, carried verbatim
    Failure(ErrorPayload),
}

impl Reply {
    /// True for [`Reply::Success`]
    pub fn is_success(&self) -> bool {
        matches!(self, Reply::Success(_))
    }

    /// True for [`Reply::Failure`]
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Failure(_))
    }

    /// The result, or [`Error::Remote`](crate::Error::Remote) for a failure
    pub fn into_result(self) -> crate::Result<Value> {
        match self {
            Reply::Success(value) => Ok(value),
            Reply::Failure(payload) => Err(crate::Error::Remote(payload)),
        }
    }
}
