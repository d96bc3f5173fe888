//! Envelope codec
//!
//! [`EnvelopeCodec`] turns method calls into request text and reply bytes
//! into a [`Reply`]. Whether the `jsonrpc` version tag is written is a
//! property of the codec instance, so two sessions talking to peers of
//! different vintages never interfere.
//!
//! # Reply discrimination
//!
//! A reply is decoded to a JSON object and then:
//!
//! 1. if it has an `error` member, it is a [`Reply::Failure`] carrying that
//!    member verbatim, whatever `result` says
//! 2. otherwise, if it has a `result` member, it is a [`Reply::Success`];
//!    a null result is a legitimate success
//! 3. otherwise (or if it is not JSON, or not an object) decoding fails with
//!    [`Error::ProtocolViolation`]
//!
//! # Examples
//!
//! ```rust
//! use jrmt_core::{EnvelopeCodec, Reply};
//! use serde_json::json;
//!
//! let codec = EnvelopeCodec::default();
//! let text = codec.encode_call("add", vec![json!(1), json!(2)]).unwrap();
//! let value: serde_json::Value = serde_json::from_str(&text).unwrap();
//! assert_eq!(value, json!({"method": "add", "params": [1, 2], "id": null, "jsonrpc": "1.1"}));
//!
//! assert_eq!(codec.decode_reply(br#"{"result": 3}"#).unwrap(), Reply::Success(json!(3)));
//! ```

use crate::error::{Error, ErrorPayload, Result};
use crate::types::{Reply, RequestEnvelope};
use serde::Serialize;
use serde_json::Value;

/// Encode any serializable message to a JSON string
pub fn encode<T: Serialize>(msg: &T) -> Result<String> {
    serde_json::to_string(msg).map_err(|e| Error::Serialization(e.to_string()))
}

/// Encoder for requests and decoder for replies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeCodec {
    version_tagging: bool,
}

impl Default for EnvelopeCodec {
    /// Version tagging on
    fn default() -> Self {
        Self::new(true)
    }
}

impl EnvelopeCodec {
    /// Create a codec; `version_tagging` controls the `jsonrpc` member
    pub fn new(version_tagging: bool) -> Self {
        Self { version_tagging }
    }

    /// Whether requests carry the `jsonrpc` version tag
    pub fn version_tagging(&self) -> bool {
        self.version_tagging
    }

    /// Build a call envelope (null `id`, reply expected)
    pub fn call(&self, method: impl Into<String>, params: Vec<Value>) -> RequestEnvelope {
        self.tag(RequestEnvelope::call(method, params))
    }

    /// Build a notification envelope (no `id`, no reply)
    pub fn notification(&self, method: impl Into<String>, params: Vec<Value>) -> RequestEnvelope {
        self.tag(RequestEnvelope::notification(method, params))
    }

    fn tag(&self, envelope: RequestEnvelope) -> RequestEnvelope {
        if self.version_tagging {
            envelope.versioned()
        } else {
            envelope
        }
    }

    /// Encode a call to request text
    pub fn encode_call(&self, method: impl Into<String>, params: Vec<Value>) -> Result<String> {
        encode(&self.call(method, params))
    }

    /// Encode a notification to request text
    pub fn encode_notification(
        &self,
        method: impl Into<String>,
        params: Vec<Value>,
    ) -> Result<String> {
        encode(&self.notification(method, params))
    }

    /// Decode reply bytes into a [`Reply`]
    pub fn decode_reply(&self, data: &[u8]) -> Result<Reply> {
        let value: Value = serde_json::from_slice(data)
            .map_err(|e| Error::ProtocolViolation(format!("reply is not valid JSON: {}", e)))?;

        let mut map = match value {
            Value::Object(map) => map,
            other => {
                return Err(Error::ProtocolViolation(format!(
                    "reply is not an object: {}",
                    other
                )))
            }
        };

        if let Some(error) = map.remove("error") {
            return Ok(Reply::Failure(ErrorPayload::new(error)));
        }
        match map.remove("result") {
            Some(result) => Ok(Reply::Success(result)),
            None => Err(Error::ProtocolViolation(
                "reply has neither 'result' nor 'error'".to_string(),
            )),
        }
    }

    /// Extract the result of a decoded reply
    ///
    /// Fails with [`Error::Remote`] when the reply carries an error payload.
    pub fn check_reply(&self, reply: Reply) -> Result<Value> {
        reply.into_result()
    }

    /// Decode reply bytes and extract the result in one step
    pub fn decode_result(&self, data: &[u8]) -> Result<Value> {
        self.check_reply(self.decode_reply(data)?)
    }
}
