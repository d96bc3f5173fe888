//! In-process transport
//!
//! [`MemoryTransport`] plays the peer with a closure: every sent request is
//! handed to the closure, whose return value is the reply. Returning `None`
//! means the peer never answers, so the call waits until the session's
//! timeout fires or the transport is shut down.
//!
//! All traffic is recorded and can be inspected with
//! [`MemoryTransport::sent`].

use super::{Transport, TransportError};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

type Responder = dyn Fn(&str, &[u8]) -> Option<Vec<u8>> + Send + Sync;

/// A message that went through a [`MemoryTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Destination it was addressed to
    pub destination: String,
    /// Raw bytes as handed to the transport
    pub payload: Vec<u8>,
    /// `true` for `send`, `false` for `publish`
    pub expects_reply: bool,
}

impl SentMessage {
    /// Payload decoded as JSON, if it is JSON
    pub fn json(&self) -> Option<Value> {
        serde_json::from_slice(&self.payload).ok()
    }
}

/// Transport whose peer is a closure in the same process
///
/// Clones share the peer, the recorded traffic and the shutdown state.
///
/// # Examples
///
/// ```rust
/// use jrmt_client::{MemoryTransport, Transport};
/// use serde_json::json;
///
/// # #[tokio::main]
/// # async fn main() {
/// let transport = MemoryTransport::new(|_destination, request| {
///     let sum: i64 = request["params"].as_array()?.iter().filter_map(|v| v.as_i64()).sum();
///     Some(json!({"result": sum}))
/// });
///
/// let reply = transport
///     .send("calculator", br#"{"method":"add","params":[1,2]}"#.to_vec())
///     .await
///     .unwrap();
/// assert_eq!(reply, br#"{"result":3}"#.to_vec());
/// # }
/// ```
#[derive(Clone)]
pub struct MemoryTransport {
    responder: Arc<Responder>,
    sent: Arc<Mutex<Vec<SentMessage>>>,
    shutdown: Arc<watch::Sender<Option<String>>>,
}

impl MemoryTransport {
    /// Peer that sees each request as decoded JSON and answers with JSON
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str, &Value) -> Option<Value> + Send + Sync + 'static,
    {
        Self::raw(move |destination, request| {
            let request: Value = serde_json::from_slice(request).ok()?;
            responder(destination, &request).map(|reply| reply.to_string().into_bytes())
        })
    }

    /// Peer that works on raw bytes, for replies that are not valid JSON
    pub fn raw<F>(responder: F) -> Self
    where
        F: Fn(&str, &[u8]) -> Option<Vec<u8>> + Send + Sync + 'static,
    {
        let (shutdown, _) = watch::channel(None);
        Self {
            responder: Arc::new(responder),
            sent: Arc::new(Mutex::new(Vec::new())),
            shutdown: Arc::new(shutdown),
        }
    }

    /// Peer that never answers
    pub fn silent() -> Self {
        Self::raw(|_, _| None)
    }

    /// Everything sent or published so far, oldest first
    pub async fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    /// Simulate the connection going away
    ///
    /// Calls waiting for a reply fail immediately and later operations fail
    /// with [`TransportError::Shutdown`].
    pub fn shut_down(&self, reason: impl Into<String>) {
        self.shutdown.send_replace(Some(reason.into()));
    }

    /// Whether [`shut_down`](Self::shut_down) has been called
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.borrow().is_some()
    }

    fn shutdown_reason(&self) -> Option<String> {
        self.shutdown.borrow().clone()
    }

    async fn record(&self, destination: &str, payload: &[u8], expects_reply: bool) {
        self.sent.lock().await.push(SentMessage {
            destination: destination.to_string(),
            payload: payload.to_vec(),
            expects_reply,
        });
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, destination: &str, request: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        let mut shutdown = self.shutdown.subscribe();
        if let Some(reason) = self.shutdown_reason() {
            return Err(TransportError::Shutdown(reason));
        }

        self.record(destination, &request, true).await;
        if let Some(reply) = (self.responder)(destination, &request) {
            return Ok(reply);
        }

        // No reply is coming; only a shutdown ends the wait.
        loop {
            if shutdown.changed().await.is_err() {
                return Err(TransportError::Shutdown("transport dropped".to_string()));
            }
            let reason = shutdown.borrow_and_update().clone();
            if let Some(reason) = reason {
                return Err(TransportError::Shutdown(reason));
            }
        }
    }

    async fn publish(&self, destination: &str, payload: Vec<u8>) -> Result<(), TransportError> {
        if let Some(reason) = self.shutdown_reason() {
            return Err(TransportError::Shutdown(reason));
        }

        self.record(destination, &payload, false).await;
        // The peer sees the notification; anything it returns is dropped.
        let _ = (self.responder)(destination, &payload);
        Ok(())
    }
}
