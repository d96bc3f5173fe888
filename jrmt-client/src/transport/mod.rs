//! Transport contract
//!
//! A session does not move bytes itself. It hands an encoded envelope to a
//! [`Transport`] together with a destination (a queue, routing key, topic, or
//! whatever addressing the transport uses) and either waits for the
//! correlated reply (`send`) or fires and forgets (`publish`).
//!
//! Correlating replies with requests, redelivery, and connection management
//! belong to the transport. Timeouts are applied by the session around
//! `send`, so implementations may wait indefinitely.
//!
//! Two implementations ship with the crate:
//!
//! - [`MemoryTransport`]: an in-process peer driven by a closure
//! - [`WsTransport`]: a single WebSocket peer

mod memory;
mod ws;

pub use memory::{MemoryTransport, SentMessage};
pub use ws::WsTransport;

use async_trait::async_trait;
use jrmt_core::Error;
use std::sync::Arc;

/// Failures a transport can report
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The transport gave up waiting for a reply
    #[error("transport timeout")]
    Timeout,

    /// The connection was shut down or the peer disconnected
    #[error("transport shut down: {0}")]
    Shutdown(String),

    /// Any other local send or receive failure
    #[error("transport I/O error: {0}")]
    Io(String),
}

impl From<TransportError> for Error {
    // Shutdown is a local I/O failure, never a remote procedure error.
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => Error::Timeout,
            TransportError::Shutdown(reason) => {
                Error::Io(format!("connection shut down: {}", reason))
            }
            TransportError::Io(reason) => Error::Io(reason),
        }
    }
}

/// Message transport used by [`RpcSession`](crate::RpcSession)
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver `request` to `destination` and wait for the correlated reply
    async fn send(&self, destination: &str, request: Vec<u8>) -> Result<Vec<u8>, TransportError>;

    /// Deliver `payload` to `destination` without expecting a reply
    async fn publish(&self, destination: &str, payload: Vec<u8>) -> Result<(), TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, destination: &str, request: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        (**self).send(destination, request).await
    }

    async fn publish(&self, destination: &str, payload: Vec<u8>) -> Result<(), TransportError> {
        (**self).publish(destination, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_maps_to_io() {
        let error: Error = TransportError::Shutdown("peer closed".into()).into();
        match error {
            Error::Io(msg) => assert!(msg.contains("peer closed")),
            other => panic!("expected Io, got {:?}", other),
        }
    }

    #[test]
    fn test_timeout_maps_to_timeout() {
        assert!(matches!(Error::from(TransportError::Timeout), Error::Timeout));
        assert!(matches!(
            Error::from(TransportError::Io("broken pipe".into())),
            Error::Io(_)
        ));
    }
}
