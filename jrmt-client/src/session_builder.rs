//! Session builder
//!
//! `SessionBuilder` collects the options for an [`RpcSession`] before any
//! traffic is sent:
//! - Reply timeout
//! - Whether to run the `system.describe` handshake on connect
//! - Whether requests carry the `jsonrpc: "1.1"` member
//! - Observability (OpenTelemetry)
//!
//! # Examples
//!
//! ```rust,no_run
//! use jrmt_client::{SessionBuilder, WsTransport};
//! use std::time::Duration;
//!
//! # async fn example() -> jrmt_core::Result<()> {
//! let transport = WsTransport::connect("ws://localhost:8080").await?;
//!
//! let session = SessionBuilder::new(transport, "calculator")
//!     .timeout(Duration::from_secs(5))
//!     .with_default_observability()
//!     .service_name("calculator-client")
//!     .connect()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use crate::{RpcSession, SessionConfig, SessionMetrics, Transport};
use jrmt_core::{Error, ObservabilityConfig, Result};
use std::sync::Arc;
use std::time::Duration;

/// Builder for configuring and creating an [`RpcSession`]
pub struct SessionBuilder {
    transport: Arc<dyn Transport>,
    destination: String,
    config: SessionConfig,
    observability_config: Option<ObservabilityConfig>,
    service_name: Option<String>,
}

impl SessionBuilder {
    /// Create a builder for sessions talking to `destination` over `transport`
    pub fn new(transport: impl Transport + 'static, destination: impl Into<String>) -> Self {
        Self {
            transport: Arc::new(transport),
            destination: destination.into(),
            config: SessionConfig::default(),
            observability_config: None,
            service_name: None,
        }
    }

    /// Bound every reply wait
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Wait for replies indefinitely (default)
    pub fn without_timeout(mut self) -> Self {
        self.config.timeout = None;
        self
    }

    /// Run the handshake on connect (default `true`)
    pub fn describe_on_connect(mut self, enable: bool) -> Self {
        self.config.describe_on_connect = enable;
        self
    }

    /// Tag requests with `jsonrpc: "1.1"` (default `true`)
    pub fn version_tagging(mut self, enable: bool) -> Self {
        self.config.version_tagging = enable;
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Enable OpenTelemetry observability with custom configuration
    pub fn with_observability(mut self, config: ObservabilityConfig) -> Self {
        self.observability_config = Some(config);
        self
    }

    /// Enable OpenTelemetry observability with default configuration
    pub fn with_default_observability(mut self) -> Self {
        self.observability_config = Some(ObservabilityConfig::default());
        self
    }

    /// Set service name for observability (used if observability is enabled)
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Build the session without sending anything
    ///
    /// Observability is not initialised; use [`connect`](Self::connect) for
    /// that.
    pub fn build(self) -> RpcSession {
        RpcSession::from_shared(self.transport, self.destination, self.config, None)
    }

    /// Build the session and, if enabled, run the handshake
    ///
    /// A failed handshake is returned as the error of this call.
    pub async fn connect(self) -> Result<RpcSession> {
        let metrics = if let Some(mut config) = self.observability_config {
            if let Some(name) = self.service_name {
                config.service_name = name;
            }

            jrmt_core::init_observability(config.clone()).map_err(|e| {
                Error::Internal(format!("Failed to initialize observability: {}", e))
            })?;

            Some(Arc::new(SessionMetrics::new(config.service_name.clone())))
        } else {
            None
        };

        let describe = self.config.describe_on_connect;
        let mut session =
            RpcSession::from_shared(self.transport, self.destination, self.config, metrics);

        tracing::info!(destination = %session.destination(), describe, "Opening session");
        if describe {
            session.describe().await?;
        }
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryTransport, SessionState};
    use serde_json::json;

    fn describing_peer() -> MemoryTransport {
        MemoryTransport::new(|_, request| match request["method"].as_str()? {
            "system.describe" => Some(json!({"result": {"procs": [
                {"name": "ping", "params": []}
            ]}})),
            "ping" => Some(json!({"result": "pong"})),
            _ => None,
        })
    }

    #[test]
    fn test_builder_creation() {
        let builder = SessionBuilder::new(MemoryTransport::silent(), "queue.rpc");
        assert_eq!(builder.destination, "queue.rpc");
        assert_eq!(builder.config, SessionConfig::default());
        assert!(builder.observability_config.is_none());
        assert!(builder.service_name.is_none());
    }

    #[test]
    fn test_builder_options() {
        let builder = SessionBuilder::new(MemoryTransport::silent(), "queue.rpc")
            .timeout(Duration::from_secs(2))
            .describe_on_connect(false)
            .version_tagging(false)
            .service_name("svc");
        assert_eq!(builder.config.timeout, Some(Duration::from_secs(2)));
        assert!(!builder.config.describe_on_connect);
        assert!(!builder.config.version_tagging);
        assert_eq!(builder.service_name.as_deref(), Some("svc"));

        let builder = builder.without_timeout();
        assert!(builder.config.timeout.is_none());
    }

    #[test]
    fn test_builder_with_config() {
        let config = SessionConfig::default().with_timeout(Duration::from_millis(10));
        let builder = SessionBuilder::new(MemoryTransport::silent(), "q").config(config.clone());
        assert_eq!(builder.config, config);
    }

    #[test]
    fn test_builder_with_observability() {
        let builder = SessionBuilder::new(MemoryTransport::silent(), "q")
            .with_default_observability()
            .service_name("my-client");
        assert!(builder.observability_config.is_some());
        assert_eq!(builder.service_name.as_deref(), Some("my-client"));
    }

    #[tokio::test]
    async fn test_build_sends_nothing() {
        let transport = describing_peer();
        let session = SessionBuilder::new(transport.clone(), "q").build();
        assert_eq!(session.state(), SessionState::Unconnected);
        assert!(transport.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_connect_describes_once() {
        let transport = describing_peer();
        let session = SessionBuilder::new(transport.clone(), "q").connect().await.unwrap();

        assert_eq!(session.state(), SessionState::Ready);
        assert!(session.service_description().unwrap().contains("ping", 0));
        assert_eq!(transport.sent().await.len(), 1);
    }

    #[tokio::test]
    async fn test_connect_without_describe() {
        let transport = describing_peer();
        let session = SessionBuilder::new(transport.clone(), "q")
            .describe_on_connect(false)
            .connect()
            .await
            .unwrap();

        assert_eq!(session.state(), SessionState::Unconnected);
        assert!(transport.sent().await.is_empty());
        assert_eq!(session.call("ping", vec![]).await.unwrap(), json!("pong"));
    }

    #[tokio::test]
    async fn test_connect_propagates_handshake_error() {
        let transport = MemoryTransport::new(|_, _| {
            Some(json!({"error": {"code": 500, "message": "describe disabled"}}))
        });
        let result = SessionBuilder::new(transport, "q").connect().await;
        assert!(matches!(result, Err(Error::Remote(_))));
    }
}
