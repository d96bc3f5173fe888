//! RPC session over a [`Transport`]
//!
//! A session binds a transport, a destination and a [`SessionConfig`]. It
//! encodes calls into JSON-RPC 1.1 envelopes, hands them to the transport,
//! and decodes the replies. The optional `system.describe` handshake caches
//! the peer's [`ServiceDescription`], which is what lets
//! [`RpcSession::call_by_positional_strings`] turn textual arguments into
//! typed parameters.
//!
//! # Examples
//!
//! ```rust
//! use jrmt_client::{MemoryTransport, RpcSession, SessionConfig};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> jrmt_core::Result<()> {
//! let transport = MemoryTransport::new(|_, request| match request["method"].as_str()? {
//!     "add" => Some(json!({"result": 3})),
//!     _ => None,
//! });
//!
//! let session = RpcSession::new(transport, "calculator", SessionConfig::default());
//! let sum = session.call("add", vec![json!(1), json!(2)]).await?;
//! assert_eq!(sum, json!(3));
//! # Ok(())
//! # }
//! ```

use crate::{SessionBuilder, SessionConfig, SessionMetrics, SessionState, Transport};
use jrmt_core::{EnvelopeCodec, Error, Result, ServiceDescription, DESCRIBE_PROCEDURE};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Client end of a JSON-RPC conversation with one destination
pub struct RpcSession {
    transport: Arc<dyn Transport>,
    destination: String,
    config: SessionConfig,
    codec: EnvelopeCodec,
    state: SessionState,
    description: Option<ServiceDescription>,
    pub(crate) metrics: Option<Arc<SessionMetrics>>,
}

impl RpcSession {
    /// Create an unconnected session; no traffic is sent
    pub fn new(
        transport: impl Transport + 'static,
        destination: impl Into<String>,
        config: SessionConfig,
    ) -> Self {
        Self::from_shared(Arc::new(transport), destination.into(), config, None)
    }

    pub(crate) fn from_shared(
        transport: Arc<dyn Transport>,
        destination: String,
        config: SessionConfig,
        metrics: Option<Arc<SessionMetrics>>,
    ) -> Self {
        let codec = EnvelopeCodec::new(config.version_tagging);
        Self {
            transport,
            destination,
            config,
            codec,
            state: SessionState::Unconnected,
            description: None,
            metrics,
        }
    }

    /// Start configuring a session
    pub fn builder(
        transport: impl Transport + 'static,
        destination: impl Into<String>,
    ) -> SessionBuilder {
        SessionBuilder::new(transport, destination)
    }

    /// Connect with the default configuration, running the handshake
    pub async fn connect(
        transport: impl Transport + 'static,
        destination: impl Into<String>,
    ) -> Result<Self> {
        SessionBuilder::new(transport, destination).connect().await
    }

    /// Fetch and cache the peer's service description
    ///
    /// Any earlier description is dropped first. On failure the session is
    /// left [`SessionState::Failed`] and the error is returned unchanged.
    #[tracing::instrument(skip(self), fields(destination = %self.destination))]
    pub async fn describe(&mut self) -> Result<&ServiceDescription> {
        self.description = None;
        self.set_state(SessionState::Describing);

        let outcome = match self.call(DESCRIBE_PROCEDURE, Vec::new()).await {
            Ok(value) => ServiceDescription::from_value(value),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(description) => {
                tracing::debug!(procedures = description.len(), "Service description cached");
                if let Some(ref m) = self.metrics {
                    m.record_handshake("success");
                }
                self.set_state(SessionState::Ready);
                Ok(self.description.insert(description))
            }
            Err(e) => {
                tracing::debug!(error = %e, "Handshake failed");
                if let Some(ref m) = self.metrics {
                    m.record_handshake("error");
                }
                self.set_state(SessionState::Failed);
                Err(e)
            }
        }
    }

    /// Call `method` and wait for its result
    ///
    /// The wait is bounded by the configured timeout. On expiry the request
    /// is abandoned and [`Error::Timeout`] is returned.
    #[tracing::instrument(skip(self, params), fields(destination = %self.destination))]
    pub async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        let start = Instant::now();
        let outcome = self.exchange(method, params).await;
        let duration = start.elapsed().as_secs_f64();

        if let Some(ref m) = self.metrics {
            match &outcome {
                Ok(_) => m.record_call(method, "success", duration),
                Err(e) => {
                    m.record_call(method, "error", duration);
                    m.record_error(e.kind());
                }
            }
        }

        match &outcome {
            Ok(_) => tracing::debug!(duration_secs = duration, "Call completed"),
            Err(e) => tracing::debug!(duration_secs = duration, error = %e, "Call failed"),
        }
        outcome
    }

    async fn exchange(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        let request = self.codec.encode_call(method, params)?;
        tracing::debug!(request = %request, "Sending request");

        let pending = self.transport.send(&self.destination, request.into_bytes());
        let reply = match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, pending)
                .await
                .map_err(|_| Error::Timeout)??,
            None => pending.await?,
        };

        tracing::debug!(bytes = reply.len(), "Reply received");
        self.codec.decode_result(&reply)
    }

    /// Publish a notification; no reply is awaited
    #[tracing::instrument(skip(self, params), fields(destination = %self.destination))]
    pub async fn notify(&self, method: &str, params: Vec<Value>) -> Result<()> {
        let notification = self.codec.encode_notification(method, params)?;
        tracing::debug!(notification = %notification, "Publishing notification");

        let outcome = self
            .transport
            .publish(&self.destination, notification.into_bytes())
            .await
            .map_err(Error::from);

        if let Some(ref m) = self.metrics {
            match &outcome {
                Ok(()) => m.record_notification(method),
                Err(e) => m.record_error(e.kind()),
            }
        }
        outcome
    }

    /// Call a procedure named by `args[0]` with textual arguments `args[1..]`
    ///
    /// Each argument is coerced to the type the cached service description
    /// declares for its position.
    ///
    /// # Errors
    ///
    /// - [`Error::ProcedureNotFound`] when `args` is empty or the description
    ///   has no procedure with that name and argument count
    /// - [`Error::NoServiceDescription`] when no handshake has succeeded
    /// - [`Error::Coercion`] or [`Error::UnknownType`] when an argument
    ///   cannot be converted
    #[tracing::instrument(skip(self, args), fields(destination = %self.destination))]
    pub async fn call_by_positional_strings<S: AsRef<str>>(&self, args: &[S]) -> Result<Value> {
        let Some((method, rest)) = args.split_first() else {
            return Err(Error::ProcedureNotFound {
                name: String::new(),
                arity: 0,
            });
        };
        let method = method.as_ref();

        let description = self
            .description
            .as_ref()
            .ok_or(Error::NoServiceDescription)?;
        let procedure = description.get_procedure(method, rest.len())?;
        let params = procedure.coerce_args(rest)?;

        self.call(method, params).await
    }

    /// Cached description from the last successful handshake
    pub fn service_description(&self) -> Option<&ServiceDescription> {
        self.description.as_ref()
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Destination every message is addressed to
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Configuration the session was created with
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn set_state(&mut self, state: SessionState) {
        self.state = state;
        if let Some(ref m) = self.metrics {
            m.update_state(state);
        }
    }
}

impl std::fmt::Debug for RpcSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcSession")
            .field("destination", &self.destination)
            .field("config", &self.config)
            .field("state", &self.state)
            .field("described", &self.description.is_some())
            .finish()
    }
}
