//! JSON-RPC 1.1 client sessions over message transports
//!
//! This crate turns a message transport (anything that can deliver a byte
//! payload to a destination and optionally wait for a correlated reply) into
//! a JSON-RPC client. A session can fetch the peer's self-description with
//! `system.describe` and use it to coerce textual arguments into typed
//! parameters.
//!
//! # Core Features
//!
//! - **Pluggable Transport**: implement [`Transport`] for any broker or socket
//! - **Calls and Notifications**: request-reply calls and fire-and-forget messages
//! - **Service Discovery**: cached `system.describe` handshake
//! - **Positional Strings**: call procedures from command-line style arguments
//! - **Typed Proxies**: [`RemoteProxy`] and the `#[remote_interface]` attribute
//! - **Observability**: OpenTelemetry traces and metrics
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use jrmt_client::{RpcSession, WsTransport};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = WsTransport::connect("ws://localhost:8080").await?;
//!     let session = RpcSession::connect(transport, "calculator").await?;
//!
//!     // Typed call
//!     let sum = session.call("add", vec![json!(1), json!(2)]).await?;
//!     println!("Sum: {}", sum);
//!
//!     // Arguments coerced by the service description
//!     let sum = session.call_by_positional_strings(&["add", "1", "2"]).await?;
//!     println!("Sum: {}", sum);
//!
//!     // Notification
//!     session.notify("log", vec![json!("done")]).await?;
//!     Ok(())
//! }
//! ```

mod config;
mod metrics;
mod proxy;
mod session;
mod session_builder;
mod session_state;
pub mod transport;

pub use config::SessionConfig;
pub use metrics::SessionMetrics;
pub use proxy::{from_result, to_param, MethodSignature, RemoteInterface, RemoteProxy, ReturnKind};
pub use session::RpcSession;
pub use session_builder::SessionBuilder;
pub use session_state::SessionState;
pub use transport::{MemoryTransport, SentMessage, Transport, TransportError, WsTransport};
