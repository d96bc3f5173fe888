//! JRMT - JSON-RPC over Message Transports
//!
//! This is the main convenience crate that re-exports all JRMT sub-crates.
//! Use this crate if you want a single dependency for sessions, transports
//! and typed proxies.
//!
//! # Architecture
//!
//! JRMT is organized into modular crates:
//!
//! - **jrmt-core**: Envelope codec, type coercion, service descriptions, errors, observability
//! - **jrmt-client**: RPC sessions, the transport contract, bundled transports, proxies
//! - **jrmt-macros**: The `#[remote_interface]` attribute
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use jrmt::{RpcSession, SessionBuilder};
//! use jrmt::client::WsTransport;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = WsTransport::connect("ws://localhost:8080").await?;
//!     let session: RpcSession = SessionBuilder::new(transport, "calculator")
//!         .timeout(Duration::from_secs(5))
//!         .connect()
//!         .await?;
//!
//!     let sum = session.call_by_positional_strings(&["add", "5", "3"]).await?;
//!     println!("Result: {}", sum);
//!     Ok(())
//! }
//! ```
//!
//! # Typed Proxies
//!
//! ```rust,ignore
//! use jrmt::remote_interface;
//!
//! #[remote_interface]
//! pub trait Calculator {
//!     fn add(&self, a: i64, b: i64) -> i64;
//! }
//!
//! let sum = CalculatorProxy::new(&session).add(5, 3).await?;
//! ```

// Re-export all public APIs from sub-crates
pub use jrmt_client as client;
pub use jrmt_core as core;
pub use jrmt_macros::remote_interface;

// Convenience re-exports of the most commonly used types
pub use jrmt_client::{RpcSession, SessionBuilder};
pub use jrmt_core::{Error, Result};
