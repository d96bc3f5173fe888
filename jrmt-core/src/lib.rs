//! Protocol core for jrmt: JSON-RPC 1.1 over message transports
//!
//! This crate holds everything about the protocol that does not depend on
//! how bytes travel:
//!
//! - **Coercion**: textual arguments to declared parameter types
//! - **Description**: the `system.describe` service catalog
//! - **Codec**: request envelopes out, reply envelopes in
//! - **Error handling**: one error enum for every failure a caller can see
//! - **Observability**: OpenTelemetry and `tracing` bootstrap
//!
//! The `jrmt-client` crate puts these together into a session over a
//! pluggable transport.
//!
//! # Example
//!
//! ```rust
//! use jrmt_core::{EnvelopeCodec, ServiceDescription};
//! use serde_json::json;
//!
//! let description = ServiceDescription::from_value(json!({
//!     "procs": [{"name": "add", "params": [{"name": "a", "type": "num"}, {"name": "b", "type": "num"}]}]
//! })).unwrap();
//!
//! let add = description.get_procedure("add", 2).unwrap();
//! let params = add.coerce_args(&["1", "2"]).unwrap();
//!
//! let request = EnvelopeCodec::default().encode_call("add", params).unwrap();
//! assert!(request.contains("\"params\":[1,2]"));
//! ```

pub mod codec;
pub mod coerce;
pub mod description;
pub mod error;
pub mod observability;
pub mod types;

pub use codec::EnvelopeCodec;
pub use coerce::{coerce, TypeTag};
pub use description::{
    ParameterDescription, ProcedureDescription, ServiceDescription, DESCRIBE_PROCEDURE,
};
pub use error::{Error, ErrorPayload, Result};
pub use observability::{init_observability, shutdown_observability, ObservabilityConfig};
pub use types::{Id, Reply, RequestEnvelope, JSON_RPC_VERSION};
