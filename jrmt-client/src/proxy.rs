//! Typed dispatch onto a session
//!
//! A [`RemoteInterface`] lists the procedures a local trait stands for, as
//! [`MethodSignature`]s resolved at compile time. [`RemoteProxy`] routes an
//! invocation by signature: procedures that return nothing become
//! notifications, everything else becomes a call.
//!
//! The `#[remote_interface]` attribute from `jrmt-macros` generates both
//! halves for a trait. They can also be written by hand:
//!
//! ```rust
//! use jrmt_client::{MemoryTransport, MethodSignature, RemoteInterface, RemoteProxy, RpcSession, SessionConfig};
//! use serde_json::json;
//!
//! struct Calculator;
//!
//! impl RemoteInterface for Calculator {
//!     const NAME: &'static str = "Calculator";
//!     const METHODS: &'static [MethodSignature] = &[
//!         MethodSignature::value("add", 2),
//!         MethodSignature::unit("reset", 0),
//!     ];
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> jrmt_core::Result<()> {
//! let transport = MemoryTransport::new(|_, _| Some(json!({"result": 3})));
//! let session = RpcSession::new(transport, "calc", SessionConfig::default());
//! let proxy = RemoteProxy::new(&session);
//!
//! let add = Calculator::signature("add").unwrap();
//! assert_eq!(proxy.invoke(add, vec![json!(1), json!(2)]).await?, Some(json!(3)));
//! # Ok(())
//! # }
//! ```

use crate::RpcSession;
use jrmt_core::{Error, Result, ServiceDescription};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// What a remote procedure hands back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    /// Nothing; invoked as a notification
    Unit,
    /// A JSON value; invoked as a call
    Value,
}

/// Wire name, parameter count and return kind of one procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodSignature {
    /// Procedure name on the wire
    pub name: &'static str,
    /// Number of positional parameters
    pub arity: usize,
    /// Whether a reply is expected
    pub returns: ReturnKind,
}

impl MethodSignature {
    /// Signature of a procedure that returns a value
    pub const fn value(name: &'static str, arity: usize) -> Self {
        Self {
            name,
            arity,
            returns: ReturnKind::Value,
        }
    }

    /// Signature of a procedure invoked as a notification
    pub const fn unit(name: &'static str, arity: usize) -> Self {
        Self {
            name,
            arity,
            returns: ReturnKind::Unit,
        }
    }
}

/// A local description of a remote service's procedures
pub trait RemoteInterface {
    /// Name of the interface, for diagnostics
    const NAME: &'static str;

    /// Every procedure the interface exposes
    const METHODS: &'static [MethodSignature];

    /// Signature with the given wire name
    fn signature(name: &str) -> Option<&'static MethodSignature> {
        Self::METHODS.iter().find(|sig| sig.name == name)
    }

    /// Procedures the peer's description does not list
    ///
    /// Notifications are checked too: a peer that does not describe a
    /// procedure will most likely drop messages for it.
    fn missing_procedures(description: &ServiceDescription) -> Vec<&'static MethodSignature> {
        Self::METHODS
            .iter()
            .filter(|sig| !description.contains(sig.name, sig.arity))
            .collect()
    }
}

/// Routes invocations onto a borrowed session
#[derive(Debug, Clone, Copy)]
pub struct RemoteProxy<'a> {
    session: &'a RpcSession,
}

impl<'a> RemoteProxy<'a> {
    /// Proxy over `session`
    pub fn new(session: &'a RpcSession) -> Self {
        Self { session }
    }

    /// Session invocations are sent through
    pub fn session(&self) -> &'a RpcSession {
        self.session
    }

    /// Invoke the procedure described by `signature`
    ///
    /// Returns `Ok(None)` for notifications and `Ok(Some(result))` for calls.
    /// Fails with [`Error::InvalidParams`] before sending anything when the
    /// argument count does not match the signature.
    pub async fn invoke(
        &self,
        signature: &MethodSignature,
        args: Vec<Value>,
    ) -> Result<Option<Value>> {
        if args.len() != signature.arity {
            return Err(Error::InvalidParams(format!(
                "{} expects {} argument(s), got {}",
                signature.name,
                signature.arity,
                args.len()
            )));
        }

        match signature.returns {
            ReturnKind::Unit => {
                self.session.notify(signature.name, args).await?;
                Ok(None)
            }
            ReturnKind::Value => self.session.call(signature.name, args).await.map(Some),
        }
    }
}

/// Convert an argument into a positional parameter
pub fn to_param<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| Error::Serialization(e.to_string()))
}

/// Convert an invocation result into the declared return type
///
/// A notification's `None` is read as JSON `null`.
pub fn from_result<T: DeserializeOwned>(result: Option<Value>) -> Result<T> {
    serde_json::from_value(result.unwrap_or(Value::Null))
        .map_err(|e| Error::Serialization(e.to_string()))
}
