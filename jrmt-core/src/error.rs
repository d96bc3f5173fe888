//! Error types for jrmt
//!
//! Every failure a caller can observe is a variant of [`Error`]. The variants
//! follow the order in which a call can fail:
//!
//! - **Local input**: `UnknownType`, `Coercion`, `ProcedureNotFound`,
//!   `NoServiceDescription`, `InvalidParams` are raised before anything is sent
//! - **Transport**: `Timeout` and `Io` come from the transport collaborator
//! - **Peer**: `Remote` carries an `error` payload the peer returned, while
//!   `ProtocolViolation` means the reply could not be understood at all
//!
//! # Remote vs. transport failures
//!
//! `Error::Remote` means the peer received the call and rejected it.
//! `Error::Io` means the connection failed; a shutdown observed mid-call is
//! reported as `Io`, never as `Remote`.
//!
//! # Examples
//!
//! ```rust
//! use jrmt_core::{Error, ErrorPayload};
//! use serde_json::json;
//!
//! let error = Error::Remote(ErrorPayload::new(json!({"code": 404, "message": "no such user"})));
//! assert_eq!(error.kind(), "remote");
//! assert!(error.is_remote());
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Result type for jrmt operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all jrmt operations
///
/// The enum is `Clone` so a failed handshake can be both stored and returned.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The peer answered with an `error` member
    ///
    /// The payload is carried exactly as it was decoded.
    #[error("Remote procedure error: {0}")]
    Remote(ErrorPayload),

    /// The reply was not valid JSON, not an object, or had neither
    /// `result` nor `error`
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// A textual argument could not be converted to its declared type
    #[error("Cannot coerce {value:?} to '{type_tag}': {reason}")]
    Coercion {
        /// The textual input
        value: String,
        /// The declared type tag
        type_tag: String,
        /// Why the conversion failed
        reason: String,
    },

    /// A type tag outside {bit, num, str, arr, obj, any, nil}
    #[error("Bad type: {0}")]
    UnknownType(String),

    /// No procedure with this exact name and arity is described
    #[error("Procedure not found: {name}/{arity}")]
    ProcedureNotFound {
        /// Procedure name that was looked up
        name: String,
        /// Number of parameters that was looked up
        arity: usize,
    },

    /// The `system.describe` reply could not be read as a service description
    #[error("Malformed service description: {0}")]
    MalformedDescription(String),

    /// The session has no cached service description
    ///
    /// Raised by operations that need the procedure schema when the
    /// handshake was skipped or failed.
    #[error("No service description available")]
    NoServiceDescription,

    /// No reply arrived within the configured bound
    ///
    /// The request is abandoned; it is never retried.
    #[error("Request timeout")]
    Timeout,

    /// Local transport failure, including shutdown or disconnect signals
    #[error("IO error: {0}")]
    Io(String),

    /// Serialization or deserialization of a Rust value failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Arguments do not fit the invoked method signature
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Unexpected internal failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable tag naming the error kind
    ///
    /// Used as the `kind` attribute on error metrics and handy for callers that
    /// want to branch on kind without matching every field.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Remote(_) => "remote",
            Error::ProtocolViolation(_) => "protocol_violation",
            Error::Coercion { .. } => "coercion",
            Error::UnknownType(_) => "unknown_type",
            Error::ProcedureNotFound { .. } => "procedure_not_found",
            Error::MalformedDescription(_) => "malformed_description",
            Error::NoServiceDescription => "no_service_description",
            Error::Timeout => "timeout",
            Error::Io(_) => "io",
            Error::Serialization(_) => "serialization",
            Error::InvalidParams(_) => "invalid_params",
            Error::Internal(_) => "internal",
        }
    }

    /// True when the peer explicitly rejected the call
    pub fn is_remote(&self) -> bool {
        matches!(self, Error::Remote(_))
    }

    /// True for failures detected before any request was sent
    pub fn is_local_input(&self) -> bool {
        matches!(
            self,
            Error::Coercion { .. }
                | Error::UnknownType(_)
                | Error::ProcedureNotFound { .. }
                | Error::NoServiceDescription
                | Error::InvalidParams(_)
        )
    }

    /// Build a coercion error for `value` declared as `type_tag`
    pub fn coercion(
        value: impl Into<String>,
        type_tag: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Error::Coercion {
            value: value.into(),
            type_tag: type_tag.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// The `error` member of a reply, kept verbatim
///
/// JSON-RPC 1.1 peers conventionally send an object such as
/// `{"name": "JSONRPCError", "code": 123, "message": "...", "error": ...}`,
/// but nothing is assumed: the accessors return `None` for missing or
/// differently-typed members and [`ErrorPayload::value`] always gives back
/// the exact decoded value.
///
/// # Examples
///
/// ```rust
/// use jrmt_core::ErrorPayload;
/// use serde_json::json;
///
/// let payload = ErrorPayload::new(json!({"code": 500, "message": "bad"}));
/// assert_eq!(payload.code(), Some(500));
/// assert_eq!(payload.message(), Some("bad"));
/// assert_eq!(payload.to_string(), "[500] bad");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorPayload(Value);

impl ErrorPayload {
    /// Wrap a decoded `error` value
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The payload exactly as decoded
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Consume the payload, returning the decoded value
    pub fn into_value(self) -> Value {
        self.0
    }

    /// The `name` member, if present
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// The `code` member, if present and integral
    pub fn code(&self) -> Option<i64> {
        self.0.get("code").and_then(Value::as_i64)
    }

    /// The `message` member, if present
    pub fn message(&self) -> Option<&str> {
        self.0.get("message").and_then(Value::as_str)
    }

    /// The nested `error` member carrying peer-specific detail, if present
    pub fn detail(&self) -> Option<&Value> {
        self.0.get("error")
    }
}

impl std::fmt::Display for ErrorPayload {
    /// Formats as "[code] message" when both are present, falling back to
    /// the raw JSON text otherwise.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.code(), self.message()) {
            (Some(code), Some(message)) => write!(f, "[{}] {}", code, message),
            (None, Some(message)) => write!(f, "{}", message),
            _ => write!(f, "{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_accessors() {
        let payload = ErrorPayload::new(json!({
            "name": "JSONRPCError",
            "code": 123,
            "message": "division by zero",
            "error": {"operand": 0}
        }));

        assert_eq!(payload.name(), Some("JSONRPCError"));
        assert_eq!(payload.code(), Some(123));
        assert_eq!(payload.message(), Some("division by zero"));
        assert_eq!(payload.detail(), Some(&json!({"operand": 0})));
    }

    #[test]
    fn test_payload_is_verbatim() {
        let raw = json!({"message": "bad", "extra": [1, 2, 3]});
        let payload = ErrorPayload::new(raw.clone());
        assert_eq!(payload.value(), &raw);
        assert_eq!(payload.into_value(), raw);
    }

    #[test]
    fn test_payload_display() {
        assert_eq!(
            ErrorPayload::new(json!({"code": 7, "message": "nope"})).to_string(),
            "[7] nope"
        );
        assert_eq!(ErrorPayload::new(json!({"message": "bad"})).to_string(), "bad");
        assert_eq!(ErrorPayload::new(json!("plain")).to_string(), "\"plain\"");
    }

    #[test]
    fn test_payload_serializes_transparently() {
        let payload = ErrorPayload::new(json!({"message": "bad"}));
        assert_eq!(serde_json::to_value(&payload).unwrap(), json!({"message": "bad"}));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::Timeout.kind(), "timeout");
        assert_eq!(Error::Io("closed".into()).kind(), "io");
        assert_eq!(
            Error::ProcedureNotFound {
                name: "add".into(),
                arity: 3
            }
            .kind(),
            "procedure_not_found"
        );
        assert_eq!(Error::UnknownType("foo".into()).kind(), "unknown_type");
    }

    #[test]
    fn test_local_input_classification() {
        assert!(Error::coercion("abc", "num", "not a number").is_local_input());
        assert!(Error::NoServiceDescription.is_local_input());
        assert!(!Error::Timeout.is_local_input());
        assert!(!Error::Remote(ErrorPayload::new(json!({}))).is_local_input());
    }

    #[test]
    fn test_error_display() {
        let error = Error::ProcedureNotFound {
            name: "add".into(),
            arity: 3,
        };
        assert_eq!(error.to_string(), "Procedure not found: add/3");

        let error = Error::coercion("abc", "num", "invalid digit");
        assert_eq!(error.to_string(), "Cannot coerce \"abc\" to 'num': invalid digit");

        assert_eq!(Error::UnknownType("foo".into()).to_string(), "Bad type: foo");
    }

    #[test]
    fn test_error_from_serde() {
        let serde_error = serde_json::from_str::<Value>("{\"invalid\": json").unwrap_err();
        match Error::from(serde_error) {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            other => panic!("Expected Serialization error, got {:?}", other),
        }
    }
}
