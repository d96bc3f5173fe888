//! Session lifecycle
//!
//! ```text
//! Unconnected → Describing → Ready
//!                    ↓
//!                  Failed
//! ```
//!
//! `Describing` is entered for the `system.describe` handshake. The session
//! ends up `Ready` with a cached service description, or `Failed` if the
//! handshake errored, timed out, or the transport shut down. A session built
//! without a handshake stays `Unconnected` but can still make calls.

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No handshake has run
    Unconnected,
    /// The handshake call is in flight
    Describing,
    /// The service description is cached
    Ready,
    /// The last handshake failed
    Failed,
}

impl SessionState {
    /// Value reported on the `jrmt.session.state` gauge
    pub fn as_metric(&self) -> i64 {
        match self {
            SessionState::Unconnected => 0,
            SessionState::Describing => 1,
            SessionState::Ready => 2,
            SessionState::Failed => 3,
        }
    }

    /// Whether a service description is available
    pub fn is_ready(&self) -> bool {
        matches!(self, SessionState::Ready)
    }
}
