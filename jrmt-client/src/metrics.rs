//! Session metrics
//!
//! Recorded when a session is built with observability enabled:
//!
//! - `jrmt.session.state`: lifecycle state (gauge, see [`SessionState::as_metric`])
//! - `jrmt.session.calls.total`: calls made, by method and status (counter)
//! - `jrmt.session.call.duration`: seconds from send to decoded reply (histogram)
//! - `jrmt.session.notifications.total`: notifications published (counter)
//! - `jrmt.session.errors.total`: failures by [`Error::kind`](jrmt_core::Error::kind) (counter)
//! - `jrmt.session.handshakes.total`: `system.describe` attempts by status (counter)

use crate::SessionState;
use opentelemetry::{
    global,
    metrics::{Counter, Gauge, Histogram, Meter},
    InstrumentationScope, KeyValue,
};

/// OpenTelemetry instruments for one session
pub struct SessionMetrics {
    /// Lifecycle state
    pub state: Gauge<i64>,
    /// Calls made
    pub calls_total: Counter<u64>,
    /// Call latency in seconds
    pub call_duration: Histogram<f64>,
    /// Notifications published
    pub notifications_total: Counter<u64>,
    /// Failures by kind
    pub errors_total: Counter<u64>,
    /// Handshake attempts
    pub handshakes_total: Counter<u64>,
}

impl SessionMetrics {
    /// Instruments from the global meter provider, scoped to `service_name`
    pub fn new(service_name: impl Into<String>) -> Self {
        let scope = InstrumentationScope::builder(service_name.into())
            .with_version(env!("CARGO_PKG_VERSION"))
            .build();
        Self::new_with_meter(&global::meter_with_scope(scope))
    }

    /// Instruments from an explicit meter
    pub fn new_with_meter(meter: &Meter) -> Self {
        Self {
            state: meter
                .i64_gauge("jrmt.session.state")
                .with_description("Session state (0=unconnected, 1=describing, 2=ready, 3=failed)")
                .build(),
            calls_total: meter
                .u64_counter("jrmt.session.calls.total")
                .with_description("Total number of calls made")
                .build(),
            call_duration: meter
                .f64_histogram("jrmt.session.call.duration")
                .with_description("Call duration in seconds")
                .build(),
            notifications_total: meter
                .u64_counter("jrmt.session.notifications.total")
                .with_description("Total number of notifications published")
                .build(),
            errors_total: meter
                .u64_counter("jrmt.session.errors.total")
                .with_description("Total number of failed calls and notifications")
                .build(),
            handshakes_total: meter
                .u64_counter("jrmt.session.handshakes.total")
                .with_description("Total number of system.describe handshakes")
                .build(),
        }
    }

    /// Record a state transition
    pub fn update_state(&self, state: SessionState) {
        self.state.record(state.as_metric(), &[]);
    }

    /// Record a finished call
    pub fn record_call(&self, method: &str, status: &str, duration_secs: f64) {
        let attributes = &[
            KeyValue::new("method", method.to_string()),
            KeyValue::new("status", status.to_string()),
        ];
        self.calls_total.add(1, attributes);
        self.call_duration.record(duration_secs, attributes);
    }

    /// Record a published notification
    pub fn record_notification(&self, method: &str) {
        self.notifications_total
            .add(1, &[KeyValue::new("method", method.to_string())]);
    }

    /// Record a failure of the given kind
    pub fn record_error(&self, kind: &'static str) {
        self.errors_total.add(1, &[KeyValue::new("kind", kind)]);
    }

    /// Record a handshake outcome
    pub fn record_handshake(&self, status: &'static str) {
        self.handshakes_total.add(1, &[KeyValue::new("status", status)]);
    }
}
