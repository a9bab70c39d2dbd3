//! Tracing subscriber setup.

use super::tracer;
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::resource::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// File name of the span log inside the data directory.
pub const SPAN_FILE_NAME: &str = "dashcat-spans.jsonl";

/// Installs the global subscriber: an `EnvFilter` plus an OpenTelemetry layer that writes
/// finished spans to `<data_dir>/dashcat-spans.jsonl`.
///
/// `RUST_LOG` wins over `config.trace_level`. Best-effort and idempotent: an unwritable
/// data directory or an already installed subscriber leaves tracing as it was, and the
/// return value reports whether this call installed anything.
///
/// # Example
///
/// ```rust,no_run
/// use dashcat::observability::init_tracing;
/// use dashcat::Config;
///
/// let config = Config {
///     trace_level: "debug".to_string(),
///     ..Default::default()
/// };
/// init_tracing(&config);
/// tracing::debug!("tracing is now active");
/// ```
pub fn init_tracing(config: &Config) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.trace_level.as_str()));

    if std::fs::create_dir_all(&config.data_dir).is_err() {
        return false;
    }

    let resource = Resource::new(vec![
        opentelemetry::KeyValue::new("service.name", "dashcat"),
        opentelemetry::KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ]);

    let provider = tracer::create_tracer_provider(config.data_dir.join(SPAN_FILE_NAME), resource);
    let otel_layer = OpenTelemetryLayer::new(provider.tracer("dashcat"));

    tracing_subscriber::registry()
        .with(filter)
        .with(otel_layer)
        .try_init()
        .is_ok()
}
