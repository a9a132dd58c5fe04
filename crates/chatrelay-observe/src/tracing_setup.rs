//! Tracing subscriber initialization for the relay daemon.
//!
//! Installs a structured `fmt` layer and, when requested, bridges spans to
//! OpenTelemetry through a stdout exporter (swap for OTLP in production).
//!
//! ```no_run
//! chatrelay_observe::tracing_setup::init_tracing(false).unwrap();
//! ```

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use std::sync::OnceLock;

/// Filter applied when `RUST_LOG` is unset. Relay internals at debug,
/// everything else (sqlx, hyper) at info.
const DEFAULT_FILTER: &str = "info,chatrelay=debug";

/// Stores the OTel tracer provider so it can be shut down cleanly on exit.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Initialize the global tracing subscriber.
///
/// Honors `RUST_LOG` when present and falls back to [`DEFAULT_FILTER`].
/// Span close events are logged so slow relay teardowns show up in the
/// output without extra instrumentation.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed.
pub fn init_tracing(enable_otel: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE);

    let registry = tracing_subscriber::registry().with(env_filter).with(fmt_layer);

    if enable_otel {
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build();
        let tracer = provider.tracer("chatrelay");

        let _ = TRACER_PROVIDER.set(provider.clone());
        opentelemetry::global::set_tracer_provider(provider);

        registry
            .with(tracing_opentelemetry::layer().with_tracer(tracer))
            .init();
    } else {
        registry.init();
    }

    Ok(())
}

/// Flush buffered spans and shut down the tracer provider.
///
/// No-op when OTel export was never enabled.
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            eprintln!("Warning: OTel tracer provider shutdown error: {e}");
        }
    }
}
