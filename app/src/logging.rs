use crate::config::CONFIG;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::TracerProvider;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs the global subscriber.
/// With `TRACE_STDOUT` set, spans are additionally exported as OpenTelemetry traces to stdout
pub fn init() {
    let level = CONFIG
        .log_level()
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::INFO);

    let telemetry = if CONFIG.trace_stdout() {
        let provider = TracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build();
        let tracer = provider.tracer("irrigation");
        let _ = opentelemetry::global::set_tracer_provider(provider);
        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(level)
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();
}

pub fn shutdown() {
    if CONFIG.trace_stdout() {
        opentelemetry::global::shutdown_tracer_provider();
    }
}
