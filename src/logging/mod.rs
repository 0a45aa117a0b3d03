//! Logging initialization with environment-based formatters
//!
//! - Production: Structured JSON logs carrying the active span plus its OTel
//!   `trace_id`/`span_id`, so each line joins to the exported trace
//! - Sandbox: Colorful, human-readable logs for development
//!
//! Spans are additionally exported over OTLP when `OTEL_EXPORTER_OTLP_ENDPOINT` is set.

use crate::config::{get_environment, get_otlp_bearer_token, get_otlp_endpoint, get_service_name};
use crate::telemetry::otel;
use opentelemetry::trace::{SpanId, TraceContextExt, TraceId};
use std::fmt::{self as stdfmt, Write as _};
use tracing::{info, warn, Event, Subscriber};
use tracing_opentelemetry::OtelData;
use tracing_subscriber::{
    fmt::{
        self,
        format::{Format, Json, JsonFields, Writer},
        FmtContext, FormatEvent, FormatFields,
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Wraps a JSON event formatter and adds the OTel ids of the current span
pub struct TraceIdFormat<F> {
    inner: F,
}

impl<F> TraceIdFormat<F> {
    pub fn new(inner: F) -> Self {
        Self { inner }
    }
}

impl<S, N, F> FormatEvent<S, N> for TraceIdFormat<F>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
    F: FormatEvent<S, N>,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> stdfmt::Result {
        let mut line = String::new();
        self.inner.format_event(ctx, Writer::new(&mut line), event)?;

        let ids = ctx.lookup_current().and_then(|span| {
            let extensions = span.extensions();
            let otel = extensions.get::<OtelData>()?;
            let trace_id = otel
                .builder
                .trace_id
                .unwrap_or_else(|| otel.parent_cx.span().span_context().trace_id());
            let span_id = otel.builder.span_id.unwrap_or(SpanId::INVALID);
            (trace_id != TraceId::INVALID).then_some((trace_id, span_id))
        });

        let Some((trace_id, span_id)) = ids else {
            return writer.write_str(&line);
        };

        match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(line.trim_end()) {
            Ok(mut record) => {
                record.insert("trace_id".into(), trace_id.to_string().into());
                record.insert("span_id".into(), span_id.to_string().into());
                let encoded = serde_json::to_string(&record).map_err(|_| stdfmt::Error)?;
                writeln!(writer, "{}", encoded)
            }
            Err(_) => writer.write_str(&line),
        }
    }
}

/// JSON output layer used in production
pub fn json_layer<S>() -> fmt::Layer<S, JsonFields, TraceIdFormat<Format<Json>>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let format = fmt::format()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    fmt::layer().json().event_format(TraceIdFormat::new(format))
}

/// Initialize logging (and trace export) based on the environment
pub fn init_logging() {
    let env = get_environment();
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let is_production = matches!(env.as_str(), "production" | "prod");

    let endpoint = get_otlp_endpoint();
    let mut otel_error = None;
    let otel_layer = match endpoint.as_deref() {
        Some(endpoint) => match otel::init_tracer(
            endpoint,
            &get_service_name(),
            get_otlp_bearer_token().as_deref(),
        ) {
            Ok(tracer) => Some(tracing_opentelemetry::layer().with_tracer(tracer)),
            Err(e) => {
                otel_error = Some(e.to_string());
                None
            }
        },
        None => None,
    };

    if is_production {
        // Production: Structured JSON logs
        tracing_subscriber::registry()
            .with(env_filter)
            .with(otel_layer)
            .with(json_layer().with_writer(std::io::stdout))
            .init();
    } else {
        // Sandbox/Development: Colorful, human-readable logs
        tracing_subscriber::registry()
            .with(env_filter)
            .with(otel_layer)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_ansi(true)
                    .with_writer(std::io::stdout),
            )
            .init();
    }

    match (endpoint, otel_error) {
        (Some(endpoint), None) => info!(endpoint = %endpoint, "OTLP trace export enabled"),
        (Some(endpoint), Some(e)) => {
            warn!(endpoint = %endpoint, error = %e, "Failed to initialize OTLP trace export")
        }
        (None, _) => {}
    }
}

/// Flush exporters before the process exits
pub fn shutdown() {
    otel::shutdown();
}
