//! OTLP trace export

use opentelemetry::trace::TraceError;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace as sdktrace, Resource};
use opentelemetry_semantic_conventions::resource::SERVICE_NAME;
use std::collections::HashMap;

/// Headers sent with every OTLP export request
pub fn otlp_headers(target_package: &str, bearer_token: Option<&str>) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert(
        "x-observe-target-package".to_string(),
        target_package.to_string(),
    );
    if let Some(token) = bearer_token {
        headers.insert("Authorization".to_string(), format!("Bearer {}", token));
    }
    headers
}

/// Install a batching OTLP/HTTP tracer as the global tracer provider
pub fn init_tracer(
    endpoint: &str,
    service_name: &str,
    bearer_token: Option<&str>,
) -> Result<sdktrace::Tracer, TraceError> {
    let exporter = opentelemetry_otlp::new_exporter()
        .http()
        .with_endpoint(format!("{}/v1/traces", endpoint.trim_end_matches('/')))
        .with_headers(otlp_headers("Tracing", bearer_token));

    opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter)
        .with_trace_config(
            sdktrace::config().with_resource(Resource::new(vec![KeyValue::new(
                SERVICE_NAME,
                service_name.to_string(),
            )])),
        )
        .install_batch(runtime::Tokio)
}

/// Flush pending spans
pub fn shutdown() {
    opentelemetry::global::shutdown_tracer_provider();
}
