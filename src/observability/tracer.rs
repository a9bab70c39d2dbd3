//! Tracer provider that exports finished spans as JSON lines.
//!
//! Every span becomes one self-contained JSON object on its own line, so the trace file
//! can be tailed, grepped, or fed to `jq` without a collector.

use super::file_writer::FileWriter;
use futures_util::future::BoxFuture;
use opentelemetry::trace::{SpanId, Status, TraceError};
use opentelemetry::{KeyValue, Value};
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::TracerProvider;
use serde_json::{json, Map, Value as JsonValue};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

struct JsonLinesExporter {
    writer: FileWriter,
    /// Resource attributes stamped onto every line.
    resource: JsonValue,
    is_shutdown: AtomicBool,
}

impl JsonLinesExporter {
    fn new(writer: FileWriter, resource: &Resource) -> Self {
        Self {
            writer,
            resource: resource_json(resource),
            is_shutdown: AtomicBool::new(false),
        }
    }
}

impl SpanExporter for JsonLinesExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        if self.is_shutdown.load(Ordering::SeqCst) {
            return Box::pin(std::future::ready(Err(TraceError::from(
                "exporter is shut down",
            ))));
        }

        for span in &batch {
            let line = format_span(span, &self.resource).to_string();
            if let Err(e) = self.writer.write_line(&line) {
                return Box::pin(std::future::ready(Err(TraceError::from(e.to_string()))));
            }
        }
        Box::pin(std::future::ready(Ok(())))
    }

    fn shutdown(&mut self) {
        self.is_shutdown.store(true, Ordering::SeqCst);
    }

    fn set_resource(&mut self, res: &Resource) {
        self.resource = resource_json(res);
    }
}

impl std::fmt::Debug for JsonLinesExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesExporter")
            .field("writer", &self.writer)
            .field("is_shutdown", &self.is_shutdown)
            .finish_non_exhaustive()
    }
}

/// Builds a provider that writes each finished span to `file_path` as it ends.
pub fn create_tracer_provider(file_path: PathBuf, resource: Resource) -> TracerProvider {
    let exporter = JsonLinesExporter::new(FileWriter::new(file_path), &resource);

    TracerProvider::builder()
        .with_config(opentelemetry_sdk::trace::Config::default().with_resource(resource))
        .with_simple_exporter(exporter)
        .build()
}

fn unix_nanos(time: SystemTime) -> u128 {
    time.duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos()
}

fn format_span(span: &SpanData, resource: &JsonValue) -> JsonValue {
    let parent = if span.parent_span_id == SpanId::INVALID {
        JsonValue::Null
    } else {
        json!(format!("{:016x}", span.parent_span_id))
    };
    let duration_us = span
        .end_time
        .duration_since(span.start_time)
        .unwrap_or_default()
        .as_micros();
    let (status, status_message) = match &span.status {
        Status::Unset => ("unset", String::new()),
        Status::Ok => ("ok", String::new()),
        Status::Error { description } => ("error", description.to_string()),
    };
    let events: Vec<JsonValue> = span
        .events
        .iter()
        .map(|event| {
            json!({
                "name": event.name,
                "timeUnixNano": unix_nanos(event.timestamp).to_string(),
                "attributes": attributes_json(&event.attributes),
            })
        })
        .collect();

    json!({
        "traceId": format!("{:032x}", span.span_context.trace_id()),
        "spanId": format!("{:016x}", span.span_context.span_id()),
        "parentSpanId": parent,
        "name": span.name,
        "startTimeUnixNano": unix_nanos(span.start_time).to_string(),
        "durationMicros": duration_us.to_string(),
        "attributes": attributes_json(&span.attributes),
        "events": events,
        "status": status,
        "statusMessage": status_message,
        "resource": resource,
    })
}

fn attributes_json(attributes: &[KeyValue]) -> JsonValue {
    let map: Map<String, JsonValue> = attributes
        .iter()
        .map(|kv| (kv.key.to_string(), value_json(&kv.value)))
        .collect();
    JsonValue::Object(map)
}

fn resource_json(resource: &Resource) -> JsonValue {
    let map: Map<String, JsonValue> = resource
        .iter()
        .map(|(key, value)| (key.to_string(), value_json(value)))
        .collect();
    JsonValue::Object(map)
}

fn value_json(value: &Value) -> JsonValue {
    match value {
        Value::Bool(b) => json!(b),
        Value::I64(i) => json!(i),
        Value::F64(f) => json!(f),
        Value::String(s) => json!(s.as_str()),
        Value::Array(_) => json!(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_keep_their_json_type() {
        assert_eq!(value_json(&Value::Bool(true)), json!(true));
        assert_eq!(value_json(&Value::I64(7)), json!(7));
        assert_eq!(value_json(&Value::from("x")), json!("x"));
    }

    #[test]
    fn attributes_become_an_object() {
        let attrs = [KeyValue::new("record_count", 6_i64), KeyValue::new("id", "1")];
        assert_eq!(attributes_json(&attrs), json!({"record_count": 6, "id": "1"}));
    }
}
