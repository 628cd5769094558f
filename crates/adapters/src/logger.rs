//! JSON-lines logger adapter.

use crate::log_sink::LogSink;
use provider_settings_ports::{LogEvent, LogFields, LogLevel, LoggerPort};
use provider_settings_shared::{REDACTED, is_secret_key};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

const SERIALIZE_FAILED_LINE: &str = "{\"timestampMs\":0,\"level\":\"error\",\"event\":\"logger.serialize_failed\",\"message\":\"log serialization failed\"}\n";

/// One record as written to the sink.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LogRecord<'a> {
    timestamp_ms: u64,
    level: &'static str,
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "LogFields::is_empty")]
    fields: LogFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<Value>,
}

/// Logger that writes one JSON object per event.
///
/// Keys that look like secrets are replaced with a redaction marker at any
/// nesting depth, in both `fields` and `error`.
#[derive(Clone)]
pub struct JsonLogger {
    sink: Arc<dyn LogSink>,
    base_fields: LogFields,
    min_level: LogLevel,
}

impl JsonLogger {
    /// Logger at `info` level with no base fields.
    #[must_use]
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            base_fields: LogFields::new(),
            min_level: LogLevel::Info,
        }
    }

    /// Fields merged into every event (event fields win on conflict).
    #[must_use]
    pub fn with_base_fields(mut self, fields: LogFields) -> Self {
        self.base_fields = fields;
        self
    }

    /// Drop events below `level`.
    #[must_use]
    pub const fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    fn encode(&self, event: LogEvent) -> String {
        let mut fields = self.base_fields.clone();
        fields.extend(event.fields.unwrap_or_default());
        for (key, value) in &mut fields {
            redact(key, value);
        }
        let error = event.error.map(|mut value| {
            redact("", &mut value);
            value
        });

        let record = LogRecord {
            timestamp_ms: now_epoch_ms(),
            level: event.level.as_str(),
            event: &event.event,
            message: &event.message,
            fields,
            error,
        };
        serde_json::to_string(&record).map_or_else(
            |_| SERIALIZE_FAILED_LINE.to_owned(),
            |mut line| {
                line.push('\n');
                line
            },
        )
    }
}

impl LoggerPort for JsonLogger {
    fn log(&self, event: LogEvent) {
        if event.level < self.min_level {
            return;
        }
        self.sink.write_line(&self.encode(event));
    }

    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort> {
        let mut merged = self.base_fields.clone();
        merged.extend(fields);
        Box::new(Self {
            sink: Arc::clone(&self.sink),
            base_fields: merged,
            min_level: self.min_level,
        })
    }
}

fn redact(key: &str, value: &mut Value) {
    if is_secret_key(key) {
        *value = Value::String(REDACTED.to_owned());
        return;
    }
    match value {
        Value::Object(map) => {
            for (nested_key, nested) in map.iter_mut() {
                redact(nested_key, nested);
            }
        },
        Value::Array(items) => {
            for item in items {
                redact("", item);
            }
        },
        _ => {},
    }
}

fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|duration| u64::try_from(duration.as_millis()).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_sink::MemorySink;
    use provider_settings_ports::log_fields;
    use serde_json::json;
    use std::error::Error;

    fn single_record(sink: &MemorySink) -> Result<Value, Box<dyn Error>> {
        let lines = sink.take();
        let [line] = lines.as_slice() else {
            return Err(format!("expected one line, got {}", lines.len()).into());
        };
        assert!(line.ends_with('\n'));
        Ok(serde_json::from_str(line.trim_end())?)
    }

    #[test]
    fn secrets_are_redacted_at_any_depth() -> Result<(), Box<dyn Error>> {
        let sink = Arc::new(MemorySink::default());
        let logger = JsonLogger::new(sink.clone());

        logger.log(
            LogEvent::new(LogLevel::Warn, "validation.request.failed", "failed")
                .with_fields(Some(log_fields([
                    ("apiKey", json!("sk-live")), // pragma: allowlist secret
                    ("baseUrl", json!("http://localhost:6333")),
                ])))
                .with_error(json!({
                    "headers": [{ "authorization": "Bearer x" }],
                    "code": "validation:validator_failed"
                })),
        );

        let record = single_record(&sink)?;
        assert_eq!(record["level"], "warn");
        assert_eq!(record["event"], "validation.request.failed");
        assert_eq!(record["fields"]["apiKey"], REDACTED);
        assert_eq!(record["fields"]["baseUrl"], "http://localhost:6333");
        assert_eq!(record["error"]["headers"][0]["authorization"], REDACTED);
        assert_eq!(record["error"]["code"], "validation:validator_failed");
        Ok(())
    }

    #[test]
    fn events_below_min_level_are_dropped() {
        let sink = Arc::new(MemorySink::default());
        let logger = JsonLogger::new(sink.clone());

        logger.debug("validation.cache.invalidated", "dropped", None);
        assert!(sink.is_empty());

        let verbose = logger.with_min_level(LogLevel::Debug);
        verbose.debug("validation.cache.invalidated", "kept", None);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn child_fields_merge_with_base_fields() -> Result<(), Box<dyn Error>> {
        let sink = Arc::new(MemorySink::default());
        let logger = JsonLogger::new(sink.clone())
            .with_base_fields(log_fields([("component", json!("coordinator"))]));

        let child = logger.child(log_fields([("requestId", json!("val_7"))]));
        child.info(
            "validation.batch.start",
            "started",
            Some(log_fields([("requests", json!(2))])),
        );

        let record = single_record(&sink)?;
        assert_eq!(record["fields"]["component"], "coordinator");
        assert_eq!(record["fields"]["requestId"], "val_7");
        assert_eq!(record["fields"]["requests"], 2);
        assert!(record.get("error").is_none());
        Ok(())
    }
}
