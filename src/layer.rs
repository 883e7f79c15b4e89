use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use crate::level::Level;
use crate::logger::Logger;
use crate::record::Fields;

/// `tracing_subscriber` layer that turns events into records on a
/// [`Logger`].
///
/// Event fields become record metadata, the `message` field becomes `msg`
/// and the event target is stored under `target`. Dispatch is synchronous
/// on the emitting thread; write failures are reported on stderr and never
/// reach the call site.
pub struct LoggerLayer {
    logger: Logger,
    min_level: Level,
    /// Total events seen by the layer (before filtering by level).
    pub total_events: Arc<AtomicU64>,
    /// Events dispatched to the logger without error.
    pub written_events: Arc<AtomicU64>,
    /// Events whose dispatch returned an error.
    pub failed_events: Arc<AtomicU64>,
}

impl LoggerLayer {
    pub fn new(logger: Logger, min_level: Level) -> Self {
        LoggerLayer {
            logger,
            min_level,
            total_events: Arc::new(AtomicU64::new(0)),
            written_events: Arc::new(AtomicU64::new(0)),
            failed_events: Arc::new(AtomicU64::new(0)),
        }
    }
}

/// `tracing` has no fatal level; its five levels map onto the lower five.
pub fn map_tracing_level(level: &tracing::Level) -> Level {
    match *level {
        tracing::Level::TRACE => Level::Trace,
        tracing::Level::DEBUG => Level::Debug,
        tracing::Level::INFO => Level::Info,
        tracing::Level::WARN => Level::Warn,
        _ => Level::Error,
    }
}

impl<S> Layer<S> for LoggerLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);

        let meta = event.metadata();
        let level = map_tracing_level(meta.level());
        if level < self.min_level {
            return;
        }

        let mut fields = Fields::new();
        let mut message: Option<String> = None;
        let mut visitor = FieldVisitor {
            fields: &mut fields,
            message: &mut message,
        };
        event.record(&mut visitor);
        fields
            .entry("target")
            .or_insert_with(|| Value::String(meta.target().to_string()));

        let record = self
            .logger
            .pack_merged(level, Value::Object(fields), message.unwrap_or_default());

        match self.logger.log(&record) {
            Ok(()) => {
                self.written_events.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.failed_events.fetch_add(1, Ordering::Relaxed);
                eprintln!("error writing log record: {}", e);
            }
        }
    }
}

pub struct FieldVisitor<'a> {
    pub fields: &'a mut Fields,
    pub message: &'a mut Option<String>,
}

impl<'a> FieldVisitor<'a> {
    fn insert(&mut self, field: &Field, value: Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.insert(field, Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        // `message` arrives here when it was built with format arguments.
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.insert(field, Value::String(format!("{:?}", value)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LogConfig, LogTargetConfig};
    use crate::memory::MemoryStream;
    use serde_json::json;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::Registry;

    fn logger_into(stream: Arc<MemoryStream>) -> Logger {
        Logger::new(
            LogConfig::new()
                .with_base(json!({ "service": "billing" }).as_object().cloned().unwrap())
                .with_target(LogTargetConfig::stream(Level::Trace, stream)),
        )
    }

    #[test]
    fn events_become_records() {
        let stream = Arc::new(MemoryStream::new());
        let layer = LoggerLayer::new(logger_into(stream.clone()), Level::Info);
        let written = layer.written_events.clone();
        let subscriber = Registry::default().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(order_id = 123, retry = true, "order {} failed", 123);
        });

        let records = stream.records();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.level, 50);
        assert_eq!(record.msg, "order 123 failed");
        assert_eq!(record.fields.get("order_id"), Some(&json!(123)));
        assert_eq!(record.fields.get("retry"), Some(&json!(true)));
        assert_eq!(record.fields.get("service"), Some(&json!("billing")));
        assert!(record.fields.contains_key("target"));
        assert_eq!(written.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn events_below_min_level_are_counted_but_dropped() {
        let stream = Arc::new(MemoryStream::new());
        let layer = LoggerLayer::new(logger_into(stream.clone()), Level::Warn);
        let total = layer.total_events.clone();
        let subscriber = Registry::default().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("ignored");
            tracing::warn!("kept");
        });

        assert_eq!(total.load(Ordering::Relaxed), 2);
        let records = stream.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].msg, "kept");
    }

    #[test]
    fn maps_all_tracing_levels() {
        assert_eq!(map_tracing_level(&tracing::Level::TRACE), Level::Trace);
        assert_eq!(map_tracing_level(&tracing::Level::WARN), Level::Warn);
        assert_eq!(map_tracing_level(&tracing::Level::ERROR), Level::Error);
    }
}
