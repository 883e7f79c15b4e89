use chrono::Utc;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::level::Level;

/// Free-form metadata merged into records.
pub type Fields = Map<String, Value>;

/// Keys owned by the record itself; metadata never overrides them.
pub const RESERVED_KEYS: [&str; 3] = ["level", "msg", "time"];

/// One log line.
///
/// Serialized as a single flat JSON object: the metadata keys followed by
/// `level`, `msg` and `time`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogRecord {
    /// Milliseconds since the Unix epoch at packing time.
    pub time: i64,
    pub level: u8,
    pub msg: String,
    #[serde(flatten)]
    pub fields: Fields,
}

impl LogRecord {
    pub fn new(level: Level, msg: impl Into<String>) -> Self {
        LogRecord {
            time: now_millis(),
            level: level.code(),
            msg: msg.into(),
            fields: Fields::new(),
        }
    }
}

impl Serialize for LogRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in &self.fields {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry("level", &self.level)?;
        map.serialize_entry("msg", &self.msg)?;
        map.serialize_entry("time", &self.time)?;
        map.end()
    }
}

/// Arguments of a severity call: either a bare message, or metadata plus
/// a message.
///
/// ```
/// use jsonl_logger::record::LogArgs;
/// use serde_json::json;
///
/// let bare: LogArgs = "started".into();
/// let with_data: LogArgs = (json!({ "requestId": 7 }), "handled").into();
/// # let _ = (bare, with_data);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum LogArgs {
    Message(String),
    WithData(Value, String),
}

impl LogArgs {
    /// Metadata from any serializable value. Values that fail to serialize
    /// contribute no fields.
    pub fn with_data<T: Serialize>(data: T, msg: impl Into<String>) -> Self {
        LogArgs::WithData(serde_json::to_value(data).unwrap_or(Value::Null), msg.into())
    }
}

impl From<&str> for LogArgs {
    fn from(msg: &str) -> Self {
        LogArgs::Message(msg.to_string())
    }
}

impl From<String> for LogArgs {
    fn from(msg: String) -> Self {
        LogArgs::Message(msg)
    }
}

impl From<(Value, &str)> for LogArgs {
    fn from((data, msg): (Value, &str)) -> Self {
        LogArgs::WithData(data, msg.to_string())
    }
}

impl From<(Value, String)> for LogArgs {
    fn from((data, msg): (Value, String)) -> Self {
        LogArgs::WithData(data, msg)
    }
}

impl From<(Fields, &str)> for LogArgs {
    fn from((data, msg): (Fields, &str)) -> Self {
        LogArgs::WithData(Value::Object(data), msg.to_string())
    }
}

impl From<(Fields, String)> for LogArgs {
    fn from((data, msg): (Fields, String)) -> Self {
        LogArgs::WithData(Value::Object(data), msg)
    }
}

pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Build a record from the base context and call arguments.
///
/// A non-empty message selects the metadata form; otherwise `data` itself
/// becomes the message.
pub fn pack_record(base: &Fields, level: u8, args: LogArgs) -> LogRecord {
    match args {
        LogArgs::WithData(data, msg) if !msg.is_empty() => merge_record(base, data, level, msg),
        LogArgs::WithData(data, _) => merge_record(base, Value::Null, level, message_text(data)),
        LogArgs::Message(msg) => merge_record(base, Value::Null, level, msg),
    }
}

/// `base`, then the top-level entries of `data`, then the fixed keys.
pub(crate) fn merge_record(base: &Fields, data: Value, level: u8, msg: String) -> LogRecord {
    let mut fields = base.clone();
    spread_into(&mut fields, data);
    for key in RESERVED_KEYS {
        fields.remove(key);
    }
    LogRecord {
        time: now_millis(),
        level,
        msg,
        fields,
    }
}

/// Shallow spread: objects give their entries, arrays and strings give
/// index keys, other scalars give nothing.
fn spread_into(fields: &mut Fields, data: Value) {
    match data {
        Value::Object(map) => fields.extend(map),
        Value::Array(items) => {
            for (index, item) in items.into_iter().enumerate() {
                fields.insert(index.to_string(), item);
            }
        }
        Value::String(text) => {
            for (index, ch) in text.chars().enumerate() {
                fields.insert(index.to_string(), Value::String(ch.to_string()));
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

fn message_text(data: Value) -> String {
    match data {
        Value::String(text) => text,
        other => other.to_string(),
    }
}
