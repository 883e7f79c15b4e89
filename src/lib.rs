//! Synchronous JSON-lines logging facade.
//!
//! A [`Logger`] packs each call into a [`LogRecord`] (base context, call
//! metadata, `level`, `msg`, `time`), then writes it as one JSON line to
//! every configured target whose minimum severity the record meets.
//!
//! ```
//! use std::sync::Arc;
//! use jsonl_logger::{create_logger, Level, LogConfig, LogTargetConfig, MemoryStream};
//! use serde_json::json;
//!
//! let stream = Arc::new(MemoryStream::new());
//! let logger = create_logger(
//!     LogConfig::new().with_target(LogTargetConfig::stream(Level::Info, stream.clone())),
//! );
//! let request = logger.child(json!({ "requestId": 7 }).as_object().cloned().unwrap_or_default());
//! request.info("handled").unwrap();
//! assert_eq!(stream.records()[0].msg, "handled");
//! ```

pub mod level;
pub mod record;
pub mod sink;
pub mod config;
pub mod logger;
pub mod memory;
pub mod settings;

#[cfg(feature = "channel")]
pub mod channel;

pub mod layer;
pub mod init;

pub use config::{default_targets, ConfigProvider, LogConfig, LogTargetConfig, TargetKind};
pub use level::{level_name, level_number, Level, LOG_LEVEL_NAMES, LOG_LEVEL_NUMBERS};
pub use logger::{create_logger, LogError, Logger};
pub use memory::MemoryStream;
pub use record::{Fields, LogArgs, LogRecord};
pub use sink::{LogStream, SharedStream, WriterStream};
