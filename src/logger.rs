use std::borrow::Cow;
use std::io::{self, Write};

use serde_json::Value;

use crate::config::{LogConfig, LogTargetConfig, ResolvedConfig, TargetKind};
use crate::level::Level;
use crate::record::{merge_record, pack_record, Fields, LogArgs, LogRecord};

/// Error surfaced by a logging call.
#[derive(thiserror::Error, Debug)]
pub enum LogError {
    #[error("failed to serialize log record: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A target's writer failed; the error is passed through untouched.
    #[error(transparent)]
    Write(#[from] io::Error),
}

/// Structured logger writing JSON lines to its configured targets.
///
/// Cloning is cheap and yields a logger with the same configuration.
#[derive(Clone)]
pub struct Logger {
    config: ResolvedConfig,
}

/// Create a logger, filling in defaults for the missing parts of `config`.
pub fn create_logger(config: LogConfig) -> Logger {
    Logger::new(config)
}

impl Default for Logger {
    fn default() -> Self {
        Logger::new(LogConfig::default())
    }
}

impl Logger {
    pub fn new(config: LogConfig) -> Self {
        Logger {
            config: config.into(),
        }
    }

    /// Stored base context. A configuration provider does not change it.
    pub fn base(&self) -> &Fields {
        &self.config.base
    }

    pub fn targets(&self) -> &[LogTargetConfig] {
        &self.config.targets
    }

    /// The provider's result when one is set, otherwise the stored config.
    /// Never cached: every call asks the provider again.
    fn effective(&self) -> Cow<'_, ResolvedConfig> {
        match &self.config.get_config {
            Some(provider) => Cow::Owned(provider().into()),
            None => Cow::Borrowed(&self.config),
        }
    }

    /// Build a record at `level` without dispatching it.
    pub fn pack(&self, level: Level, args: impl Into<LogArgs>) -> LogRecord {
        let config = self.effective();
        pack_record(&config.base, level.code(), args.into())
    }

    /// Always merges `data`, even with an empty message.
    pub(crate) fn pack_merged(&self, level: Level, data: Value, msg: String) -> LogRecord {
        let config = self.effective();
        merge_record(&config.base, data, level.code(), msg)
    }

    /// Dispatch a record to every target whose threshold it meets, in order.
    ///
    /// All targets are attempted even when one fails; the first write error
    /// is returned afterwards.
    pub fn log(&self, record: &LogRecord) -> Result<(), LogError> {
        let config = self.effective();
        let mut line: Option<String> = None;
        let mut first_error: Option<io::Error> = None;

        for target in config.targets.iter() {
            if !target.accepts(record.level) {
                continue;
            }
            if line.is_none() {
                line = Some(serde_json::to_string(record)?);
            }
            let text = line.as_deref().unwrap_or_default();

            let outcome = match &target.kind {
                TargetKind::Console => write_console(text),
                TargetKind::Stream(stream) => stream.write(&format!("{text}\n")),
                TargetKind::Other(_) => Ok(()),
            };
            if let Err(e) = outcome {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(LogError::Write(e)),
            None => Ok(()),
        }
    }

    /// Pack at `level` and dispatch.
    pub fn log_at(&self, level: Level, args: impl Into<LogArgs>) -> Result<(), LogError> {
        self.log(&self.pack(level, args))
    }

    pub fn trace(&self, args: impl Into<LogArgs>) -> Result<(), LogError> {
        self.log_at(Level::Trace, args)
    }

    pub fn debug(&self, args: impl Into<LogArgs>) -> Result<(), LogError> {
        self.log_at(Level::Debug, args)
    }

    pub fn info(&self, args: impl Into<LogArgs>) -> Result<(), LogError> {
        self.log_at(Level::Info, args)
    }

    pub fn warn(&self, args: impl Into<LogArgs>) -> Result<(), LogError> {
        self.log_at(Level::Warn, args)
    }

    pub fn error(&self, args: impl Into<LogArgs>) -> Result<(), LogError> {
        self.log_at(Level::Error, args)
    }

    pub fn fatal(&self, args: impl Into<LogArgs>) -> Result<(), LogError> {
        self.log_at(Level::Fatal, args)
    }

    /// New logger whose base is this logger's base extended by `props`.
    ///
    /// Targets and the configuration provider are shared with the parent,
    /// which is left untouched.
    pub fn child(&self, props: Fields) -> Logger {
        let mut base = Fields::clone(&self.config.base);
        base.extend(props);
        Logger {
            config: ResolvedConfig {
                base: base.into(),
                targets: self.config.targets.clone(),
                get_config: self.config.get_config.clone(),
            },
        }
    }
}

fn write_console(text: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{text}")
}
