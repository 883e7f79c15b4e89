use std::fmt;
use std::sync::Arc;

use crate::level::{level_number, Level};
use crate::record::Fields;
use crate::sink::SharedStream;

/// Supplies a fresh configuration on demand.
///
/// When set, it is called on every packing and every dispatch; its result
/// replaces the stored base and targets for that single call.
pub type ConfigProvider = Arc<dyn Fn() -> LogConfig + Send + Sync>;

/// Where a target writes.
#[derive(Clone)]
pub enum TargetKind {
    /// One line per record on standard output.
    Console,
    /// JSON text plus `\n` handed to a caller-owned stream.
    Stream(SharedStream),
    /// Unrecognized type name. Such a target never writes.
    Other(String),
}

impl fmt::Debug for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Console => f.write_str("Console"),
            TargetKind::Stream(_) => f.write_str("Stream(..)"),
            TargetKind::Other(name) => f.debug_tuple("Other").field(name).finish(),
        }
    }
}

/// One output sink plus its minimum severity.
#[derive(Clone, Debug)]
pub struct LogTargetConfig {
    /// Severity name. A name outside the severity table silences the target.
    pub level: String,
    pub kind: TargetKind,
}

impl LogTargetConfig {
    pub fn console(level: Level) -> Self {
        LogTargetConfig {
            level: level.as_str().to_string(),
            kind: TargetKind::Console,
        }
    }

    pub fn stream(level: Level, stream: SharedStream) -> Self {
        LogTargetConfig {
            level: level.as_str().to_string(),
            kind: TargetKind::Stream(stream),
        }
    }

    /// Override the threshold with a raw name, as read from settings.
    pub fn with_level_name(mut self, name: impl Into<String>) -> Self {
        self.level = name.into();
        self
    }

    /// Minimum code this target writes, if its level name is known.
    pub fn min_level(&self) -> Option<u8> {
        level_number(&self.level)
    }

    /// Inclusive threshold check; unknown level names accept nothing.
    pub fn accepts(&self, level: u8) -> bool {
        self.min_level().is_some_and(|min| level >= min)
    }
}

/// Partial logger configuration. Every field is optional:
/// - `base` defaults to an empty mapping,
/// - `targets` defaults to a single console target at `info`.
#[derive(Clone, Default)]
pub struct LogConfig {
    pub base: Option<Fields>,
    pub targets: Option<Vec<LogTargetConfig>>,
    pub get_config: Option<ConfigProvider>,
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(mut self, base: Fields) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_targets(mut self, targets: Vec<LogTargetConfig>) -> Self {
        self.targets = Some(targets);
        self
    }

    /// Append one target, starting from an empty list.
    pub fn with_target(mut self, target: LogTargetConfig) -> Self {
        self.targets.get_or_insert_with(Vec::new).push(target);
        self
    }

    pub fn with_get_config<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> LogConfig + Send + Sync + 'static,
    {
        self.get_config = Some(Arc::new(provider));
        self
    }
}

impl fmt::Debug for LogConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogConfig")
            .field("base", &self.base)
            .field("targets", &self.targets)
            .field("get_config", &self.get_config.as_ref().map(|_| ".."))
            .finish()
    }
}

pub fn default_targets() -> Vec<LogTargetConfig> {
    vec![LogTargetConfig::console(Level::Info)]
}

/// Configuration with defaults applied, as held by a logger.
///
/// Children share `targets` and `get_config` with their parent.
#[derive(Clone)]
pub(crate) struct ResolvedConfig {
    pub base: Arc<Fields>,
    pub targets: Arc<[LogTargetConfig]>,
    pub get_config: Option<ConfigProvider>,
}

impl From<LogConfig> for ResolvedConfig {
    fn from(config: LogConfig) -> Self {
        ResolvedConfig {
            base: Arc::new(config.base.unwrap_or_default()),
            targets: config.targets.unwrap_or_else(default_targets).into(),
            get_config: config.get_config,
        }
    }
}
