use serde::{Deserialize, Serialize};

use crate::config::{LogConfig, LogTargetConfig, TargetKind};
use crate::level::level_number;
use crate::record::Fields;
use crate::sink::SharedStream;

/// Target type names understood by [`TargetSettings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetType {
    Console,
    Stream,
}

/// Parse a target `type` name. Matching is exact.
pub fn parse_target_type(name: &str) -> Option<TargetType> {
    match name {
        "console" => Some(TargetType::Console),
        "stream" => Some(TargetType::Stream),
        _ => None,
    }
}

/// Declarative form of one target, e.g.
/// `{"type": "stream", "level": "warn", "stream": "audit"}`.
///
/// Streams cannot be described in data, so a stream target names one and
/// the caller resolves the name in [`LoggerSettings::into_config`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSettings {
    pub level: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,
}

/// Declarative logger configuration, typically loaded from JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggerSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<Fields>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<TargetSettings>>,
}

/// Error type returned when building a configuration from settings.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid logger settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("target {index} has type \"stream\" but names no stream")]
    MissingStream { index: usize },

    #[error("target {index} refers to unknown stream {name:?}")]
    UnknownStream { index: usize, name: String },
}

impl LoggerSettings {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build a [`LogConfig`], resolving stream names through `resolve_stream`.
    ///
    /// Unknown target types and level names are kept: such targets simply
    /// never write.
    pub fn into_config<F>(self, resolve_stream: F) -> Result<LogConfig, ConfigError>
    where
        F: Fn(&str) -> Option<SharedStream>,
    {
        let targets = match self.targets {
            Some(targets) => Some(
                targets
                    .into_iter()
                    .enumerate()
                    .map(|(index, target)| make_target(index, target, &resolve_stream))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => None,
        };

        Ok(LogConfig {
            base: self.base,
            targets,
            get_config: None,
        })
    }
}

fn make_target<F>(index: usize, settings: TargetSettings, resolve_stream: &F) -> Result<LogTargetConfig, ConfigError>
where
    F: Fn(&str) -> Option<SharedStream>,
{
    if level_number(&settings.level).is_none() {
        tracing::debug!(index, level = %settings.level, "target level is not a known severity; target will never write");
    }

    let kind = match parse_target_type(&settings.kind) {
        Some(TargetType::Console) => TargetKind::Console,
        Some(TargetType::Stream) => {
            let name = settings.stream.ok_or(ConfigError::MissingStream { index })?;
            let stream = resolve_stream(&name).ok_or(ConfigError::UnknownStream { index, name })?;
            TargetKind::Stream(stream)
        }
        None => {
            tracing::debug!(index, kind = %settings.kind, "unknown target type; target will never write");
            TargetKind::Other(settings.kind)
        }
    };

    Ok(LogTargetConfig {
        level: settings.level,
        kind,
    })
}
