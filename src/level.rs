use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity name to numeric code, ascending.
pub const LOG_LEVEL_NUMBERS: [(&str, u8); 6] = [
    ("trace", 10),
    ("debug", 20),
    ("info", 30),
    ("warn", 40),
    ("error", 50),
    ("fatal", 60),
];

/// Numeric code to severity name, ascending.
pub const LOG_LEVEL_NAMES: [(u8, &str); 6] = [
    (10, "trace"),
    (20, "debug"),
    (30, "info"),
    (40, "warn"),
    (50, "error"),
    (60, "fatal"),
];

/// Look up the numeric code of a severity name.
///
/// Names are matched exactly (`"INFO"` is not a severity).
pub fn level_number(name: &str) -> Option<u8> {
    LOG_LEVEL_NUMBERS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, code)| *code)
}

/// Look up the name of a severity code.
pub fn level_name(code: u8) -> Option<&'static str> {
    LOG_LEVEL_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// One of the six ordered severities a record can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 10,
    Debug = 20,
    Info = 30,
    Warn = 40,
    Error = 50,
    Fatal = 60,
}

impl Level {
    pub const ALL: [Level; 6] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
    ];

    /// Numeric code written into the `level` field of a record.
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Level::ALL.into_iter().find(|level| level.code() == code)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a severity.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown log level name: {0:?}")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        level_number(s)
            .and_then(Level::from_code)
            .ok_or_else(|| ParseLevelError(s.to_string()))
    }
}
