//! Log severity threshold

use std::fmt;

use serde::Deserialize;

/// Severity of a log line, ordered from most to least severe.
///
/// A configured level lets through its own lines and every more severe one:
/// `warn` keeps warnings and errors and drops info lines. Access log lines
/// are governed by `logging.access_log` instead.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[serde(alias = "warning")]
    Warn,
    #[default]
    Info,
}

impl LogLevel {
    /// True when a line of `severity` passes this threshold
    pub const fn allows(self, severity: Self) -> bool {
        severity as u8 <= self as u8
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
        })
    }
}
