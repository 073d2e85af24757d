use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::error::{LoggerError, LoggerResult};

/// Environment variable that replaces the configured level when set.
pub const RIG_LOG_ENV: &str = "RIG_LOG";

/// Validated `EnvFilter` directive string, e.g. `"info"` or `"rig_core=debug,info"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LoggerLevel(String);

impl LoggerLevel {
    pub fn new(s: impl Into<String>) -> LoggerResult<Self> {
        Self::try_from(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `raw` if it is set to a non-empty valid filter, otherwise `self`.
    ///
    /// An invalid override is an error rather than silently ignored.
    pub fn overridden_by(self, raw: Option<&str>) -> LoggerResult<Self> {
        match raw.map(str::trim) {
            Some(s) if !s.is_empty() => Self::new(s),
            _ => Ok(self),
        }
    }

    /// Apply the `RIG_LOG` environment override.
    pub fn with_env_override(self) -> LoggerResult<Self> {
        let raw = std::env::var(RIG_LOG_ENV).ok();
        self.overridden_by(raw.as_deref())
    }

    pub fn to_env_filter(&self) -> LoggerResult<EnvFilter> {
        EnvFilter::try_new(&self.0).map_err(|e| LoggerError::InvalidLevel(format!("{}: {e}", self.0)))
    }
}

impl Default for LoggerLevel {
    fn default() -> Self {
        Self("info".to_string())
    }
}

impl FromStr for LoggerLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for LoggerLevel {
    type Error = LoggerError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        EnvFilter::try_new(&s)
            .map(|_| Self(s.clone()))
            .map_err(|e| LoggerError::InvalidLevel(format!("{s}: {e}")))
    }
}

impl From<LoggerLevel> for String {
    fn from(level: LoggerLevel) -> Self {
        level.0
    }
}
