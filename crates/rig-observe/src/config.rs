use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use crate::{format::LoggerFormat, level::LoggerLevel};

/// Logger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` directives; `RIG_LOG` replaces this when set.
    pub level: LoggerLevel,
    /// Include the event target (module path) in each record.
    pub with_targets: bool,
    /// Colour text output. Only honoured when stderr is a terminal.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            with_targets: false,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    pub fn should_use_color(&self) -> bool {
        self.use_color && std::io::stderr().is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = LoggerConfig::default();
        assert_eq!(cfg.format, LoggerFormat::Text);
        assert_eq!(cfg.level.as_str(), "info");
        assert!(!cfg.with_targets);
        assert!(cfg.use_color);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: LoggerConfig = serde_json::from_str(r#"{"format": "json"}"#).unwrap();
        assert_eq!(cfg.format, LoggerFormat::Json);
        assert_eq!(cfg.level, LoggerLevel::default());
        assert!(cfg.use_color);
    }

    #[test]
    fn invalid_level_fails_deserialization() {
        let err = serde_json::from_str::<LoggerConfig>(r#"{"level": "rig=shout"}"#).unwrap_err();
        assert!(err.to_string().contains("invalid log level"));
    }
}
