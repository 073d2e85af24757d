//! Tracing subscriber setup for the `rig` binary.
mod config;
mod error;
mod format;
mod install;
mod level;

pub use config::LoggerConfig;
pub use error::{LoggerError, LoggerResult};
pub use format::LoggerFormat;
pub use install::UtcRfc3339;
pub use level::{LoggerLevel, RIG_LOG_ENV};

/// Install the global subscriber described by `cfg`.
///
/// The level filter is taken from `RIG_LOG` when that variable is set. Fails with
/// [`LoggerError::AlreadyInitialized`] if a global subscriber already exists.
///
/// ```no_run
/// use rig_observe::{LoggerConfig, init_logger};
///
/// init_logger(&LoggerConfig::default()).unwrap();
/// tracing::info!("ready");
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> LoggerResult<()> {
    let level = cfg.level.clone().with_env_override()?;
    let filter = level.to_env_filter()?;

    match cfg.format {
        LoggerFormat::Text => install::text(cfg, filter),
        LoggerFormat::Json => install::json(cfg, filter),
        LoggerFormat::Journald => install::journald(cfg, filter),
    }
}
