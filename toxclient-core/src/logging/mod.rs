//! Logging for toxclient
//!
//! All diagnostics go through `tracing`. Applications that want the
//! client's default output call [`init_logging`] or
//! [`init_logging_with_config`] once at startup; libraries embedding the
//! client install their own subscriber instead.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

mod error;
mod level;

pub use error::LoggingError;
pub use level::LogLevel;

/// Environment variable holding a full filter directive, e.g.
/// `toxclient_core::dispatch=trace,info`. Takes precedence over the level.
pub const FILTER_ENV: &str = "TOXCLIENT_LOG";

/// Configuration for the logging subsystem
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// The minimum log level to display
    pub level: LogLevel,
    pub with_timestamp: bool,
    /// Whether to include target module information
    pub with_target: bool,
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            with_timestamp: true,
            with_target: true,
            json_format: false,
        }
    }
}

impl LogConfig {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    pub fn with_timestamp(mut self, enabled: bool) -> Self {
        self.with_timestamp = enabled;
        self
    }

    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    pub fn json_format(mut self, enabled: bool) -> Self {
        self.json_format = enabled;
        self
    }

    fn filter(&self) -> Result<EnvFilter, LoggingError> {
        match std::env::var(FILTER_ENV) {
            Ok(directive) => EnvFilter::try_new(&directive).map_err(|e| {
                LoggingError::InvalidConfiguration(format!("{}={}: {}", FILTER_ENV, directive, e))
            }),
            Err(_) => Ok(EnvFilter::new(self.level.as_str())),
        }
    }
}

/// Initialize logging with the default configuration
///
/// # Example
/// ```
/// use toxclient_core::logging::init_logging;
///
/// init_logging().expect("Failed to initialize logging");
/// ```
pub fn init_logging() -> Result<(), LoggingError> {
    init_logging_with_config(LogConfig::default())
}

/// Initialize logging with a custom configuration
///
/// Fails if a global subscriber is already installed.
///
/// # Example
/// ```
/// use toxclient_core::logging::{init_logging_with_config, LogConfig, LogLevel};
///
/// let config = LogConfig::new(LogLevel::Debug)
///     .with_timestamp(false)
///     .json_format(true);
///
/// init_logging_with_config(config).expect("Failed to initialize logging");
/// ```
pub fn init_logging_with_config(config: LogConfig) -> Result<(), LoggingError> {
    let filter = config.filter()?;

    let layer = match (config.json_format, config.with_timestamp) {
        (true, true) => fmt::layer().json().with_target(config.with_target).boxed(),
        (true, false) => fmt::layer()
            .json()
            .without_time()
            .with_target(config.with_target)
            .boxed(),
        (false, true) => fmt::layer().with_target(config.with_target).boxed(),
        (false, false) => fmt::layer()
            .without_time()
            .with_target(config.with_target)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()
        .map_err(|e| LoggingError::InitializationFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert_eq!(config.level, LogLevel::Info);
        assert!(config.with_timestamp);
        assert!(config.with_target);
        assert!(!config.json_format);
    }

    #[test]
    fn test_log_config_builder() {
        let config = LogConfig::new(LogLevel::Debug)
            .with_timestamp(false)
            .with_target(false)
            .json_format(true);

        assert_eq!(config.level, LogLevel::Debug);
        assert!(!config.with_timestamp);
        assert!(!config.with_target);
        assert!(config.json_format);
    }

    #[test]
    fn test_second_init_fails() {
        // Either this call or an earlier test installed the subscriber
        let _ = init_logging_with_config(LogConfig::new(LogLevel::Warn).with_timestamp(false));
        let err = init_logging().unwrap_err();
        assert!(matches!(err, LoggingError::InitializationFailed(_)));
    }
}
