//! Client configuration
//!
//! Defaults, TOML files and `TOXCLIENT_*` environment variables, all
//! validated before use.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

mod error;

pub use error::ConfigError;

use crate::engine::{EngineOptions, ProxyAddress};
use crate::error::ClientResult;
use crate::events::broadcaster::DEFAULT_CAPACITY;
use crate::logging::{LogConfig, LogLevel};

/// Complete client configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub engine: EngineConfig,
    pub events: EventsConfig,
    pub runtime: RuntimeConfig,
    pub logging: LoggingConfig,
}

/// Options handed to the network engine at creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub ipv6_enabled: bool,
    pub udp_enabled: bool,
    /// `[scheme://]host:port`, scheme one of socks, socks5, http
    pub proxy: Option<String>,
    /// Create the audio/video companion alongside the client
    pub av_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Events buffered per broadcast subscriber
    pub broadcast_capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Workers of the runtime the client starts when constructed outside
    /// of a tokio runtime
    pub worker_threads: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub json_format: bool,
    pub with_timestamp: bool,
    pub with_target: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ipv6_enabled: true,
            udp_enabled: true,
            proxy: None,
            av_enabled: true,
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: num_cpus::get(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            json_format: false,
            with_timestamp: true,
            with_target: true,
        }
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidVar {
            var: name.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// Variables follow the pattern `TOXCLIENT_<SECTION>_<KEY>`, e.g.
    /// `TOXCLIENT_ENGINE_PROXY=socks5://127.0.0.1:9050`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("TOXCLIENT_ENGINE_IPV6") {
            config.engine.ipv6_enabled = parse_var("TOXCLIENT_ENGINE_IPV6", &v)?;
        }
        if let Some(v) = lookup("TOXCLIENT_ENGINE_UDP") {
            config.engine.udp_enabled = parse_var("TOXCLIENT_ENGINE_UDP", &v)?;
        }
        if let Some(v) = lookup("TOXCLIENT_ENGINE_PROXY") {
            config.engine.proxy = if v.is_empty() { None } else { Some(v) };
        }
        if let Some(v) = lookup("TOXCLIENT_ENGINE_AV") {
            config.engine.av_enabled = parse_var("TOXCLIENT_ENGINE_AV", &v)?;
        }

        if let Some(v) = lookup("TOXCLIENT_EVENTS_CAPACITY") {
            config.events.broadcast_capacity = parse_var("TOXCLIENT_EVENTS_CAPACITY", &v)?;
        }

        if let Some(v) = lookup("TOXCLIENT_RUNTIME_WORKERS") {
            config.runtime.worker_threads = parse_var("TOXCLIENT_RUNTIME_WORKERS", &v)?;
        }

        if let Some(v) = lookup("TOXCLIENT_LOG_LEVEL") {
            config.logging.level = parse_var("TOXCLIENT_LOG_LEVEL", &v)?;
        }
        if let Some(v) = lookup("TOXCLIENT_LOG_JSON") {
            config.logging.json_format = parse_var("TOXCLIENT_LOG_JSON", &v)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = toml::from_str(&contents)?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(proxy) = &self.engine.proxy {
            proxy
                .parse::<ProxyAddress>()
                .map_err(|e| ConfigError::ValidationFailed(format!("proxy: {}", e)))?;
        }

        if self.events.broadcast_capacity == 0 {
            return Err(ConfigError::ValidationFailed(
                "broadcast_capacity must be greater than 0".to_string(),
            ));
        }

        if self.runtime.worker_threads == 0 {
            return Err(ConfigError::ValidationFailed(
                "worker_threads must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Engine options, with the proxy parsed
    ///
    /// A malformed proxy string is `InvalidArgument`.
    pub fn engine_options(&self) -> ClientResult<EngineOptions> {
        let proxy = self
            .engine
            .proxy
            .as_deref()
            .map(str::parse::<ProxyAddress>)
            .transpose()?;
        Ok(EngineOptions {
            enable_ipv6: self.engine.ipv6_enabled,
            enable_udp: self.engine.udp_enabled,
            proxy,
            enable_av: self.engine.av_enabled,
        })
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig::new(self.logging.level)
            .json_format(self.logging.json_format)
            .with_timestamp(self.logging.with_timestamp)
            .with_target(self.logging.with_target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ProxyKind;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.engine.av_enabled);
        assert_eq!(config.events.broadcast_capacity, 256);
        assert!(config.runtime.worker_threads > 0);
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::default();
        config.events.broadcast_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.runtime.worker_threads = 0;
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.engine.proxy = Some("socks5://:0".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_from_lookup() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("TOXCLIENT_ENGINE_IPV6", "false"),
            ("TOXCLIENT_ENGINE_AV", "false"),
            ("TOXCLIENT_ENGINE_PROXY", "socks5://127.0.0.1:9050"),
            ("TOXCLIENT_EVENTS_CAPACITY", "32"),
            ("TOXCLIENT_RUNTIME_WORKERS", "3"),
            ("TOXCLIENT_LOG_LEVEL", "debug"),
            ("TOXCLIENT_LOG_JSON", "true"),
        ]))
        .unwrap();

        assert!(!config.engine.ipv6_enabled);
        assert!(config.engine.udp_enabled);
        assert!(!config.engine.av_enabled);
        assert_eq!(config.events.broadcast_capacity, 32);
        assert_eq!(config.runtime.worker_threads, 3);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert!(config.logging.json_format);

        let options = config.engine_options().unwrap();
        let proxy = options.proxy.unwrap();
        assert_eq!(proxy.kind, ProxyKind::Socks5);
        assert_eq!(proxy.port, 9050);
    }

    #[test]
    fn test_from_lookup_rejects_bad_values() {
        let err = ClientConfig::from_lookup(lookup(&[("TOXCLIENT_ENGINE_UDP", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar { .. }));

        let err = ClientConfig::from_lookup(lookup(&[("TOXCLIENT_LOG_LEVEL", "loud")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar { .. }));

        let err = ClientConfig::from_lookup(lookup(&[("TOXCLIENT_EVENTS_CAPACITY", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed(_)));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");

        let mut config = ClientConfig::default();
        config.engine.proxy = Some("http://proxy.local:3128".to_string());
        config.logging.level = LogLevel::Warn;
        config.save_to_file(&path).unwrap();

        let loaded = ClientConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");
        std::fs::write(&path, "[engine]\nudp_enabled = false\n").unwrap();

        let loaded = ClientConfig::from_file(&path).unwrap();
        assert!(!loaded.engine.udp_enabled);
        assert!(loaded.engine.ipv6_enabled);
        assert_eq!(loaded.events, EventsConfig::default());
    }

    #[test]
    fn test_missing_file() {
        let err = ClientConfig::from_file("/nonexistent/client.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");
        std::fs::write(&path, "[engine\nudp_enabled = ").unwrap();

        let err = ClientConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_engine_options_bad_proxy() {
        let mut config = ClientConfig::default();
        config.engine.proxy = Some("ftp://host:21".to_string());
        let err = config.engine_options().unwrap_err();
        assert!(matches!(err, crate::ClientError::InvalidArgument(_)));
    }
}
