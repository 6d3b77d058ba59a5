//! Configuration for the cotreport CoT forwarder.
//!
//! The three TAK keys (`tak_server`, `tak_port`, `tak_uid_base`) sit at the
//! top level so that mission files written for earlier reporters load
//! unchanged. Everything else lives in optional sections.
//!
//! Configuration can be loaded from YAML, optionally merged with
//! `COTREPORT__*` environment overrides, and every field has a default.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::Level;

/// Root configuration.
///
/// # Examples
///
/// ```
/// use cotreport_core::config::ReporterConfig;
///
/// let config = ReporterConfig::from_yaml("tak_server: 10.1.1.5\ntak_port: 8088\n").unwrap();
/// assert_eq!(config.server_address(), "10.1.1.5:8088");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReporterConfig {
    /// TAK server host or IP address
    #[serde(default = "default_tak_server")]
    pub tak_server: String,

    /// TAK server TCP port
    #[serde(default = "default_tak_port")]
    pub tak_port: u16,

    /// Prefix used when building event UIDs
    #[serde(default)]
    pub tak_uid_base: String,

    /// Tick period in milliseconds
    #[serde(default = "default_app_tick_ms")]
    pub app_tick_ms: u64,

    /// Outbound socket settings
    #[serde(default)]
    pub transport: TransportConfig,

    /// Bus channel names and mail source
    #[serde(default)]
    pub bus: BusConfig,

    /// Timestamp formatting
    #[serde(default)]
    pub timestamps: TimestampConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_tak_server() -> String {
    "127.0.0.1".to_string()
}

fn default_tak_port() -> u16 {
    8087
}

fn default_app_tick_ms() -> u64 {
    1000
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            tak_server: default_tak_server(),
            tak_port: default_tak_port(),
            tak_uid_base: String::new(),
            app_tick_ms: default_app_tick_ms(),
            transport: TransportConfig::default(),
            bus: BusConfig::default(),
            timestamps: TimestampConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ReporterConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Self::from_yaml(&contents)
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| {
            ConfigError::InvalidFormat {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Loads configuration using the `config` crate: the YAML file first,
    /// then `COTREPORT__*` environment variables on top.
    ///
    /// The file is always read as YAML whatever its extension, so mission
    /// files such as `pCotReporter.moos` load as-is.
    pub fn from_config_builder<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let config = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Yaml)
                    .required(true),
            )
            .add_source(
                config::Environment::with_prefix("COTREPORT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigError::LoadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        config.try_deserialize().map_err(|e| {
            ConfigError::InvalidFormat {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Validates the configuration.
    ///
    /// Only local consistency is checked; whether the server is reachable
    /// is discovered on the first connect attempt.
    pub fn validate(&self) -> Result<()> {
        if self.tak_server.trim().is_empty() {
            return Err(ConfigError::invalid_value("tak_server", "Server address cannot be empty").into());
        }

        if self.tak_port == 0 {
            return Err(ConfigError::invalid_value("tak_port", "Port cannot be 0").into());
        }

        if self.app_tick_ms == 0 {
            return Err(ConfigError::invalid_value("app_tick_ms", "Tick period cannot be 0").into());
        }

        self.bus.validate()?;
        self.logging.parse_level()?;

        Ok(())
    }

    /// Returns the `host:port` the session connects to.
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.tak_server, self.tak_port)
    }

    /// Returns the tick period as a Duration.
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.app_tick_ms)
    }
}

/// Outbound socket settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Connect timeout in seconds (0 = wait for the OS)
    #[serde(default = "default_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Per-message write timeout in seconds (0 = wait for the OS)
    #[serde(default = "default_timeout_secs")]
    pub write_timeout_secs: u64,

    /// Disable Nagle's algorithm
    #[serde(default = "default_true")]
    pub nodelay: bool,

    /// TCP keepalive idle time in seconds (0 = keepalive off)
    #[serde(default = "default_keepalive_secs")]
    pub keepalive_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_keepalive_secs() -> u64 {
    30
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_timeout_secs(),
            write_timeout_secs: default_timeout_secs(),
            nodelay: true,
            keepalive_secs: default_keepalive_secs(),
        }
    }
}

impl TransportConfig {
    /// Connect timeout, `None` when disabled.
    pub fn connect_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.connect_timeout_secs)
    }

    /// Write timeout, `None` when disabled.
    pub fn write_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.write_timeout_secs)
    }

    /// Keepalive idle time, `None` when disabled.
    pub fn keepalive(&self) -> Option<Duration> {
        non_zero_secs(self.keepalive_secs)
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Bus channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
    /// Channel carrying this vehicle's own report (latest value wins)
    #[serde(default = "default_local_channel")]
    pub local_channel: String,

    /// Channel carrying other vehicles' reports (every value kept)
    #[serde(default = "default_remote_channel")]
    pub remote_channel: String,

    /// Receive bus mail as UDP datagrams on this address instead of stdin
    #[serde(default)]
    pub udp_listen: Option<String>,
}

fn default_local_channel() -> String {
    "NODE_REPORT_LOCAL".to_string()
}

fn default_remote_channel() -> String {
    "NODE_REPORT".to_string()
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            local_channel: default_local_channel(),
            remote_channel: default_remote_channel(),
            udp_listen: None,
        }
    }
}

impl BusConfig {
    /// Validates the channel names.
    pub fn validate(&self) -> Result<()> {
        for (field, name) in [
            ("bus.local_channel", &self.local_channel),
            ("bus.remote_channel", &self.remote_channel),
        ] {
            if name.is_empty() || name.chars().any(char::is_whitespace) {
                return Err(ConfigError::invalid_value(
                    field,
                    format!("Invalid channel name: {:?}", name),
                )
                .into());
            }
        }

        if self.local_channel == self.remote_channel {
            return Err(ConfigError::invalid_value(
                "bus.remote_channel",
                "Local and remote channels must differ",
            )
            .into());
        }

        Ok(())
    }
}

/// Timestamp formatting configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimestampConfig {
    /// How the millisecond component is written
    #[serde(default)]
    pub millis: MillisPadding,
}

/// Millisecond rendering in `time`/`start`/`stale` attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MillisPadding {
    /// Always three digits (`.007Z`)
    #[default]
    Padded,
    /// Legacy output without leading zeros (`.7Z`)
    Unpadded,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level, used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "text" or "json"
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Text,
        }
    }
}

impl LoggingConfig {
    /// Parses the log level string to a tracing Level.
    pub fn parse_level(&self) -> Result<Level> {
        self.level.parse().map_err(|_| {
            ConfigError::invalid_value("logging.level", format!("Invalid log level: {}", self.level))
                .into()
        })
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
}
