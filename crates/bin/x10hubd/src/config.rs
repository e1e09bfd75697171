//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `x10hub.toml` in the working directory. Every field except the
//! module list has a sensible default so the file is optional. Environment
//! variables take precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use x10hub_app::controller::BridgeConfig;
use x10hub_app::ports::settings::{SettingsError, SettingsStore};
use x10hub_domain::module::ModuleDescriptor;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Power-line transport settings.
    pub transport: TransportConfig,
    /// Clock resynchronisation settings.
    pub clock: ClockConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Configured power-line modules.
    pub modules: Vec<ModuleDescriptor>,
}

/// Transport configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Serial device path handed to the transport.
    pub device: String,
}

/// Clock resynchronisation configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Seconds between interface clock resyncs.
    pub resync_interval_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `x10hub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or when
    /// validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("x10hub.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("X10HUB_DEVICE") {
            self.transport.device = val;
        }
        if let Ok(val) = std::env::var("X10HUB_CLOCK_RESYNC_SECS")
            && let Ok(secs) = val.parse()
        {
            self.clock.resync_interval_secs = secs;
        }
        if let Ok(val) = std::env::var("X10HUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.clock.resync_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "clock resync interval must be non-zero".to_string(),
            ));
        }
        if self.transport.device.is_empty() {
            return Err(ConfigError::Validation(
                "transport device path must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the bridge controller configuration.
    #[must_use]
    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            device_path: self.transport.device.clone(),
            clock_resync_interval: Duration::from_secs(self.clock.resync_interval_secs),
        }
    }
}

impl SettingsStore for Config {
    async fn load_modules(&self) -> Result<Vec<ModuleDescriptor>, SettingsError> {
        Ok(self.modules.clone())
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            device: "/dev/ttyUSB0".to_string(),
        }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            resync_interval_secs: 24 * 60 * 60,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "x10hubd=info,x10hub=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.transport.device, "/dev/ttyUSB0");
        assert_eq!(config.clock.resync_interval_secs, 86_400);
        assert!(config.modules.is_empty());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.transport.device, "/dev/ttyUSB0");
    }

    #[test]
    fn should_parse_full_toml_with_modules() {
        let toml = "
            [transport]
            device = '/dev/ttyS0'

            [clock]
            resync_interval_secs = 3600

            [logging]
            filter = 'debug'

            [[modules]]
            house_code = 'A'
            unit_code = 2
            module_type = 'On/Off Switch'

            [[modules]]
            house_code = 'B'
            unit_code = 5
            module_type = 'Dimmer Switch'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.transport.device, "/dev/ttyS0");
        assert_eq!(config.clock.resync_interval_secs, 3600);
        assert_eq!(config.modules.len(), 2);
        assert_eq!(config.modules[1].address().to_string(), "B5");
    }

    #[test]
    fn should_reject_out_of_range_unit_code() {
        let toml = "
            [[modules]]
            house_code = 'A'
            unit_code = 17
            module_type = 'On/Off Switch'
        ";
        assert!(toml::from_str::<Config>(toml).is_err());
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.transport.device, "/dev/ttyUSB0");
    }

    #[test]
    fn should_reject_zero_resync_interval() {
        let mut config = Config::default();
        config.clock.resync_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_build_bridge_config() {
        let config = Config::default();
        let bridge = config.bridge_config();
        assert_eq!(bridge.device_path, "/dev/ttyUSB0");
        assert_eq!(bridge.clock_resync_interval, Duration::from_secs(86_400));
    }

    #[tokio::test]
    async fn should_serve_modules_through_settings_port() {
        let toml = "
            [[modules]]
            house_code = 'C'
            unit_code = 3
            module_type = 'Lamp Module'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        let modules = config.load_modules().await.unwrap();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].address().to_string(), "C3");
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
