//! Monitor configuration loading.

use alert_processor::AlertConfig;
use cloud_notify::MqttConfig;
use pump_monitor::DebounceConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error types.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Top-level monitor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between scheduler ticks (default: 1800, one half hour)
    pub tick_interval_secs: u64,
    /// Alert thresholds
    pub alerts: AlertConfig,
    /// Pump sense debouncing
    pub debounce: DebounceConfig,
    /// MQTT delivery settings
    pub mqtt: MqttConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 1800,
            alerts: AlertConfig::default(),
            debounce: DebounceConfig::default(),
            mqtt: MqttConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration: built-in defaults, then an optional `wsm.toml`,
    /// then `WSM_*` environment overrides (`WSM_MQTT__BROKER_HOST`, ...).
    pub fn load() -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&MonitorConfig::default())?)
            .add_source(config::File::with_name("wsm").required(false))
            .add_source(config::Environment::with_prefix("WSM").separator("__"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}
