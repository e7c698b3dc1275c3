use crate::actuator::Polarity;
use crate::control::filter::FilterSettings;
use crate::control::pump::Thresholds;
use crate::state::RuntimeConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";
pub const DEFAULT_CYCLE_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_CLIMATE_INTERVAL_MS: u64 = 2000;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub app: AppSection,
    pub logging: LoggingSection,
    #[serde(default)]
    pub thresholds: Option<ThresholdsSection>,
    #[serde(default)]
    pub filter: Option<FilterSection>,
    #[serde(default)]
    pub timing: Option<TimingSection>,
    #[serde(default)]
    pub runtime: Option<RuntimeSection>,
    #[serde(default)]
    pub simulation: Option<SimulationSection>,
    #[serde(default)]
    pub actuator: Option<ActuatorSection>,
    #[serde(default)]
    pub hardware: Option<HardwareSection>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSection {
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSection {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ThresholdsSection {
    /// Pump may switch on below this relative humidity (%)
    pub humidity_low: Option<f64>,
    /// Pump may switch off above this relative humidity (%)
    pub humidity_high: Option<f64>,
    pub acidity_min: Option<f64>,
    pub acidity_max: Option<f64>,
    pub minimum_on_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FilterSection {
    /// Smoothing coefficient in (0, 1]
    pub alpha: Option<f64>,
    /// Full-scale raw ADC value
    pub raw_max: Option<u16>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TimingSection {
    pub cycle_interval_ms: Option<u64>,
    pub climate_interval_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RuntimeSection {
    pub rain_probability_percent: Option<u8>,
    pub rain_alert_threshold_percent: Option<u8>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SimulationSection {
    /// JSON scenario file; the built-in scenario is used when missing or empty
    pub scenario_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ActuatorSection {
    pub active_high: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HardwareSection {
    /// BCM pin numbers of the active-low nutrient inputs
    pub nitrogen_pin: u8,
    pub phosphorus_pin: u8,
    pub potassium_pin: u8,
    pub pump_pin: u8,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

pub fn load_default() -> Result<Config, ConfigError> {
    load_from_path(DEFAULT_CONFIG_PATH)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Reject settings the controller cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let thresholds = self.thresholds();
        if !(thresholds.humidity_low < thresholds.humidity_high) {
            return Err(ConfigError::Invalid(format!(
                "humidity_low ({}) must be below humidity_high ({})",
                thresholds.humidity_low, thresholds.humidity_high
            )));
        }
        if !(thresholds.acidity_min < thresholds.acidity_max) {
            return Err(ConfigError::Invalid(format!(
                "acidity_min ({}) must be below acidity_max ({})",
                thresholds.acidity_min, thresholds.acidity_max
            )));
        }

        let filter = self.filter_settings();
        if !(filter.alpha > 0.0 && filter.alpha <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "filter alpha must be in (0, 1], got {}",
                filter.alpha
            )));
        }
        if filter.raw_max == 0 {
            return Err(ConfigError::Invalid("filter raw_max must be non-zero".to_string()));
        }

        if self.cycle_interval().is_zero() || self.climate_interval().is_zero() {
            return Err(ConfigError::Invalid("timing intervals must be non-zero".to_string()));
        }

        let runtime = self.runtime_defaults();
        if runtime.rain_probability_percent > 100 || runtime.rain_alert_threshold_percent > 100 {
            return Err(ConfigError::Invalid(
                "runtime percentages must be within 0-100".to_string(),
            ));
        }

        if self.log_level().is_none() {
            return Err(ConfigError::Invalid(format!(
                "unknown log level: {}",
                self.logging.level
            )));
        }

        Ok(())
    }

    pub fn thresholds(&self) -> Thresholds {
        let defaults = Thresholds::default();
        let Some(section) = self.thresholds.as_ref() else {
            return defaults;
        };
        Thresholds {
            humidity_low: section.humidity_low.unwrap_or(defaults.humidity_low),
            humidity_high: section.humidity_high.unwrap_or(defaults.humidity_high),
            acidity_min: section.acidity_min.unwrap_or(defaults.acidity_min),
            acidity_max: section.acidity_max.unwrap_or(defaults.acidity_max),
            minimum_on: section
                .minimum_on_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.minimum_on),
        }
    }

    pub fn filter_settings(&self) -> FilterSettings {
        let defaults = FilterSettings::default();
        let Some(section) = self.filter.as_ref() else {
            return defaults;
        };
        FilterSettings {
            alpha: section.alpha.unwrap_or(defaults.alpha),
            raw_max: section.raw_max.unwrap_or(defaults.raw_max),
        }
    }

    /// Returns the delay between control cycle starts (default: 1 second)
    pub fn cycle_interval(&self) -> Duration {
        let ms = self
            .timing
            .as_ref()
            .and_then(|t| t.cycle_interval_ms)
            .unwrap_or(DEFAULT_CYCLE_INTERVAL_MS);
        Duration::from_millis(ms)
    }

    /// Returns the minimum spacing between successful climate samples (default: 2 seconds)
    pub fn climate_interval(&self) -> Duration {
        let ms = self
            .timing
            .as_ref()
            .and_then(|t| t.climate_interval_ms)
            .unwrap_or(DEFAULT_CLIMATE_INTERVAL_MS);
        Duration::from_millis(ms)
    }

    pub fn runtime_defaults(&self) -> RuntimeConfig {
        let defaults = RuntimeConfig::default();
        let Some(section) = self.runtime.as_ref() else {
            return defaults;
        };
        RuntimeConfig {
            rain_probability_percent: section
                .rain_probability_percent
                .unwrap_or(defaults.rain_probability_percent),
            rain_alert_threshold_percent: section
                .rain_alert_threshold_percent
                .unwrap_or(defaults.rain_alert_threshold_percent),
        }
    }

    pub fn scenario_path(&self) -> Option<&Path> {
        let path = self.simulation.as_ref()?.scenario_path.as_deref()?;
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    }

    pub fn polarity(&self) -> Polarity {
        match &self.actuator {
            Some(section) if !section.active_high => Polarity::ActiveLow,
            _ => Polarity::ActiveHigh,
        }
    }

    pub fn hardware(&self) -> Option<&HardwareSection> {
        self.hardware.as_ref()
    }

    pub fn log_level(&self) -> Option<tracing::Level> {
        self.logging.level.trim().parse().ok()
    }
}
