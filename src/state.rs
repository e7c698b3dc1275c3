use crate::acquisition::ClimateCache;
use crate::control::filter::{AcidityFilter, FilterSettings};
use crate::control::pump::PumpState;
use crate::sensor::{Level, NutrientLevels};

/// A reading that may be missing. `Invalid` is never read as zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorSample<T> {
    Valid(T),
    Invalid,
}

impl<T: Copy> SensorSample<T> {
    pub fn value(&self) -> Option<T> {
        match self {
            SensorSample::Valid(value) => Some(*value),
            SensorSample::Invalid => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, SensorSample::Valid(_))
    }
}

impl<T> From<Option<T>> for SensorSample<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => SensorSample::Valid(value),
            None => SensorSample::Invalid,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NutrientFlags {
    /// Monitored only; never gates the pump.
    pub nitrogen: bool,
    pub phosphorus: bool,
    pub potassium: bool,
}

impl NutrientFlags {
    pub fn from_levels(levels: NutrientLevels) -> Self {
        Self {
            nitrogen: levels.nitrogen == Level::Low,
            phosphorus: levels.phosphorus == Level::Low,
            potassium: levels.potassium == Level::Low,
        }
    }

    /// Phosphorus and potassium are both required to irrigate.
    pub fn irrigation_ready(&self) -> bool {
        self.phosphorus && self.potassium
    }
}

/// Operator-tunable parameters. Kept for reporting; the pump decision does
/// not consume them yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub rain_probability_percent: u8,
    pub rain_alert_threshold_percent: u8,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            rain_probability_percent: 0,
            rain_alert_threshold_percent: 60,
        }
    }
}

/// Everything the control loop owns between cycles.
#[derive(Debug, Clone)]
pub struct ControllerState {
    pub nutrients: NutrientFlags,
    pub climate: ClimateCache,
    pub acidity: AcidityFilter,
    pub pump: PumpState,
    pub runtime: RuntimeConfig,
}

impl ControllerState {
    pub fn new(filter: FilterSettings, runtime: RuntimeConfig) -> Self {
        Self {
            nutrients: NutrientFlags::default(),
            climate: ClimateCache::default(),
            acidity: AcidityFilter::new(filter),
            pump: PumpState::new(),
            runtime,
        }
    }
}
