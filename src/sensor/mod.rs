use crate::error::AppError;

#[cfg(target_os = "linux")]
pub mod gpio;
pub mod mock;
pub mod simulated;

/// Electrical level of a two-state digital line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

/// Raw levels of the three nutrient inputs. The probes pull the line low when
/// the nutrient is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NutrientLevels {
    pub nitrogen: Level,
    pub phosphorus: Level,
    pub potassium: Level,
}

impl NutrientLevels {
    pub fn from_presence(nitrogen: bool, phosphorus: bool, potassium: bool) -> Self {
        let level = |present: bool| if present { Level::Low } else { Level::High };
        Self {
            nitrogen: level(nitrogen),
            phosphorus: level(phosphorus),
            potassium: level(potassium),
        }
    }
}

/// One humidity/temperature read. Either value may be NaN when the sensor
/// produced no reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateReading {
    pub humidity_percent: f64,
    pub temperature_c: f64,
}

pub trait SensorDriver {
    fn read_nutrient_levels(&mut self) -> Result<NutrientLevels, AppError>;
    /// Raw ADC sample of the acidity probe.
    fn read_acidity_raw(&mut self) -> Result<u16, AppError>;
    fn read_climate(&mut self) -> Result<ClimateReading, AppError>;
}

impl SensorDriver for Box<dyn SensorDriver + Send> {
    fn read_nutrient_levels(&mut self) -> Result<NutrientLevels, AppError> {
        (**self).read_nutrient_levels()
    }
    fn read_acidity_raw(&mut self) -> Result<u16, AppError> {
        (**self).read_acidity_raw()
    }
    fn read_climate(&mut self) -> Result<ClimateReading, AppError> {
        (**self).read_climate()
    }
}
