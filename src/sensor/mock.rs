use crate::error::AppError;
use crate::sensor::{ClimateReading, NutrientLevels, SensorDriver};

#[derive(Debug, Clone, Copy)]
pub struct MockSensorBehavior {
    pub nutrients_ok: bool,
    pub acidity_ok: bool,
    pub climate_ok: bool,
    pub nitrogen: bool,
    pub phosphorus: bool,
    pub potassium: bool,
    pub acidity_raw: u16,
    pub humidity_percent: f64,
    pub temperature_c: f64,
}

impl MockSensorBehavior {
    /// All nutrients present, mid-band humidity and a raw value close to pH 6.3.
    pub fn ok() -> Self {
        Self {
            nutrients_ok: true,
            acidity_ok: true,
            climate_ok: true,
            nitrogen: true,
            phosphorus: true,
            potassium: true,
            acidity_raw: 1843,
            humidity_percent: 55.0,
            temperature_c: 24.0,
        }
    }

    pub fn with_climate(humidity_percent: f64, temperature_c: f64) -> Self {
        Self {
            humidity_percent,
            temperature_c,
            ..Self::ok()
        }
    }

    pub fn with_nutrients(nitrogen: bool, phosphorus: bool, potassium: bool) -> Self {
        Self {
            nitrogen,
            phosphorus,
            potassium,
            ..Self::ok()
        }
    }

    pub fn fail_climate() -> Self {
        Self {
            climate_ok: false,
            ..Self::ok()
        }
    }

    /// The sensor answers but without a humidity value.
    pub fn nan_humidity() -> Self {
        Self {
            humidity_percent: f64::NAN,
            ..Self::ok()
        }
    }

    pub fn fail_nutrients() -> Self {
        Self {
            nutrients_ok: false,
            ..Self::ok()
        }
    }

    pub fn fail_acidity() -> Self {
        Self {
            acidity_ok: false,
            ..Self::ok()
        }
    }
}

/// Scripted driver whose behavior can be changed between cycles.
#[derive(Debug, Clone)]
pub struct MockSensorDriver {
    pub behavior: MockSensorBehavior,
    climate_reads: u32,
}

impl MockSensorDriver {
    pub fn new(behavior: MockSensorBehavior) -> Self {
        Self {
            behavior,
            climate_reads: 0,
        }
    }

    /// Number of climate reads attempted so far.
    pub fn climate_reads(&self) -> u32 {
        self.climate_reads
    }
}

impl SensorDriver for MockSensorDriver {
    fn read_nutrient_levels(&mut self) -> Result<NutrientLevels, AppError> {
        if self.behavior.nutrients_ok {
            Ok(NutrientLevels::from_presence(
                self.behavior.nitrogen,
                self.behavior.phosphorus,
                self.behavior.potassium,
            ))
        } else {
            Err(AppError::Sensor("mock nutrient read failed".to_string()))
        }
    }

    fn read_acidity_raw(&mut self) -> Result<u16, AppError> {
        if self.behavior.acidity_ok {
            Ok(self.behavior.acidity_raw)
        } else {
            Err(AppError::Sensor("mock acidity read failed".to_string()))
        }
    }

    fn read_climate(&mut self) -> Result<ClimateReading, AppError> {
        self.climate_reads += 1;
        if self.behavior.climate_ok {
            Ok(ClimateReading {
                humidity_percent: self.behavior.humidity_percent,
                temperature_c: self.behavior.temperature_c,
            })
        } else {
            Err(AppError::Sensor("mock climate read failed".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::Level;

    #[test]
    fn read_climate_returns_scripted_values() {
        let mut driver = MockSensorDriver::new(MockSensorBehavior::with_climate(45.0, 27.5));

        let reading = driver.read_climate().expect("climate read ok");

        assert_eq!(reading.humidity_percent, 45.0);
        assert_eq!(reading.temperature_c, 27.5);
        assert_eq!(driver.climate_reads(), 1);
    }

    #[test]
    fn read_climate_can_fail() {
        let mut driver = MockSensorDriver::new(MockSensorBehavior::fail_climate());

        let err = driver.read_climate().unwrap_err();

        assert_eq!(err.to_string(), "sensor error: mock climate read failed");
        assert_eq!(driver.climate_reads(), 1);
    }

    #[test]
    fn nutrient_presence_reads_as_low_level() {
        let mut driver = MockSensorDriver::new(MockSensorBehavior::with_nutrients(false, true, true));

        let levels = driver.read_nutrient_levels().expect("nutrient read ok");

        assert_eq!(levels.nitrogen, Level::High);
        assert_eq!(levels.phosphorus, Level::Low);
    }
}
