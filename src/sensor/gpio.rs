//! Raspberry Pi nutrient inputs. The analog and climate channels have no GPIO
//! counterpart and stay with the wrapped driver.

use crate::config::HardwareSection;
use crate::error::AppError;
use crate::sensor::{ClimateReading, Level, NutrientLevels, SensorDriver};
use rppal::gpio::{Gpio, InputPin};
use tracing::info;

pub struct GpioNutrientDriver<D> {
    nitrogen: InputPin,
    phosphorus: InputPin,
    potassium: InputPin,
    inner: D,
}

impl<D: SensorDriver> GpioNutrientDriver<D> {
    pub fn new(hardware: &HardwareSection, inner: D) -> Result<Self, AppError> {
        let gpio = Gpio::new().map_err(|err| AppError::Gpio(err.to_string()))?;
        let input = |pin: u8| -> Result<InputPin, AppError> {
            Ok(gpio
                .get(pin)
                .map_err(|err| AppError::Gpio(err.to_string()))?
                .into_input_pullup())
        };
        let driver = Self {
            nitrogen: input(hardware.nitrogen_pin)?,
            phosphorus: input(hardware.phosphorus_pin)?,
            potassium: input(hardware.potassium_pin)?,
            inner,
        };
        info!(
            nitrogen_pin = hardware.nitrogen_pin,
            phosphorus_pin = hardware.phosphorus_pin,
            potassium_pin = hardware.potassium_pin,
            "Nutrient inputs configured"
        );
        Ok(driver)
    }
}

fn level(pin: &InputPin) -> Level {
    match pin.read() {
        rppal::gpio::Level::Low => Level::Low,
        rppal::gpio::Level::High => Level::High,
    }
}

impl<D: SensorDriver> SensorDriver for GpioNutrientDriver<D> {
    fn read_nutrient_levels(&mut self) -> Result<NutrientLevels, AppError> {
        Ok(NutrientLevels {
            nitrogen: level(&self.nitrogen),
            phosphorus: level(&self.phosphorus),
            potassium: level(&self.potassium),
        })
    }

    fn read_acidity_raw(&mut self) -> Result<u16, AppError> {
        self.inner.read_acidity_raw()
    }

    fn read_climate(&mut self) -> Result<ClimateReading, AppError> {
        self.inner.read_climate()
    }
}
