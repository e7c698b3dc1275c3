use crate::error::AppError;
use crate::sensor::Level;
use tracing::debug;

/// Maps the logical pump state onto the output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    ActiveHigh,
    ActiveLow,
}

impl Polarity {
    pub fn level_for(self, on: bool) -> Level {
        match (self, on) {
            (Polarity::ActiveHigh, true) | (Polarity::ActiveLow, false) => Level::High,
            (Polarity::ActiveHigh, false) | (Polarity::ActiveLow, true) => Level::Low,
        }
    }
}

pub trait PumpOutput {
    fn drive(&mut self, level: Level) -> Result<(), AppError>;
}

impl PumpOutput for Box<dyn PumpOutput + Send> {
    fn drive(&mut self, level: Level) -> Result<(), AppError> {
        (**self).drive(level)
    }
}

/// In-memory output line used when no pump hardware is configured.
#[derive(Debug, Default)]
pub struct SimulatedOutput {
    level: Option<Level>,
    writes: u64,
}

impl SimulatedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self) -> Option<Level> {
        self.level
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl PumpOutput for SimulatedOutput {
    fn drive(&mut self, level: Level) -> Result<(), AppError> {
        if self.level != Some(level) {
            debug!(level = ?level, "Simulated pump line changed");
        }
        self.level = Some(level);
        self.writes += 1;
        Ok(())
    }
}

#[cfg(target_os = "linux")]
pub struct RppalPumpOutput {
    pin: rppal::gpio::OutputPin,
}

#[cfg(target_os = "linux")]
impl RppalPumpOutput {
    /// Claims `pin` as an output that starts at the inactive level.
    pub fn new(pin: u8, polarity: Polarity) -> Result<Self, AppError> {
        let gpio = rppal::gpio::Gpio::new().map_err(|err| AppError::Gpio(err.to_string()))?;
        let pin = gpio.get(pin).map_err(|err| AppError::Gpio(err.to_string()))?;
        let pin = match polarity.level_for(false) {
            Level::High => pin.into_output_high(),
            Level::Low => pin.into_output_low(),
        };
        Ok(Self { pin })
    }
}

#[cfg(target_os = "linux")]
impl PumpOutput for RppalPumpOutput {
    fn drive(&mut self, level: Level) -> Result<(), AppError> {
        match level {
            Level::High => self.pin.set_high(),
            Level::Low => self.pin.set_low(),
        }
        Ok(())
    }
}
