use crate::sensor::{ClimateReading, SensorDriver};
use crate::state::{ControllerState, NutrientFlags, SensorSample};
use std::time::Duration;
use tracing::{debug, warn};

const MIN_HUMIDITY_PERCENT: f64 = 0.0;
const MAX_HUMIDITY_PERCENT: f64 = 100.0;
const MIN_TEMPERATURE_C: f64 = -40.0;
const MAX_TEMPERATURE_C: f64 = 85.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateSample {
    pub humidity_percent: f64,
    pub temperature_c: f64,
}

/// Last good climate sample. A failed read never overwrites it.
#[derive(Debug, Clone, Default)]
pub struct ClimateCache {
    sample: Option<ClimateSample>,
    updated_at: Option<Duration>,
}

impl ClimateCache {
    pub fn sample(&self) -> Option<ClimateSample> {
        self.sample
    }

    pub fn updated_at(&self) -> Option<Duration> {
        self.updated_at
    }

    pub fn humidity(&self) -> SensorSample<f64> {
        self.sample.map(|s| s.humidity_percent).into()
    }

    pub fn temperature(&self) -> SensorSample<f64> {
        self.sample.map(|s| s.temperature_c).into()
    }

    pub fn refresh_due(&self, now: Duration, interval: Duration) -> bool {
        refresh_due(self.updated_at, now, interval)
    }

    pub fn store(&mut self, sample: ClimateSample, now: Duration) {
        self.sample = Some(sample);
        self.updated_at = Some(now);
    }
}

/// A climate read is due when none has succeeded yet or `interval` has passed
/// since the last success.
pub fn refresh_due(last_success: Option<Duration>, now: Duration, interval: Duration) -> bool {
    match last_success {
        None => true,
        Some(at) => now.saturating_sub(at) >= interval,
    }
}

pub fn validate_climate(reading: ClimateReading) -> Result<ClimateSample, String> {
    let ClimateReading {
        humidity_percent,
        temperature_c,
    } = reading;

    if !humidity_percent.is_finite() || !temperature_c.is_finite() {
        return Err("sensor returned no value".to_string());
    }
    if !(MIN_HUMIDITY_PERCENT..=MAX_HUMIDITY_PERCENT).contains(&humidity_percent) {
        return Err(format!(
            "humidity out of range: {humidity_percent}% (expected {MIN_HUMIDITY_PERCENT}-{MAX_HUMIDITY_PERCENT})"
        ));
    }
    if !(MIN_TEMPERATURE_C..=MAX_TEMPERATURE_C).contains(&temperature_c) {
        return Err(format!(
            "temperature out of range: {temperature_c}C (expected {MIN_TEMPERATURE_C}-{MAX_TEMPERATURE_C})"
        ));
    }

    Ok(ClimateSample {
        humidity_percent,
        temperature_c,
    })
}

/// Read every input for one cycle and update nutrient and climate state.
/// Returns the raw acidity sample for the filter, or `None` if the read failed.
pub fn acquire<D>(
    driver: &mut D,
    state: &mut ControllerState,
    now: Duration,
    climate_interval: Duration,
) -> Option<u16>
where
    D: SensorDriver,
{
    match driver.read_nutrient_levels() {
        Ok(levels) => state.nutrients = NutrientFlags::from_levels(levels),
        Err(err) => warn!(error = %err, "Nutrient read failed, keeping previous flags"),
    }

    let acidity_raw = match driver.read_acidity_raw() {
        Ok(raw) => Some(raw),
        Err(err) => {
            warn!(error = %err, "Acidity read failed, filter holds its value");
            None
        }
    };

    if state.climate.refresh_due(now, climate_interval) {
        refresh_climate(driver, &mut state.climate, now);
    }

    acidity_raw
}

fn refresh_climate<D>(driver: &mut D, cache: &mut ClimateCache, now: Duration)
where
    D: SensorDriver,
{
    let reading = match driver.read_climate() {
        Ok(reading) => reading,
        Err(err) => {
            warn!(error = %err, stale = cache.sample().is_some(), "Climate read failed");
            return;
        }
    };

    match validate_climate(reading) {
        Ok(sample) => {
            debug!(
                humidity = sample.humidity_percent,
                temperature = sample.temperature_c,
                "Climate sample updated"
            );
            cache.store(sample, now);
        }
        Err(reason) => {
            warn!(error = %reason, stale = cache.sample().is_some(), "Invalid climate reading");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::filter::FilterSettings;
    use crate::sensor::mock::{MockSensorBehavior, MockSensorDriver};
    use crate::state::RuntimeConfig;

    const INTERVAL: Duration = Duration::from_millis(2000);

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn fresh_state() -> ControllerState {
        ControllerState::new(FilterSettings::default(), RuntimeConfig::default())
    }

    #[test]
    fn refresh_policy_is_gated_on_last_success() {
        assert!(refresh_due(None, ms(0), INTERVAL));
        assert!(!refresh_due(Some(ms(1000)), ms(2999), INTERVAL));
        assert!(refresh_due(Some(ms(1000)), ms(3000), INTERVAL));
    }

    #[test]
    fn refresh_policy_tolerates_clock_behind_sample() {
        assert!(!refresh_due(Some(ms(5000)), ms(4000), INTERVAL));
    }

    #[test]
    fn nan_humidity_is_rejected() {
        let reading = ClimateReading {
            humidity_percent: f64::NAN,
            temperature_c: 20.0,
        };

        assert!(validate_climate(reading).is_err());
    }

    #[test]
    fn implausible_humidity_is_rejected() {
        let reading = ClimateReading {
            humidity_percent: 130.0,
            temperature_c: 20.0,
        };

        let err = validate_climate(reading).unwrap_err();

        assert!(err.contains("humidity out of range"));
    }

    #[test]
    fn first_successful_read_populates_cache() {
        let mut driver = MockSensorDriver::new(MockSensorBehavior::with_climate(45.0, 25.0));
        let mut state = fresh_state();

        let raw = acquire(&mut driver, &mut state, ms(0), INTERVAL);

        assert_eq!(raw, Some(1843));
        assert_eq!(state.climate.humidity(), SensorSample::Valid(45.0));
        assert_eq!(state.climate.temperature(), SensorSample::Valid(25.0));
        assert!(state.nutrients.irrigation_ready());
    }

    #[test]
    fn climate_is_not_resampled_before_interval() {
        let mut driver = MockSensorDriver::new(MockSensorBehavior::with_climate(45.0, 25.0));
        let mut state = fresh_state();

        acquire(&mut driver, &mut state, ms(0), INTERVAL);
        driver.behavior.humidity_percent = 70.0;
        acquire(&mut driver, &mut state, ms(1000), INTERVAL);

        assert_eq!(driver.climate_reads(), 1);
        assert_eq!(state.climate.humidity(), SensorSample::Valid(45.0));

        acquire(&mut driver, &mut state, ms(2000), INTERVAL);

        assert_eq!(driver.climate_reads(), 2);
        assert_eq!(state.climate.humidity(), SensorSample::Valid(70.0));
    }

    #[test]
    fn failed_read_keeps_previous_sample() {
        let mut driver = MockSensorDriver::new(MockSensorBehavior::with_climate(45.0, 25.0));
        let mut state = fresh_state();

        acquire(&mut driver, &mut state, ms(0), INTERVAL);
        driver.behavior = MockSensorBehavior::fail_climate();
        acquire(&mut driver, &mut state, ms(2000), INTERVAL);

        assert_eq!(state.climate.humidity(), SensorSample::Valid(45.0));
        assert_eq!(state.climate.updated_at(), Some(ms(0)));
    }

    #[test]
    fn partial_reading_does_not_overwrite() {
        let mut driver = MockSensorDriver::new(MockSensorBehavior::with_climate(45.0, 25.0));
        let mut state = fresh_state();

        acquire(&mut driver, &mut state, ms(0), INTERVAL);
        driver.behavior = MockSensorBehavior::nan_humidity();
        acquire(&mut driver, &mut state, ms(2000), INTERVAL);

        assert_eq!(state.climate.temperature(), SensorSample::Valid(25.0));
    }

    #[test]
    fn failed_read_is_retried_next_cycle() {
        let mut driver = MockSensorDriver::new(MockSensorBehavior::fail_climate());
        let mut state = fresh_state();

        acquire(&mut driver, &mut state, ms(0), INTERVAL);
        acquire(&mut driver, &mut state, ms(1000), INTERVAL);

        assert_eq!(driver.climate_reads(), 2);
        assert!(!state.climate.humidity().is_valid());
    }

    #[test]
    fn nutrient_failure_keeps_previous_flags() {
        let mut driver = MockSensorDriver::new(MockSensorBehavior::ok());
        let mut state = fresh_state();

        acquire(&mut driver, &mut state, ms(0), INTERVAL);
        driver.behavior = MockSensorBehavior::fail_nutrients();
        acquire(&mut driver, &mut state, ms(1000), INTERVAL);

        assert!(state.nutrients.irrigation_ready());
    }

    #[test]
    fn acidity_failure_yields_no_raw_sample() {
        let mut driver = MockSensorDriver::new(MockSensorBehavior::fail_acidity());
        let mut state = fresh_state();

        let raw = acquire(&mut driver, &mut state, ms(0), INTERVAL);

        assert_eq!(raw, None);
    }
}
