//! Status and alert lines written to the console.
//!
//! The status line is consumed by downstream recorders; its field order and
//! the `nan` sentinel must stay stable.

use crate::control::pump::{Alert, Thresholds};
use crate::state::{ControllerState, SensorSample};
use std::fmt;

pub const MISSING_SENTINEL: &str = "nan";

#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub nitrogen: bool,
    pub phosphorus: bool,
    pub potassium: bool,
    pub humidity: SensorSample<f64>,
    pub temperature: SensorSample<f64>,
    pub acidity: f64,
    pub pump_on: bool,
    pub reason: String,
    pub thresholds: Thresholds,
    pub rain_probability_percent: u8,
    pub rain_alert_threshold_percent: u8,
}

impl StatusLine {
    pub fn capture(state: &ControllerState, thresholds: &Thresholds) -> Self {
        Self {
            nitrogen: state.nutrients.nitrogen,
            phosphorus: state.nutrients.phosphorus,
            potassium: state.nutrients.potassium,
            humidity: state.climate.humidity(),
            temperature: state.climate.temperature(),
            acidity: state.acidity.value(),
            pump_on: state.pump.is_on(),
            reason: state.pump.last_reason().to_string(),
            thresholds: *thresholds,
            rain_probability_percent: state.runtime.rain_probability_percent,
            rain_alert_threshold_percent: state.runtime.rain_alert_threshold_percent,
        }
    }
}

struct OneDecimal(SensorSample<f64>);

impl fmt::Display for OneDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            SensorSample::Valid(value) => write!(f, "{value:.1}"),
            SensorSample::Invalid => f.write_str(MISSING_SENTINEL),
        }
    }
}

fn flag(present: bool) -> u8 {
    u8::from(present)
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "N={} P={} K={} hum={} temp={} ph={:.2} pump={} reason=\"{}\" ",
            flag(self.nitrogen),
            flag(self.phosphorus),
            flag(self.potassium),
            OneDecimal(self.humidity),
            OneDecimal(self.temperature),
            self.acidity,
            if self.pump_on { "ON" } else { "OFF" },
            self.reason,
        )?;
        write!(
            f,
            "hum_low={:.1} hum_high={:.1} ph_min={:.2} ph_max={:.2} rain={} rain_thresh={}",
            self.thresholds.humidity_low,
            self.thresholds.humidity_high,
            self.thresholds.acidity_min,
            self.thresholds.acidity_max,
            self.rain_probability_percent,
            self.rain_alert_threshold_percent,
        )
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alert::NutrientsMissing {
                phosphorus,
                potassium,
            } => write!(
                f,
                "ALERT: humidity low but nutrients missing (P={} K={}), irrigation held",
                flag(*phosphorus),
                flag(*potassium)
            ),
            Alert::AcidityOutOfRange { acidity, min, max } => write!(
                f,
                "ALERT: humidity low but acidity out of range (ph={acidity:.2}, allowed {min:.2}-{max:.2}), irrigation held"
            ),
            Alert::AcidityWhilePumping { acidity, min, max } => write!(
                f,
                "ALERT: pump running with acidity out of range (ph={acidity:.2}, allowed {min:.2}-{max:.2}); review soil amendment"
            ),
        }
    }
}
