//! Hysteresis state machine for the irrigation pump.
//!
//! The pump switches on below `humidity_low` and may only switch off above
//! `humidity_high`, and never before `minimum_on` has elapsed since it
//! switched on. Phosphorus, potassium and an in-range acidity are required
//! to switch on; losing any of them is an off condition.

use crate::state::{NutrientFlags, SensorSample};
use std::time::Duration;

pub const REASON_BOOT: &str = "BOOT";
pub const REASON_ON: &str = "ON: hum<LOW & P,K & pH";
pub const REASON_OFF: &str = "OFF: condition";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub humidity_low: f64,
    pub humidity_high: f64,
    pub acidity_min: f64,
    pub acidity_max: f64,
    pub minimum_on: Duration,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            humidity_low: 50.0,
            humidity_high: 60.0,
            acidity_min: 6.0,
            acidity_max: 6.8,
            minimum_on: Duration::from_millis(5000),
        }
    }
}

impl Thresholds {
    pub fn acidity_in_range(&self, acidity: f64) -> bool {
        (self.acidity_min..=self.acidity_max).contains(&acidity)
    }
}

/// Signals the decision is taken on for one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionInputs {
    pub humidity: SensorSample<f64>,
    pub nutrients: NutrientFlags,
    pub acidity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PumpState {
    is_on: bool,
    on_since: Option<Duration>,
    last_reason: String,
}

impl PumpState {
    pub fn new() -> Self {
        Self {
            is_on: false,
            on_since: None,
            last_reason: REASON_BOOT.to_string(),
        }
    }

    pub fn is_on(&self) -> bool {
        self.is_on
    }

    /// Set exactly while the pump is on.
    pub fn on_since(&self) -> Option<Duration> {
        self.on_since
    }

    pub fn last_reason(&self) -> &str {
        &self.last_reason
    }

    fn switch_on(&mut self, now: Duration) {
        self.is_on = true;
        self.on_since = Some(now);
        self.last_reason = REASON_ON.to_string();
    }

    fn switch_off(&mut self) {
        self.is_on = false;
        self.on_since = None;
        self.last_reason = REASON_OFF.to_string();
    }
}

impl Default for PumpState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    SwitchedOn,
    SwitchedOff,
}

/// Observations about blocked or risky irrigation. They never change state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Alert {
    NutrientsMissing {
        phosphorus: bool,
        potassium: bool,
    },
    AcidityOutOfRange {
        acidity: f64,
        min: f64,
        max: f64,
    },
    AcidityWhilePumping {
        acidity: f64,
        min: f64,
        max: f64,
    },
}

pub fn should_switch_on(inputs: &DecisionInputs, thresholds: &Thresholds) -> bool {
    let dry = matches!(inputs.humidity, SensorSample::Valid(h) if h < thresholds.humidity_low);
    dry && inputs.nutrients.irrigation_ready() && thresholds.acidity_in_range(inputs.acidity)
}

pub fn off_condition(inputs: &DecisionInputs, thresholds: &Thresholds) -> bool {
    let wet_or_unknown = match inputs.humidity {
        SensorSample::Valid(h) => h > thresholds.humidity_high,
        SensorSample::Invalid => true,
    };
    wet_or_unknown
        || !inputs.nutrients.irrigation_ready()
        || !thresholds.acidity_in_range(inputs.acidity)
}

/// Advance the state machine by one cycle. Returns the transition taken, if any.
pub fn decide(
    pump: &mut PumpState,
    inputs: &DecisionInputs,
    thresholds: &Thresholds,
    now: Duration,
) -> Option<Transition> {
    match pump.on_since {
        None => {
            if should_switch_on(inputs, thresholds) {
                pump.switch_on(now);
                return Some(Transition::SwitchedOn);
            }
            None
        }
        Some(since) => {
            let held = now.saturating_sub(since) >= thresholds.minimum_on;
            if held && off_condition(inputs, thresholds) {
                pump.switch_off();
                return Some(Transition::SwitchedOff);
            }
            None
        }
    }
}

/// Alerts for the current state, evaluated after the decision.
pub fn diagnose(pump: &PumpState, inputs: &DecisionInputs, thresholds: &Thresholds) -> Vec<Alert> {
    let mut alerts = Vec::new();
    let acidity_ok = thresholds.acidity_in_range(inputs.acidity);

    if pump.is_on() {
        if !acidity_ok {
            alerts.push(Alert::AcidityWhilePumping {
                acidity: inputs.acidity,
                min: thresholds.acidity_min,
                max: thresholds.acidity_max,
            });
        }
        return alerts;
    }

    let dry = matches!(inputs.humidity, SensorSample::Valid(h) if h < thresholds.humidity_low);
    if !dry {
        return alerts;
    }
    if !inputs.nutrients.irrigation_ready() {
        alerts.push(Alert::NutrientsMissing {
            phosphorus: inputs.nutrients.phosphorus,
            potassium: inputs.nutrients.potassium,
        });
    }
    if !acidity_ok {
        alerts.push(Alert::AcidityOutOfRange {
            acidity: inputs.acidity,
            min: thresholds.acidity_min,
            max: thresholds.acidity_max,
        });
    }
    alerts
}
