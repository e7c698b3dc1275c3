//! Scenario-driven simulated sensors.
//!
//! A scenario is an ordered list of phases, each holding the values every
//! sensor reports for a fixed duration. Scenarios are loaded from JSON or
//! taken from the built-in field walk-through.

use crate::error::AppError;
use crate::sensor::{ClimateReading, NutrientLevels, SensorDriver};
use serde::Deserialize;
use std::path::Path;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Restart from the first phase once the last one ends
    #[serde(default = "default_repeat")]
    pub repeat: bool,
    pub phases: Vec<ScenarioPhase>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioPhase {
    #[serde(default)]
    pub name: Option<String>,
    pub duration_ms: u64,
    pub humidity_percent: f64,
    pub temperature_c: f64,
    pub acidity_raw: u16,
    pub nitrogen: bool,
    pub phosphorus: bool,
    pub potassium: bool,
    /// When false the climate sensor fails every read during this phase
    #[serde(default = "default_climate_ok")]
    pub climate_ok: bool,
}

fn default_repeat() -> bool {
    true
}

fn default_climate_ok() -> bool {
    true
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse scenario file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid scenario: {0}")]
    Invalid(String),
}

pub fn load_scenario_from_path(path: impl AsRef<Path>) -> Result<Scenario, ScenarioError> {
    let contents = std::fs::read_to_string(path)?;
    let scenario: Scenario = serde_json::from_str(&contents)?;
    scenario.validate()?;
    Ok(scenario)
}

impl Scenario {
    /// Dry soil with full nutrients, then wet soil, then each blocker in turn,
    /// then a climate sensor outage. Raw acidity values assume a 4095 full scale.
    pub fn builtin() -> Self {
        let phase = |name: &str, secs: u64, humidity: f64, raw: u16, p: bool, k: bool| {
            ScenarioPhase {
                name: Some(name.to_string()),
                duration_ms: secs * 1000,
                humidity_percent: humidity,
                temperature_c: 26.0,
                acidity_raw: raw,
                nitrogen: true,
                phosphorus: p,
                potassium: k,
                climate_ok: true,
            }
        };

        let mut outage = phase("sensor-outage", 10, 42.0, 1872, true, true);
        outage.climate_ok = false;

        Self {
            repeat: true,
            phases: vec![
                phase("dry", 20, 42.0, 1872, true, true),
                phase("drying-gap", 10, 55.0, 1872, true, true),
                phase("wet", 15, 66.0, 1872, true, true),
                phase("dry-no-potassium", 15, 44.0, 1872, true, false),
                phase("dry-acidic", 15, 43.0, 1521, true, true),
                outage,
            ],
        }
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.phases.is_empty() {
            return Err(ScenarioError::Invalid("scenario has no phases".to_string()));
        }
        if let Some(index) = self.phases.iter().position(|p| p.duration_ms == 0) {
            return Err(ScenarioError::Invalid(format!(
                "phase {index} has zero duration"
            )));
        }
        self.phases
            .iter()
            .try_fold(0u64, |total, p| total.checked_add(p.duration_ms))
            .ok_or_else(|| {
                ScenarioError::Invalid("total scenario duration overflows".to_string())
            })?;
        Ok(())
    }

    /// Saturates at `u64::MAX` milliseconds; `validate` rejects scenarios that reach it.
    pub fn total_duration(&self) -> Duration {
        let total_ms = self
            .phases
            .iter()
            .fold(0u64, |total, p| total.saturating_add(p.duration_ms));
        Duration::from_millis(total_ms)
    }

    /// Phase active after `elapsed`. A non-repeating scenario holds its last phase.
    pub fn phase_at(&self, elapsed: Duration) -> &ScenarioPhase {
        let total_ms = self.total_duration().as_millis().max(1);
        let mut offset = elapsed.as_millis();
        if self.repeat {
            offset %= total_ms;
        }

        let mut start = 0u128;
        for phase in &self.phases {
            let end = start + u128::from(phase.duration_ms);
            if offset < end {
                return phase;
            }
            start = end;
        }
        &self.phases[self.phases.len() - 1]
    }
}

/// Sensor driver replaying a [`Scenario`] against wall-clock time.
pub struct ScenarioDriver {
    scenario: Scenario,
    started: Instant,
    last_phase: Option<usize>,
}

impl ScenarioDriver {
    pub fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            started: Instant::now(),
            last_phase: None,
        }
    }

    fn current_phase(&mut self) -> &ScenarioPhase {
        let phase = self.scenario.phase_at(self.started.elapsed());
        let index = self
            .scenario
            .phases
            .iter()
            .position(|p| std::ptr::eq(p, phase));
        if index != self.last_phase {
            debug!(
                phase = phase.name.as_deref().unwrap_or("unnamed"),
                "Simulation phase changed"
            );
            self.last_phase = index;
        }
        phase
    }
}

impl SensorDriver for ScenarioDriver {
    fn read_nutrient_levels(&mut self) -> Result<NutrientLevels, AppError> {
        let phase = self.current_phase();
        Ok(NutrientLevels::from_presence(
            phase.nitrogen,
            phase.phosphorus,
            phase.potassium,
        ))
    }

    fn read_acidity_raw(&mut self) -> Result<u16, AppError> {
        Ok(self.current_phase().acidity_raw)
    }

    fn read_climate(&mut self) -> Result<ClimateReading, AppError> {
        let phase = self.current_phase();
        if !phase.climate_ok {
            return Err(AppError::Sensor("simulated climate sensor timeout".to_string()));
        }
        Ok(ClimateReading {
            humidity_percent: phase.humidity_percent,
            temperature_c: phase.temperature_c,
        })
    }
}
