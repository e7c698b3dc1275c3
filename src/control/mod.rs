use crate::acquisition::acquire;
use crate::actuator::{Polarity, PumpOutput};
use crate::console::Console;
use crate::console::command::handle_line;
use crate::console::report::StatusLine;
use crate::control::filter::FilterSettings;
use crate::control::pump::{Alert, DecisionInputs, Thresholds, Transition, decide, diagnose};
use crate::sensor::SensorDriver;
use crate::state::{ControllerState, RuntimeConfig};
use std::fmt::Display;
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

pub mod filter;
pub mod pump;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerSettings {
    pub thresholds: Thresholds,
    pub filter: FilterSettings,
    pub climate_interval: Duration,
    pub polarity: Polarity,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            filter: FilterSettings::default(),
            climate_interval: Duration::from_millis(crate::config::DEFAULT_CLIMATE_INTERVAL_MS),
            polarity: Polarity::ActiveHigh,
        }
    }
}

/// What one control cycle did, for callers that want more than the console.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub transition: Option<Transition>,
    pub alerts: Vec<Alert>,
    pub reply: Option<String>,
    pub status: StatusLine,
}

pub struct Controller<D, O, W> {
    driver: D,
    output: O,
    console: Console<W>,
    settings: ControllerSettings,
    state: ControllerState,
}

impl<D, O, W> Controller<D, O, W>
where
    D: SensorDriver,
    O: PumpOutput,
    W: Write,
{
    pub fn new(
        driver: D,
        output: O,
        console_out: W,
        settings: ControllerSettings,
        runtime: RuntimeConfig,
    ) -> Self {
        Self {
            driver,
            output,
            console: Console::new(console_out),
            state: ControllerState::new(settings.filter, runtime),
            settings,
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn console(&self) -> &W {
        self.console.get_ref()
    }

    /// One full cycle: acquire, filter, handle at most one console line,
    /// decide, drive the pump line, then report.
    pub fn run_cycle(&mut self, now: Duration, input: Option<&str>) -> CycleReport {
        let settings = self.settings;

        if let Some(raw) = acquire(
            &mut self.driver,
            &mut self.state,
            now,
            settings.climate_interval,
        ) {
            self.state.acidity.update(raw);
        }

        let reply = input.and_then(|line| handle_line(line, &mut self.state.runtime));
        if let Some(reply) = &reply {
            self.emit(reply);
        }

        let inputs = DecisionInputs {
            humidity: self.state.climate.humidity(),
            nutrients: self.state.nutrients,
            acidity: self.state.acidity.value(),
        };
        let transition = decide(&mut self.state.pump, &inputs, &settings.thresholds, now);
        match transition {
            Some(Transition::SwitchedOn) => info!(
                humidity = ?inputs.humidity.value(),
                acidity = inputs.acidity,
                "Pump switched on"
            ),
            Some(Transition::SwitchedOff) => info!(
                humidity = ?inputs.humidity.value(),
                acidity = inputs.acidity,
                phosphorus = inputs.nutrients.phosphorus,
                potassium = inputs.nutrients.potassium,
                "Pump switched off"
            ),
            None => {}
        }

        self.drive_output();

        let alerts = diagnose(&self.state.pump, &inputs, &settings.thresholds);
        for alert in &alerts {
            self.emit(alert);
        }

        let status = StatusLine::capture(&self.state, &settings.thresholds);
        self.emit(&status);

        CycleReport {
            transition,
            alerts,
            reply,
            status,
        }
    }

    /// Drive the pump line inactive regardless of the logical state.
    pub fn shutdown(&mut self) {
        let level = self.settings.polarity.level_for(false);
        if let Err(err) = self.output.drive(level) {
            warn!(error = %err, "Failed to release pump output on shutdown");
        }
    }

    fn drive_output(&mut self) {
        let level = self.settings.polarity.level_for(self.state.pump.is_on());
        if let Err(err) = self.output.drive(level) {
            warn!(error = %err, "Failed to drive pump output");
        }
    }

    fn emit(&mut self, text: impl Display) {
        if let Err(err) = self.console.line(text) {
            warn!(error = %err, "Console write failed");
        }
    }
}

/// Run cycles at a fixed cadence until the future is dropped. Console lines
/// are taken one per cycle and never waited for.
pub async fn run_loop<D, O, W>(
    controller: &mut Controller<D, O, W>,
    commands: &mut mpsc::Receiver<String>,
    cycle_interval: Duration,
) where
    D: SensorDriver,
    O: PumpOutput,
    W: Write,
{
    let started = Instant::now();
    let mut ticker = tokio::time::interval(cycle_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let line = commands.try_recv().ok();
        let report = controller.run_cycle(started.elapsed(), line.as_deref());
        debug!(
            pump_on = report.status.pump_on,
            alerts = report.alerts.len(),
            "Cycle complete"
        );
    }
}
