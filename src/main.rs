use soy_irrigation::actuator::{PumpOutput, SimulatedOutput};
use soy_irrigation::config::{self, Config};
use soy_irrigation::console::{COMMAND_QUEUE_DEPTH, spawn_line_reader};
use soy_irrigation::control::{self, Controller, ControllerSettings};
use soy_irrigation::sensor::SensorDriver;
use soy_irrigation::sensor::simulated::{Scenario, ScenarioDriver, load_scenario_from_path};
use tokio::sync::mpsc;
use tracing::{info, warn};

type DynDriver = Box<dyn SensorDriver + Send>;
type DynOutput = Box<dyn PumpOutput + Send>;

fn init_tracing(level: tracing::Level) {
    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let config = config::load_from_path(&config_path)?;
    init_tracing(config.log_level().unwrap_or(tracing::Level::INFO));
    info!(
        config_path = %config_path,
        app = %config.app.name,
        "soy-irrigation starting"
    );

    let scenario = load_scenario(&config);
    let (driver, output) = build_io(&config, ScenarioDriver::new(scenario))?;

    let settings = ControllerSettings {
        thresholds: config.thresholds(),
        filter: config.filter_settings(),
        climate_interval: config.climate_interval(),
        polarity: config.polarity(),
    };
    info!(
        humidity_low = settings.thresholds.humidity_low,
        humidity_high = settings.thresholds.humidity_high,
        acidity_min = settings.thresholds.acidity_min,
        acidity_max = settings.thresholds.acidity_max,
        minimum_on_ms = settings.thresholds.minimum_on.as_millis() as u64,
        "Decision thresholds loaded"
    );

    let mut controller = Controller::new(
        driver,
        output,
        std::io::stdout(),
        settings,
        config.runtime_defaults(),
    );

    let (tx, mut commands) = mpsc::channel(COMMAND_QUEUE_DEPTH);
    spawn_line_reader(tx)?;

    let cycle_interval = config.cycle_interval();
    info!(
        interval_ms = cycle_interval.as_millis() as u64,
        "Starting control loop"
    );

    tokio::select! {
        _ = control::run_loop(&mut controller, &mut commands, cycle_interval) => {}
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => info!("Shutdown requested"),
            Err(err) => warn!(error = %err, "Signal handler failed, stopping"),
        },
    }

    controller.shutdown();
    Ok(())
}

fn load_scenario(config: &Config) -> Scenario {
    match config.scenario_path() {
        Some(path) => match load_scenario_from_path(path) {
            Ok(scenario) => {
                info!(
                    path = %path.display(),
                    phases = scenario.phases.len(),
                    "Simulation scenario loaded"
                );
                scenario
            }
            Err(e) => {
                warn!(error = %e, "Failed to load scenario, using built-in");
                Scenario::builtin()
            }
        },
        None => {
            info!("No scenario path configured, using built-in scenario");
            Scenario::builtin()
        }
    }
}

/// Pick sensor and pump implementations: GPIO when `[hardware]` is configured
/// on Linux, simulation otherwise.
fn build_io(
    config: &Config,
    simulated: ScenarioDriver,
) -> Result<(DynDriver, DynOutput), soy_irrigation::error::AppError> {
    let Some(hardware) = config.hardware() else {
        info!("No [hardware] section, running fully simulated");
        let driver: DynDriver = Box::new(simulated);
        let output: DynOutput = Box::new(SimulatedOutput::new());
        return Ok((driver, output));
    };

    #[cfg(target_os = "linux")]
    {
        use soy_irrigation::actuator::RppalPumpOutput;
        use soy_irrigation::sensor::gpio::GpioNutrientDriver;

        let driver: DynDriver = Box::new(GpioNutrientDriver::new(hardware, simulated)?);
        let output: DynOutput =
            Box::new(RppalPumpOutput::new(hardware.pump_pin, config.polarity())?);
        info!(pump_pin = hardware.pump_pin, "Pump output configured");
        Ok((driver, output))
    }

    #[cfg(not(target_os = "linux"))]
    {
        let _ = hardware;
        warn!("GPIO requires Linux/Raspberry Pi - running fully simulated");
        let driver: DynDriver = Box::new(simulated);
        let output: DynOutput = Box::new(SimulatedOutput::new());
        Ok((driver, output))
    }
}
