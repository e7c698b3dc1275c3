pub mod acquisition;
pub mod actuator;
pub mod config;
pub mod console;
pub mod control;
pub mod error;
pub mod sensor;
pub mod state;
