use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("sensor error: {0}")]
    Sensor(String),
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("console write failed: {0}")]
    Console(#[from] std::io::Error),
}
