use thiserror::Error;

/// Top-level error type used across the entire application.
#[derive(Debug, Error)]
pub enum EnviroError {
    #[error("config error: {0}")]
    Config(String),

    /// A single sensor read failed; the next cycle will try again.
    #[error("sensor error: {0}")]
    Sensor(String),

    /// The frame could not be pushed to the panel.
    #[error("display error: {0}")]
    Display(String),

    /// A required sensor or the panel is missing at startup.
    #[error("init error: {0}")]
    Init(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub type Result<T, E = EnviroError> = std::result::Result<T, E>;
