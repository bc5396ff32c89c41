pub mod error;
pub mod sensor;
pub mod state;

pub use error::{EnviroError, Result};
pub use sensor::{CpuTemperatureSource, DisplayPanel, EnvironmentSensor, ProximitySensor};
pub use state::{celsius_to_fahrenheit, Metric, Snapshot, LIGHT_OCCLUDED};
