use enviro_core::{EnviroError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure parsed from `enviro.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnviroConfig {
    pub scheduler: SchedulerConfig,
    pub compensation: CompensationConfig,
    pub mode: ModeConfig,
    pub sensors: SensorsConfig,
    pub display: DisplayConfig,
}

impl EnviroConfig {
    /// Reject values the update loop cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.scheduler.period_secs == 0 {
            return Err(EnviroError::Config("scheduler.period_secs must be > 0".into()));
        }
        if !(self.compensation.factor.is_finite() && self.compensation.factor > 0.0) {
            return Err(EnviroError::Config(
                "compensation.factor must be a positive number".into(),
            ));
        }
        if self.compensation.window == 0 {
            return Err(EnviroError::Config("compensation.window must be > 0".into()));
        }
        if !matches!(self.display.rotation, 0 | 90 | 180 | 270) {
            return Err(EnviroError::Config(format!(
                "display.rotation must be 0, 90, 180 or 270 (got {})",
                self.display.rotation
            )));
        }
        if self.display.width == 0 || self.display.height == 0 {
            return Err(EnviroError::Config("display size must be non-zero".into()));
        }
        Ok(())
    }
}

/// Update loop timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds between cycle starts.
    pub period_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { period_secs: 10 }
    }
}

/// Where the SoC temperature comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CpuSource {
    /// `vcgencmd measure_temp` (Raspberry Pi firmware).
    #[default]
    Vcgencmd,
    /// Kernel hwmon / thermal zones via sysinfo.
    Hwmon,
}

/// CPU self-heating compensation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompensationConfig {
    /// Tuning factor. Decrease to pull the temperature down further,
    /// increase to pull it down less.
    pub factor: f32,
    /// Number of CPU samples averaged into the baseline.
    pub window: usize,
    pub cpu_source: CpuSource,
}

impl Default for CompensationConfig {
    fn default() -> Self {
        Self {
            factor: 2.25,
            window: 5,
            cpu_source: CpuSource::Vcgencmd,
        }
    }
}

/// Proximity tap that cycles the selected metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeConfig {
    /// Raw proximity count above which the sensor counts as tapped.
    pub proximity_threshold: u16,
    /// Minimum gap between accepted taps, in milliseconds.
    pub debounce_ms: u64,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            proximity_threshold: 1500,
            debounce_ms: 500,
        }
    }
}

/// Sensor discovery and thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorsConfig {
    /// Root of the kernel IIO device tree.
    pub iio_root: PathBuf,
    /// IIO `name` of the temperature/pressure/humidity sensor.
    pub environment: String,
    /// IIO `name` of the proximity/light sensor.
    pub proximity: String,
    /// Proximity count at or above which the light sensor is considered
    /// covered and lux is not read.
    pub occlusion_threshold: u16,
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            iio_root: PathBuf::from("/sys/bus/iio/devices"),
            environment: "bme280".to_string(),
            proximity: "ltr559".to_string(),
            occlusion_threshold: 10,
        }
    }
}

/// Screen layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Temperature + pressure, humidity, timestamp.
    #[default]
    Summary,
    /// The metric picked with the proximity tap, coloured by its history.
    Metric,
}

/// Panel geometry and styling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Framebuffer device the panel is exposed as.
    pub device: PathBuf,
    /// Native panel width in pixels (before rotation).
    pub width: u32,
    /// Native panel height in pixels (before rotation).
    pub height: u32,
    /// Fixed rotation in degrees: 0, 90, 180 or 270.
    pub rotation: u16,
    /// Background colour (hex, e.g. `"#0d0d0d"`).
    pub background: String,
    /// Text colour.
    pub foreground: String,
    pub layout: Layout,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            device:     PathBuf::from("/dev/fb1"),
            width:      80,
            height:     160,
            rotation:   270,
            background: "#0d0d0d".to_string(),
            foreground: "#d9d9d9".to_string(),
            layout:     Layout::Summary,
        }
    }
}
