use chrono::{DateTime, Local};

/// Light value reported while the proximity sensor is covered.
pub const LIGHT_OCCLUDED: f32 = 1.0;

/// Celsius → Fahrenheit.
#[inline]
#[must_use]
pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    celsius * 1.8 + 32.0
}

/// Every metric the station tracks, in the order the proximity tap cycles
/// through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    TemperatureC,
    TemperatureF,
    Pressure,
    Humidity,
    Light,
}

impl Metric {
    pub const ALL: [Self; 5] = [
        Self::TemperatureC,
        Self::TemperatureF,
        Self::Pressure,
        Self::Humidity,
        Self::Light,
    ];

    /// Position of this metric in [`Metric::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Metric at `index`, wrapping around [`Metric::ALL`].
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    /// Four-letter label shown on the single-metric page.
    pub const fn label(self) -> &'static str {
        match self {
            Self::TemperatureC | Self::TemperatureF => "temp",
            Self::Pressure => "pres",
            Self::Humidity => "humi",
            Self::Light => "ligh",
        }
    }

    pub const fn unit(self) -> &'static str {
        match self {
            Self::TemperatureC => "C",
            Self::TemperatureF => "F",
            Self::Pressure => "hPa",
            Self::Humidity => "%",
            Self::Light => "Lux",
        }
    }
}

/// One poll's worth of readings.
///
/// A `None` field means that read failed this cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// CPU-compensated ambient temperature.
    pub temperature_c: Option<f32>,
    /// Pressure in hPa.
    pub pressure_hpa: Option<f32>,
    /// Relative humidity (0.0 – 100.0).
    pub humidity_percent: Option<f32>,
    /// Ambient light in lux, or [`LIGHT_OCCLUDED`] while the sensor is covered.
    pub light_lux: Option<f32>,
    /// Raw proximity count (unitless).
    pub proximity: Option<u16>,
    /// Local time the poll finished.
    pub taken_at: DateTime<Local>,
}

impl Snapshot {
    /// Empty snapshot stamped with `taken_at`.
    pub fn empty(taken_at: DateTime<Local>) -> Self {
        Self {
            temperature_c: None,
            pressure_hpa: None,
            humidity_percent: None,
            light_lux: None,
            proximity: None,
            taken_at,
        }
    }

    #[must_use]
    pub fn temperature_f(&self) -> Option<f32> {
        self.temperature_c.map(celsius_to_fahrenheit)
    }

    /// Reading for `metric`, if it was available this cycle.
    #[must_use]
    pub fn value(&self, metric: Metric) -> Option<f32> {
        match metric {
            Metric::TemperatureC => self.temperature_c,
            Metric::TemperatureF => self.temperature_f(),
            Metric::Pressure => self.pressure_hpa,
            Metric::Humidity => self.humidity_percent,
            Metric::Light => self.light_lux,
        }
    }

    /// `true` when not a single reading succeeded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.temperature_c.is_none()
            && self.pressure_hpa.is_none()
            && self.humidity_percent.is_none()
            && self.light_lux.is_none()
            && self.proximity.is_none()
    }
}
