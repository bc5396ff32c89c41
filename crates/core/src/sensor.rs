use crate::error::Result;

/// Temperature / pressure / humidity sensor (BME280 class).
///
/// Implementations perform one bus transaction per call and must not retry;
/// the update cycle itself is the retry mechanism.
pub trait EnvironmentSensor {
    /// Raw ambient temperature in °C (uncompensated).
    fn temperature_c(&mut self) -> Result<f32>;
    fn pressure_hpa(&mut self) -> Result<f32>;
    fn humidity_percent(&mut self) -> Result<f32>;
}

/// Proximity / ambient light sensor (LTR559 class).
pub trait ProximitySensor {
    /// Raw proximity count; larger means closer.
    fn proximity(&mut self) -> Result<u16>;
    fn lux(&mut self) -> Result<f32>;
}

/// Source of the SoC temperature used for self-heating compensation.
pub trait CpuTemperatureSource {
    fn cpu_temperature_c(&mut self) -> Result<f32>;
}

/// A colour panel that accepts whole frames.
pub trait DisplayPanel {
    /// Logical `(width, height)` in pixels, after the panel's fixed rotation.
    fn size(&self) -> (u32, u32);

    /// Push one frame of RGB565 pixels in row-major order of the logical
    /// geometry. `pixels.len()` equals `width * height`.
    fn transfer(&mut self, pixels: &[u16]) -> Result<()>;
}

impl<T: CpuTemperatureSource + ?Sized> CpuTemperatureSource for Box<T> {
    fn cpu_temperature_c(&mut self) -> Result<f32> {
        (**self).cpu_temperature_c()
    }
}
