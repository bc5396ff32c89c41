//! Sensor adapters over the Linux IIO sysfs interface.
//!
//! The kernel's `bmp280` driver exposes the BME280 and the `ltr501` driver
//! exposes the LTR559 under `/sys/bus/iio/devices/iio:deviceN/`. Each device
//! directory carries a `name` file used for discovery.

use enviro_core::{EnviroError, EnvironmentSensor, ProximitySensor, Result};
use std::path::{Path, PathBuf};

/// Locate the IIO device whose `name` file equals `name`.
pub fn find_device(root: &Path, name: &str) -> Result<PathBuf> {
    let entries = std::fs::read_dir(root).map_err(|e| {
        EnviroError::Init(format!("cannot list IIO devices in '{}': {e}", root.display()))
    })?;

    for entry in entries.flatten() {
        let dir = entry.path();
        let Ok(found) = std::fs::read_to_string(dir.join("name")) else {
            continue;
        };
        if found.trim() == name {
            return Ok(dir);
        }
    }

    Err(EnviroError::Init(format!(
        "IIO device '{name}' not found under '{}'",
        root.display()
    )))
}

fn read_attr<T: std::str::FromStr>(dir: &Path, attr: &str) -> Result<T> {
    let path = dir.join(attr);
    let raw = std::fs::read_to_string(&path)
        .map_err(|e| EnviroError::Sensor(format!("read '{}': {e}", path.display())))?;
    raw.trim()
        .parse()
        .map_err(|_| EnviroError::Sensor(format!("bad value {:?} in '{}'", raw.trim(), path.display())))
}

/// BME280 temperature / pressure / humidity sensor.
#[derive(Debug, Clone)]
pub struct Bme280 {
    dir: PathBuf,
}

impl Bme280 {
    pub fn open(root: &Path, name: &str) -> Result<Self> {
        let dir = find_device(root, name)?;
        tracing::info!("Environment sensor '{name}' at {}", dir.display());
        Ok(Self { dir })
    }
}

impl EnvironmentSensor for Bme280 {
    fn temperature_c(&mut self) -> Result<f32> {
        // milli-degrees Celsius
        Ok(read_attr::<f32>(&self.dir, "in_temp_input")? / 1000.0)
    }

    fn pressure_hpa(&mut self) -> Result<f32> {
        // kPa
        Ok(read_attr::<f32>(&self.dir, "in_pressure_input")? * 10.0)
    }

    fn humidity_percent(&mut self) -> Result<f32> {
        // milli-percent
        Ok(read_attr::<f32>(&self.dir, "in_humidityrelative_input")? / 1000.0)
    }
}

/// LTR559 proximity / ambient light sensor.
#[derive(Debug, Clone)]
pub struct Ltr559 {
    dir: PathBuf,
}

impl Ltr559 {
    pub fn open(root: &Path, name: &str) -> Result<Self> {
        let dir = find_device(root, name)?;
        tracing::info!("Proximity sensor '{name}' at {}", dir.display());
        Ok(Self { dir })
    }
}

impl ProximitySensor for Ltr559 {
    fn proximity(&mut self) -> Result<u16> {
        read_attr(&self.dir, "in_proximity_raw")
    }

    fn lux(&mut self) -> Result<f32> {
        read_attr(&self.dir, "in_illuminance_input")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_root(tag: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!("enviro-iio-{tag}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&root);

        let bme = root.join("iio:device0");
        std::fs::create_dir_all(&bme).unwrap();
        std::fs::write(bme.join("name"), "bme280\n").unwrap();
        std::fs::write(bme.join("in_temp_input"), "21370\n").unwrap();
        std::fs::write(bme.join("in_pressure_input"), "101.325\n").unwrap();
        std::fs::write(bme.join("in_humidityrelative_input"), "45500\n").unwrap();

        let ltr = root.join("iio:device1");
        std::fs::create_dir_all(&ltr).unwrap();
        std::fs::write(ltr.join("name"), "ltr559\n").unwrap();
        std::fs::write(ltr.join("in_proximity_raw"), "7\n").unwrap();
        std::fs::write(ltr.join("in_illuminance_input"), "312.5\n").unwrap();

        root
    }

    #[test]
    fn reads_scaled_bme280_values() {
        let root = fake_root("bme");
        let mut bme = Bme280::open(&root, "bme280").unwrap();
        assert!((bme.temperature_c().unwrap() - 21.37).abs() < 1e-4);
        assert!((bme.pressure_hpa().unwrap() - 1013.25).abs() < 1e-3);
        assert!((bme.humidity_percent().unwrap() - 45.5).abs() < 1e-4);
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn reads_ltr559_values() {
        let root = fake_root("ltr");
        let mut ltr = Ltr559::open(&root, "ltr559").unwrap();
        assert_eq!(ltr.proximity().unwrap(), 7);
        assert_eq!(ltr.lux().unwrap(), 312.5);
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn missing_device_is_an_init_error() {
        let root = fake_root("missing");
        let err = Bme280::open(&root, "bme680").unwrap_err();
        assert!(matches!(err, EnviroError::Init(_)));
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn malformed_attribute_is_a_sensor_error() {
        let root = fake_root("malformed");
        std::fs::write(root.join("iio:device1/in_proximity_raw"), "busy\n").unwrap();
        let mut ltr = Ltr559::open(&root, "ltr559").unwrap();
        assert!(matches!(ltr.proximity(), Err(EnviroError::Sensor(_))));
        std::fs::remove_dir_all(&root).ok();
    }
}
