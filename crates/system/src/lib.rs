pub mod cpu;
pub mod history;
pub mod iio;
pub mod mode;

pub use cpu::{CpuTemperatureCompensator, Hwmon, Vcgencmd};
pub use history::HistoryBuffer;
pub use iio::{Bme280, Ltr559};
pub use mode::ModeController;

use chrono::Local;
use enviro_core::{
    CpuTemperatureSource, EnviroError, EnvironmentSensor, ProximitySensor, Result, Snapshot,
    LIGHT_OCCLUDED,
};
use tracing::{debug, warn};

/// Proximity count at or above which the light sensor counts as covered.
pub const DEFAULT_OCCLUSION_THRESHOLD: u16 = 10;

/// Reads every sensor once per cycle and folds the readings into a
/// compensated [`Snapshot`].
///
/// Holds only the collaborators; the smoothing window lives in the caller's
/// [`CpuTemperatureCompensator`] so that all cycle state has a single owner.
pub struct SensorAggregator<E, P, C> {
    environment: E,
    proximity:   P,
    cpu:         C,
    occlusion_threshold: u16,
}

impl<E, P, C> SensorAggregator<E, P, C>
where
    E: EnvironmentSensor,
    P: ProximitySensor,
    C: CpuTemperatureSource,
{
    pub fn new(environment: E, proximity: P, cpu: C, occlusion_threshold: u16) -> Self {
        Self {
            environment,
            proximity,
            cpu,
            occlusion_threshold,
        }
    }

    /// One CPU reading, `0.0` if the source is unavailable.
    pub fn read_cpu_temperature(&mut self) -> f32 {
        self.cpu.cpu_temperature_c().unwrap_or_else(|e| {
            warn!("CPU temperature unavailable, using 0: {e}");
            0.0
        })
    }

    /// Poll all sensors once.
    ///
    /// A failed read leaves its field `None`. Errors only when nothing at all
    /// could be read, in which case the cycle has nothing to show.
    pub fn poll(&mut self, compensator: &mut CpuTemperatureCompensator) -> Result<Snapshot> {
        let raw_cpu = self.read_cpu_temperature();
        let baseline = compensator.sample(raw_cpu);

        let raw_ambient = field("temperature", self.environment.temperature_c());
        let temperature_c = raw_ambient.map(|raw| compensator.compensate(raw, baseline));
        debug!(raw_cpu, baseline, ?raw_ambient, ?temperature_c, "compensated");

        let pressure_hpa = field("pressure", self.environment.pressure_hpa());
        let humidity_percent = field("humidity", self.environment.humidity_percent());

        let proximity = field("proximity", self.proximity.proximity());
        let light_lux = match proximity {
            Some(p) if p < self.occlusion_threshold => field("light", self.proximity.lux()),
            Some(_) => Some(LIGHT_OCCLUDED),
            None => None,
        };

        let snapshot = Snapshot {
            temperature_c,
            pressure_hpa,
            humidity_percent,
            light_lux,
            proximity,
            taken_at: Local::now(),
        };

        if snapshot.is_empty() {
            return Err(EnviroError::Sensor("every sensor read failed".into()));
        }
        Ok(snapshot)
    }
}

fn field<T>(name: &str, reading: Result<T>) -> Option<T> {
    match reading {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{name} read failed: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeEnv {
        temperature: Option<f32>,
        pressure:    Option<f32>,
        humidity:    Option<f32>,
    }

    fn or_io<T>(v: Option<T>) -> Result<T> {
        v.ok_or_else(|| EnviroError::Sensor("i2c timeout".into()))
    }

    impl EnvironmentSensor for FakeEnv {
        fn temperature_c(&mut self) -> Result<f32> {
            or_io(self.temperature)
        }
        fn pressure_hpa(&mut self) -> Result<f32> {
            or_io(self.pressure)
        }
        fn humidity_percent(&mut self) -> Result<f32> {
            or_io(self.humidity)
        }
    }

    struct FakeProx {
        proximity: Option<u16>,
        lux:       f32,
        lux_reads: usize,
    }

    impl ProximitySensor for FakeProx {
        fn proximity(&mut self) -> Result<u16> {
            or_io(self.proximity)
        }
        fn lux(&mut self) -> Result<f32> {
            self.lux_reads += 1;
            Ok(self.lux)
        }
    }

    struct FakeCpu(Option<f32>);

    impl CpuTemperatureSource for FakeCpu {
        fn cpu_temperature_c(&mut self) -> Result<f32> {
            or_io(self.0)
        }
    }

    fn aggregator(
        env: FakeEnv,
        proximity: Option<u16>,
        cpu: Option<f32>,
    ) -> SensorAggregator<FakeEnv, FakeProx, FakeCpu> {
        let prox = FakeProx {
            proximity,
            lux: 250.0,
            lux_reads: 0,
        };
        SensorAggregator::new(env, prox, FakeCpu(cpu), DEFAULT_OCCLUSION_THRESHOLD)
    }

    fn full_env() -> FakeEnv {
        FakeEnv {
            temperature: Some(20.0),
            pressure:    Some(1013.2),
            humidity:    Some(48.0),
        }
    }

    #[test]
    fn compensates_against_cpu_baseline() {
        let mut agg = aggregator(full_env(), Some(0), Some(25.0));
        let mut comp = CpuTemperatureCompensator::primed(25.0, 5, 2.25);
        let snap = agg.poll(&mut comp).unwrap();

        let c = snap.temperature_c.unwrap();
        assert!((c - 17.78).abs() < 0.01);
        assert!((snap.temperature_f().unwrap() - 64.0).abs() < 0.1);
        assert_eq!(snap.pressure_hpa, Some(1013.2));
        assert_eq!(snap.humidity_percent, Some(48.0));
    }

    #[test]
    fn uncovered_sensor_reads_lux() {
        let mut agg = aggregator(full_env(), Some(5), Some(40.0));
        let snap = agg.poll(&mut CpuTemperatureCompensator::default()).unwrap();
        assert_eq!(snap.light_lux, Some(250.0));
        assert_eq!(agg.proximity.lux_reads, 1);
    }

    #[test]
    fn covered_sensor_reports_sentinel_light() {
        let mut agg = aggregator(full_env(), Some(10), Some(40.0));
        let snap = agg.poll(&mut CpuTemperatureCompensator::default()).unwrap();
        assert_eq!(snap.light_lux, Some(LIGHT_OCCLUDED));
        assert_eq!(agg.proximity.lux_reads, 0);
        assert_eq!(snap.proximity, Some(10));
    }

    #[test]
    fn cpu_failure_counts_as_zero() {
        let mut agg = aggregator(full_env(), Some(0), None);
        let mut comp = CpuTemperatureCompensator::default();
        let snap = agg.poll(&mut comp).unwrap();
        assert_eq!(comp.baseline(), 0.0);
        // 20 - (0 - 20) / 2.25
        assert!((snap.temperature_c.unwrap() - 28.888_89).abs() < 1e-3);
    }

    #[test]
    fn partial_failure_keeps_other_fields() {
        let env = FakeEnv {
            temperature: None,
            ..full_env()
        };
        let mut agg = aggregator(env, None, Some(40.0));
        let snap = agg.poll(&mut CpuTemperatureCompensator::default()).unwrap();
        assert_eq!(snap.temperature_c, None);
        assert_eq!(snap.proximity, None);
        assert_eq!(snap.light_lux, None);
        assert_eq!(snap.pressure_hpa, Some(1013.2));
    }

    #[test]
    fn total_failure_is_an_error() {
        let mut agg = aggregator(FakeEnv::default(), None, None);
        let mut comp = CpuTemperatureCompensator::default();
        assert!(matches!(agg.poll(&mut comp), Err(EnviroError::Sensor(_))));
        // The CPU sample still lands in the window.
        assert_eq!(comp.len(), 1);
    }
}
