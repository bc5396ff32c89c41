use enviro_core::{CpuTemperatureSource, EnviroError, Result};
use std::collections::VecDeque;
use std::process::Command;
use sysinfo::Components;

/// Rolling window of CPU temperature samples and the self-heating correction
/// derived from it.
///
/// The ambient sensor sits next to the SoC and reads high; the smoothed CPU
/// temperature is used as a proxy for how much heat bleeds into it.
#[derive(Debug, Clone)]
pub struct CpuTemperatureCompensator {
    samples:  VecDeque<f32>,
    capacity: usize,
    factor:   f32,
}

impl CpuTemperatureCompensator {
    pub const DEFAULT_FACTOR: f32 = 2.25;
    pub const DEFAULT_WINDOW: usize = 5;

    /// Empty window: until it fills up, the baseline averages whatever has
    /// been sampled so far.
    pub fn new(capacity: usize, factor: f32) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            factor,
        }
    }

    /// Window pre-filled with `first_reading` repeated, so the first few
    /// baselines are not skewed by a half-empty window.
    pub fn primed(first_reading: f32, capacity: usize, factor: f32) -> Self {
        let mut this = Self::new(capacity, factor);
        this.samples.extend(std::iter::repeat(first_reading).take(this.capacity));
        this
    }

    /// Push a new sample, evicting the oldest if at capacity, and return the
    /// new baseline.
    pub fn sample(&mut self, raw_cpu_c: f32) -> f32 {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(raw_cpu_c);
        self.baseline()
    }

    /// Average of all samples in the window.
    pub fn baseline(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f32>() / self.samples.len() as f32
    }

    /// Corrected ambient temperature: `raw − (baseline − raw) / factor`.
    pub fn compensate(&self, raw_ambient_c: f32, baseline: f32) -> f32 {
        raw_ambient_c - (baseline - raw_ambient_c) / self.factor
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }
}

impl Default for CpuTemperatureCompensator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW, Self::DEFAULT_FACTOR)
    }
}

// ── Sources ───────────────────────────────────────────────────────────────────

/// Raspberry Pi firmware query: `vcgencmd measure_temp` → `temp=48.3'C`.
#[derive(Debug, Default)]
pub struct Vcgencmd;

impl CpuTemperatureSource for Vcgencmd {
    fn cpu_temperature_c(&mut self) -> Result<f32> {
        let output = Command::new("vcgencmd")
            .arg("measure_temp")
            .output()
            .map_err(|e| EnviroError::Sensor(format!("vcgencmd: {e}")))?;

        if !output.status.success() {
            return Err(EnviroError::Sensor(format!(
                "vcgencmd exited with {}",
                output.status
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_measure_temp(&stdout)
            .ok_or_else(|| EnviroError::Sensor(format!("unexpected vcgencmd output: {stdout:?}")))
    }
}

/// Extract the number between `=` and the last `'` of `temp=48.3'C`.
pub fn parse_measure_temp(output: &str) -> Option<f32> {
    let start = output.find('=')? + 1;
    let end = output.rfind('\'')?;
    if end < start {
        return None;
    }
    output[start..end].trim().parse().ok()
}

/// Kernel hwmon / thermal-zone sensors, via sysinfo.
pub struct Hwmon {
    components: Components,
}

impl Hwmon {
    pub fn new() -> Self {
        Self {
            components: Components::new_with_refreshed_list(),
        }
    }
}

impl Default for Hwmon {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuTemperatureSource for Hwmon {
    fn cpu_temperature_c(&mut self) -> Result<f32> {
        self.components.refresh(false);
        self.components
            .list()
            .iter()
            .find(|c| is_cpu_label(c.label()))
            .and_then(|c| c.temperature())
            .ok_or_else(|| EnviroError::Sensor("no CPU temperature sensor in hwmon".into()))
    }
}

fn is_cpu_label(label: &str) -> bool {
    let label = label.to_lowercase();
    ["cpu", "soc", "package", "core"]
        .iter()
        .any(|needle| label.contains(needle))
}
