//! Station daemon for `enviro`.
//!
//! Owns the single-threaded runtime and wires the pieces together:
//! - IIO environment + proximity sensors, CPU temperature source
//! - Framebuffer panel and renderer
//! - Fixed-period update scheduler (poll → render → re-arm)
//! - SIGINT / SIGTERM shutdown

pub mod scheduler;

pub use scheduler::{Cycle, Phase, Schedule, UpdateScheduler};

use enviro_config::{CompensationConfig, CpuSource, EnviroConfig, ModeConfig};
use enviro_core::{
    CpuTemperatureSource, DisplayPanel, EnviroError, EnvironmentSensor, Metric, ProximitySensor,
    Result,
};
use enviro_display::{DisplayRenderer, FramebufferPanel, Rotation, Selection};
use enviro_system::{
    Bme280, CpuTemperatureCompensator, HistoryBuffer, Hwmon, Ltr559, ModeController,
    SensorAggregator, Vcgencmd,
};
use std::time::Duration;
use tracing::{error, info, warn};

// ── Entry point ───────────────────────────────────────────────────────────────

/// Start the station.  Returns only on shutdown or a fatal startup error.
pub fn run(config: EnviroConfig) -> Result<()> {
    config.validate()?;

    // One thread: sensor reads, rendering and the timer never overlap.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let station = build_station(&config)?;
        let period = Duration::from_secs(config.scheduler.period_secs);
        let mut scheduler = UpdateScheduler::new(station, period);

        let cycles = scheduler.run_until(shutdown_signal()).await;
        info!("Stopped after {cycles} cycle(s)");
        Ok::<(), EnviroError>(())
    })
}

type LinuxStation = Station<Bme280, Ltr559, Box<dyn CpuTemperatureSource>, FramebufferPanel>;

fn build_station(config: &EnviroConfig) -> Result<LinuxStation> {
    let sensors = &config.sensors;
    let environment = Bme280::open(&sensors.iio_root, &sensors.environment)?;
    let proximity = Ltr559::open(&sensors.iio_root, &sensors.proximity)?;

    let cpu: Box<dyn CpuTemperatureSource> = match config.compensation.cpu_source {
        CpuSource::Vcgencmd => Box::new(Vcgencmd),
        CpuSource::Hwmon => Box::new(Hwmon::new()),
    };

    let display = &config.display;
    let rotation = Rotation::from_degrees(display.rotation).ok_or_else(|| {
        EnviroError::Config(format!("unsupported rotation {}", display.rotation))
    })?;
    let panel = FramebufferPanel::open(&display.device, display.width, display.height, rotation)?;

    let aggregator =
        SensorAggregator::new(environment, proximity, cpu, sensors.occlusion_threshold);
    let renderer = DisplayRenderer::from_config(panel, display);

    Ok(Station::new(aggregator, renderer, &config.compensation, &config.mode))
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Cannot listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

// ── Station ───────────────────────────────────────────────────────────────────

/// What a single cycle ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Frame drawn and transferred.
    Rendered,
    /// Nothing could be read; the previous frame stays up.
    Skipped,
    /// Frame drawn but the transfer failed; the previous frame stays up.
    DisplayFailed,
}

/// All state that lives across cycles, owned in one place and handed to
/// each component by reference.
pub struct Station<E, P, C, D> {
    aggregator:  SensorAggregator<E, P, C>,
    renderer:    DisplayRenderer<D>,
    compensator: CpuTemperatureCompensator,
    history:     HistoryBuffer,
    mode:        ModeController,
}

impl<E, P, C, D> Station<E, P, C, D>
where
    E: EnvironmentSensor,
    P: ProximitySensor,
    C: CpuTemperatureSource,
    D: DisplayPanel,
{
    /// Primes the CPU window with one reading taken now.
    pub fn new(
        mut aggregator: SensorAggregator<E, P, C>,
        renderer: DisplayRenderer<D>,
        compensation: &CompensationConfig,
        mode: &ModeConfig,
    ) -> Self {
        let first = aggregator.read_cpu_temperature();
        let compensator =
            CpuTemperatureCompensator::primed(first, compensation.window, compensation.factor);
        let history = HistoryBuffer::new(renderer.width() as usize);
        let mode = ModeController::new(
            Metric::ALL.len(),
            mode.proximity_threshold,
            Duration::from_millis(mode.debounce_ms),
        );

        Self {
            aggregator,
            renderer,
            compensator,
            history,
            mode,
        }
    }

    pub fn selected(&self) -> Metric {
        Metric::from_index(self.mode.index())
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn renderer(&self) -> &DisplayRenderer<D> {
        &self.renderer
    }

    /// Poll, update derived state, render.  `now` feeds the tap debounce.
    pub fn update(&mut self, now: std::time::Instant) -> CycleOutcome {
        let snapshot = match self.aggregator.poll(&mut self.compensator) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Skipping cycle: {e}");
                return CycleOutcome::Skipped;
            }
        };

        if let Some(proximity) = snapshot.proximity {
            self.mode.tick(proximity, now);
        }

        for metric in Metric::ALL {
            if let Some(value) = snapshot.value(metric) {
                self.history.push(metric, value);
            }
        }

        let metric = self.selected();
        let selection = Selection {
            metric,
            fraction: self.history.latest_fraction(metric),
        };

        info!(
            temperature_f = ?snapshot.temperature_f(),
            pressure_hpa = ?snapshot.pressure_hpa,
            humidity = ?snapshot.humidity_percent,
            light_lux = ?snapshot.light_lux,
            mode = ?metric,
            "Update"
        );

        match self.renderer.render(&snapshot, selection) {
            Ok(()) => CycleOutcome::Rendered,
            Err(e) => {
                error!("Display update failed: {e}");
                CycleOutcome::DisplayFailed
            }
        }
    }
}

impl<E, P, C, D> Cycle for Station<E, P, C, D>
where
    E: EnvironmentSensor,
    P: ProximitySensor,
    C: CpuTemperatureSource,
    D: DisplayPanel,
{
    fn run(&mut self, _fired_at: tokio::time::Instant) {
        self.update(std::time::Instant::now());
    }
}
