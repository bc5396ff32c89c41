//! Text layout and frame transfer for the station's panel.
//!
//! Every cycle the whole canvas is cleared and redrawn, then pushed to the
//! panel in one transfer. A failed transfer leaves the previous frame on the
//! glass; nothing is retried until the next cycle.

pub mod canvas;
pub mod colors;
pub mod panel;

pub use canvas::DisplayCanvas;
pub use colors::Color;
pub use panel::{FramebufferPanel, Rotation};

use chrono::{DateTime, Local};
use embedded_graphics::{
    mono_font::MonoTextStyle,
    prelude::*,
    text::{Baseline, Text},
};
use enviro_config::{DisplayConfig, Layout};
use enviro_core::{DisplayPanel, Metric, Result, Snapshot};
use profont::PROFONT_12_POINT;

/// Vertical distance between text lines, in pixels.
pub const LINE_PITCH: i32 = 25;

/// Timestamp format on the last line: `DD/MM/YY HH:MM:SS`.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%y %H:%M:%S";

/// The metric picked with the proximity tap and where its newest value sits
/// within its history window (`0..=1`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub metric:   Metric,
    pub fraction: f32,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            metric:   Metric::TemperatureC,
            fraction: 1.0,
        }
    }
}

/// Owns the canvas and the panel it is shown on.
pub struct DisplayRenderer<D> {
    panel:      D,
    canvas:     DisplayCanvas,
    background: Color,
    foreground: Color,
    layout:     Layout,
}

impl<D: DisplayPanel> DisplayRenderer<D> {
    pub fn new(panel: D, background: Color, foreground: Color, layout: Layout) -> Self {
        let (width, height) = panel.size();
        Self {
            canvas: DisplayCanvas::new(width, height, background.to_rgb565()),
            panel,
            background,
            foreground,
            layout,
        }
    }

    /// Build from the `[display]` config section.  Invalid colour strings fall
    /// back to the default palette.
    pub fn from_config(panel: D, cfg: &DisplayConfig) -> Self {
        let background = Color::from_hex(&cfg.background).unwrap_or_else(|| {
            tracing::warn!("Invalid background colour '{}'; using default", cfg.background);
            Color::BACKGROUND
        });
        let foreground = Color::from_hex(&cfg.foreground).unwrap_or_else(|| {
            tracing::warn!("Invalid foreground colour '{}'; using default", cfg.foreground);
            Color::FOREGROUND
        });
        Self::new(panel, background, foreground, cfg.layout)
    }

    /// Logical width of the canvas; one history sample per column.
    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    pub fn canvas(&self) -> &DisplayCanvas {
        &self.canvas
    }

    pub fn panel(&self) -> &D {
        &self.panel
    }

    /// Redraw the canvas for `snapshot` and push it to the panel.
    pub fn render(&mut self, snapshot: &Snapshot, selection: Selection) -> Result<()> {
        let _ = self.canvas.clear(self.background.to_rgb565());

        match self.layout {
            Layout::Summary => {
                let lines = summary_lines(snapshot);
                for (row, line) in lines.iter().enumerate() {
                    self.draw_line(row, line, self.foreground);
                }
            }
            Layout::Metric => {
                let [value, stamp] = metric_lines(snapshot, selection.metric);
                // Newest value near the window's max is drawn brightest.
                let dim = self.background.mix(self.foreground, 0.35);
                let color = dim.mix(self.foreground, selection.fraction);
                self.draw_line(0, &value, color);
                self.draw_line(1, &stamp, self.foreground);
            }
        }

        self.panel.transfer(self.canvas.pixels())
    }

    fn draw_line(&mut self, row: usize, text: &str, color: Color) {
        let style = MonoTextStyle::new(&PROFONT_12_POINT, color.to_rgb565());
        let origin = Point::new(0, row as i32 * LINE_PITCH);
        let _ = Text::with_baseline(text, origin, style, Baseline::Top).draw(&mut self.canvas);
    }
}

fn reading(value: Option<f32>) -> String {
    match value {
        Some(v) => format!("{v:.1}"),
        None => "--".to_string(),
    }
}

pub fn format_timestamp(time: &DateTime<Local>) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Temperature + pressure, humidity, timestamp.
pub fn summary_lines(snapshot: &Snapshot) -> [String; 3] {
    [
        format!(
            "{}F {}hPa",
            reading(snapshot.temperature_f()),
            reading(snapshot.pressure_hpa)
        ),
        format!("humidity: {} %", reading(snapshot.humidity_percent)),
        format_timestamp(&snapshot.taken_at),
    ]
}

/// Selected metric, timestamp.
pub fn metric_lines(snapshot: &Snapshot, metric: Metric) -> [String; 2] {
    [
        format!(
            "{}: {} {}",
            metric.label(),
            reading(snapshot.value(metric)),
            metric.unit()
        ),
        format_timestamp(&snapshot.taken_at),
    ]
}
