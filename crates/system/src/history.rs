use enviro_core::Metric;
use std::collections::VecDeque;

/// Value every slot starts with. Keeps `max - min + 1 >= 1` on a cold start.
pub const HISTORY_SENTINEL: f32 = 1.0;

/// Fixed-width sliding window of recent values for every [`Metric`].
///
/// Capacity normally equals the display width, one sample per pixel column.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    series:   [VecDeque<f32>; Metric::ALL.len()],
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let filled = || {
            let mut samples = VecDeque::with_capacity(capacity + 1);
            samples.extend(std::iter::repeat(HISTORY_SENTINEL).take(capacity));
            samples
        };
        Self {
            series: std::array::from_fn(|_| filled()),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append `value`, dropping the oldest one.
    pub fn push(&mut self, metric: Metric, value: f32) {
        let samples = &mut self.series[metric.index()];
        samples.push_back(value);
        if samples.len() > self.capacity {
            samples.pop_front();
        }
    }

    /// Buffered values, oldest first.
    pub fn values(&self, metric: Metric) -> impl Iterator<Item = f32> + '_ {
        self.series[metric.index()].iter().copied()
    }

    pub fn min_max(&self, metric: Metric) -> (f32, f32) {
        self.values(metric)
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Every value scaled as `(v - min + 1) / (max - min + 1)`.
    pub fn normalized(&self, metric: Metric) -> Vec<f32> {
        let (min, max) = self.min_max(metric);
        let range = max - min + 1.0;
        self.values(metric).map(|v| (v - min + 1.0) / range).collect()
    }

    /// Scaled position of the newest value within the window.
    pub fn latest_fraction(&self, metric: Metric) -> f32 {
        let (min, max) = self.min_max(metric);
        let latest = self.series[metric.index()]
            .back()
            .copied()
            .unwrap_or(HISTORY_SENTINEL);
        (latest - min + 1.0) / (max - min + 1.0)
    }
}
