//! Proximity sensor used as a touch-free button.
//!
//! A hand held over the sensor pushes the raw proximity count above a
//! threshold; each accepted tap advances the selected metric by one. A hand
//! that lingers across several polls only counts once per debounce window.

use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_PROXIMITY_THRESHOLD: u16 = 1500;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct ModeController {
    index:       usize,
    modes:       usize,
    threshold:   u16,
    debounce:    Duration,
    last_toggle: Option<Instant>,
}

impl ModeController {
    pub fn new(modes: usize, threshold: u16, debounce: Duration) -> Self {
        Self {
            index: 0,
            modes: modes.max(1),
            threshold,
            debounce,
            last_toggle: None,
        }
    }

    /// Feed one proximity reading taken at `now`; returns the selected index.
    pub fn tick(&mut self, proximity: u16, now: Instant) -> usize {
        if proximity <= self.threshold {
            return self.index;
        }

        let debounced = match self.last_toggle {
            Some(last) => now.saturating_duration_since(last) > self.debounce,
            None => true,
        };

        if debounced {
            self.index = (self.index + 1) % self.modes;
            self.last_toggle = Some(now);
            debug!(mode = self.index, proximity, "mode advanced");
        }
        self.index
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn modes(&self) -> usize {
        self.modes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> ModeController {
        ModeController::new(5, DEFAULT_PROXIMITY_THRESHOLD, DEFAULT_DEBOUNCE)
    }

    #[test]
    fn debounced_tap_sequence() {
        let mut mode = controller();
        let t0 = Instant::now();

        assert_eq!(mode.tick(2000, t0), 1);
        assert_eq!(mode.tick(2000, t0 + Duration::from_millis(200)), 1);
        assert_eq!(mode.tick(2000, t0 + Duration::from_millis(600)), 2);
    }

    #[test]
    fn below_threshold_never_advances() {
        let mut mode = controller();
        let t0 = Instant::now();
        for s in 0..10 {
            assert_eq!(mode.tick(1500, t0 + Duration::from_secs(s)), 0);
            assert_eq!(mode.tick(12, t0 + Duration::from_secs(s)), 0);
        }
    }

    #[test]
    fn full_cycle_returns_to_start() {
        let mut mode = controller();
        let t0 = Instant::now();
        let mut index = mode.index();
        for k in 0..5 {
            index = mode.tick(2000, t0 + Duration::from_secs(k));
        }
        assert_eq!(index, 0);
    }

    #[test]
    fn held_hand_counts_once_per_window() {
        let mut mode = controller();
        let t0 = Instant::now();
        // Held for 450ms, polled every 50ms: one advance only.
        for ms in (0..=450).step_by(50) {
            mode.tick(3000, t0 + Duration::from_millis(ms));
        }
        assert_eq!(mode.index(), 1);
    }
}
