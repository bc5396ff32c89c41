//! Fixed-period update loop.
//!
//! Exactly one cycle is ever in flight: the next deadline is armed from the
//! completion path of the current cycle, and deadlines sit on the grid
//! `start + k × period` so execution time never accumulates into drift.

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tracing::{info, warn};

/// One poll + render pass.  Runs to completion once started.
pub trait Cycle {
    /// `fired_at` is the deadline this pass was scheduled for.
    fn run(&mut self, fired_at: Instant);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the next deadline.
    Idle,
    /// Executing a cycle.
    Running,
}

/// Deadline arithmetic, kept apart from the timer so it can be checked
/// without a runtime.
#[derive(Debug, Clone)]
pub struct Schedule {
    period: Duration,
    next:   Instant,
}

impl Schedule {
    /// First deadline is `start` itself: the first cycle fires immediately.
    pub fn new(start: Instant, period: Duration) -> Self {
        Self { period, next: start }
    }

    pub fn deadline(&self) -> Instant {
        self.next
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Arm the deadline after the one that just ran, given the cycle finished
    /// at `completed`.  Deadlines already in the past are skipped; returns how
    /// many were.
    pub fn advance(&mut self, completed: Instant) -> u32 {
        self.next += self.period;
        if completed <= self.next {
            return 0;
        }

        let behind = (completed - self.next).as_nanos();
        let period = self.period.as_nanos().max(1);
        let skipped = u32::try_from(behind.div_ceil(period)).unwrap_or(u32::MAX);
        self.next += self.period * skipped;
        skipped
    }
}

/// Drives a [`Cycle`] on a fixed period until shutdown.
pub struct UpdateScheduler<C> {
    cycle:  C,
    period: Duration,
    phase:  Phase,
    cycles: u64,
}

impl<C: Cycle> UpdateScheduler<C> {
    pub fn new(cycle: C, period: Duration) -> Self {
        Self {
            cycle,
            period,
            phase: Phase::Idle,
            cycles: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cycle(&self) -> &C {
        &self.cycle
    }

    /// Completed cycles so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run cycles until `shutdown` resolves, then return the cycle count.
    ///
    /// Shutdown is only observed while idle: a cycle that has started is
    /// allowed to finish so a frame transfer is never cut in half.
    pub async fn run_until<F>(&mut self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut schedule = Schedule::new(Instant::now(), self.period);
        info!("Update cycle every {:?}", self.period);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested; not arming another cycle");
                    break;
                }
                _ = sleep_until(schedule.deadline()) => {}
            }

            self.phase = Phase::Running;
            self.cycle.run(schedule.deadline());
            self.phase = Phase::Idle;
            self.cycles += 1;

            let skipped = schedule.advance(Instant::now());
            if skipped > 0 {
                warn!("Cycle overran its period; skipped {skipped} deadline(s)");
            }
        }

        self.cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    const PERIOD: Duration = Duration::from_secs(10);

    #[test]
    fn deadlines_ignore_execution_time() {
        let start = Instant::now();
        let mut schedule = Schedule::new(start, PERIOD);
        assert_eq!(schedule.deadline(), start);

        for k in 1..=100u32 {
            // Each cycle takes 3s of the 10s budget.
            let completed = schedule.deadline() + Duration::from_secs(3);
            assert_eq!(schedule.advance(completed), 0);
            assert_eq!(schedule.deadline(), start + PERIOD * k);
        }
    }

    #[test]
    fn overrun_skips_to_next_grid_slot() {
        let start = Instant::now();
        let mut schedule = Schedule::new(start, PERIOD);
        assert_eq!(schedule.advance(start + Duration::from_secs(25)), 2);
        assert_eq!(schedule.deadline(), start + Duration::from_secs(30));

        // Finishing exactly on a deadline runs it rather than skipping it.
        assert_eq!(schedule.advance(start + Duration::from_secs(40)), 0);
        assert_eq!(schedule.deadline(), start + Duration::from_secs(40));
    }

    #[derive(Default)]
    struct Recorder {
        fired:   Vec<Instant>,
        started: Vec<Instant>,
    }

    impl Cycle for Recorder {
        fn run(&mut self, fired_at: Instant) {
            self.fired.push(fired_at);
            self.started.push(Instant::now());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hundred_cycles_without_drift() {
        let start = Instant::now();
        let mut scheduler = UpdateScheduler::new(Recorder::default(), PERIOD);
        let cycles = scheduler
            .run_until(tokio::time::sleep(Duration::from_secs(995)))
            .await;

        assert_eq!(cycles, 100);
        let rec = scheduler.cycle();
        for (k, (&fired, &started)) in rec.fired.iter().zip(&rec.started).enumerate() {
            assert_eq!(fired, start + PERIOD * k as u32);
            assert!(started - fired <= Duration::from_millis(1));
        }
        assert_eq!(scheduler.phase(), Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn first_cycle_fires_immediately() {
        let start = Instant::now();
        let mut scheduler = UpdateScheduler::new(Recorder::default(), PERIOD);
        let cycles = scheduler
            .run_until(tokio::time::sleep(Duration::from_secs(1)))
            .await;
        assert_eq!(cycles, 1);
        assert_eq!(scheduler.cycle().fired, vec![start]);
    }

    struct Stopper {
        stop_after: u32,
        finished:   u32,
        signal:     Option<oneshot::Sender<()>>,
    }

    impl Cycle for Stopper {
        fn run(&mut self, _fired_at: Instant) {
            if self.finished + 1 == self.stop_after {
                if let Some(tx) = self.signal.take() {
                    let _ = tx.send(());
                }
            }
            self.finished += 1;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_during_cycle_lets_it_finish() {
        let (tx, rx) = oneshot::channel();
        let stopper = Stopper {
            stop_after: 3,
            finished:   0,
            signal:     Some(tx),
        };
        let mut scheduler = UpdateScheduler::new(stopper, PERIOD);
        let cycles = scheduler
            .run_until(async {
                let _ = rx.await;
            })
            .await;

        assert_eq!(cycles, 3);
        assert_eq!(scheduler.cycle().finished, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_before_start_runs_nothing() {
        let mut scheduler = UpdateScheduler::new(Recorder::default(), PERIOD);
        assert_eq!(scheduler.run_until(async {}).await, 0);
        assert!(scheduler.cycle().fired.is_empty());
    }
}
