//! Periodic tick source for the interval engine.
//!
//! A [`Ticker`] is a tokio task that calls back into the engine once per
//! period. It only holds a weak reference to the engine, and dropping the
//! `Ticker` aborts the task, so the engine releases its tick source simply by
//! dropping it.

use std::sync::Weak;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

use super::timer::IntervalTimerEngine;

/// Interval between ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

// ============================================================================
// Ticker
// ============================================================================

/// Handle to a running tick task.
#[derive(Debug)]
pub struct Ticker {
    /// Identifies this source to the engine; ticks carrying an old
    /// generation are discarded.
    generation: u64,
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Spawns a tick task on the current tokio runtime.
    ///
    /// The first tick fires one `period` after spawning.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub(crate) fn spawn(
        engine: Weak<Mutex<IntervalTimerEngine>>,
        generation: u64,
        period: Duration,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticks.tick().await;

                let Some(engine) = engine.upgrade() else {
                    break;
                };
                let mut engine = engine.lock().await;
                if !engine.handle_tick(generation, period) {
                    break;
                }
            }

            tracing::trace!(generation, "tick source finished");
        });

        Self { generation, handle }
    }

    /// Returns the generation this source was spawned with.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
