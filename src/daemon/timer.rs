//! Interval timer engine for the Study Timer.
//!
//! This module provides the core countdown state machine:
//! - State transitions (Idle → Running ⇄ Paused, Running → Finished → Idle)
//! - Countdown driven by a cancellable one-second [`Ticker`]
//! - Study/break alternation with a completed-session counter
//! - Event firing for presentation and notification layers
//!
//! Operations that are invalid for the current status are silent no-ops and
//! return `false`. Callers that need feedback inspect the return value or
//! [`IntervalTimerEngine::state`].

use std::sync::{Arc, Weak};

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};
use tokio::time::Duration;

use super::ticker::{Ticker, TICK_PERIOD};
use crate::types::{ConfigError, TimerConfig, TimerPhase, TimerState, TimerStatus};

/// Engine shared between the tick source and its callers.
pub type SharedEngine = Arc<Mutex<IntervalTimerEngine>>;

// ============================================================================
// TimerEvent
// ============================================================================

/// State-change events for presentation and notification layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TimerEvent {
    /// Countdown started from idle
    Started {
        /// Phase being counted down
        phase: TimerPhase,
        /// Time left when the countdown started
        remaining: Duration,
    },
    /// Countdown paused
    Paused {
        /// Preserved remaining time
        remaining: Duration,
    },
    /// Countdown resumed
    Resumed {
        /// Remaining time at resume
        remaining: Duration,
    },
    /// Countdown stopped and reset
    Stopped {
        /// Phase the engine stays in
        phase: TimerPhase,
        /// Reset remaining time (full phase duration)
        remaining: Duration,
    },
    /// One tick elapsed
    Tick {
        /// Remaining time after the tick
        remaining: Duration,
    },
    /// An interval ran out and the engine moved to the next phase
    PhaseCompleted {
        /// The new phase (not yet started)
        phase: TimerPhase,
        /// Completed study sessions after the transition
        completed_study_sessions: u32,
    },
}

// ============================================================================
// IntervalTimerEngine
// ============================================================================

/// Study/break countdown state machine.
pub struct IntervalTimerEngine {
    config: TimerConfig,
    state: TimerState,
    event_tx: mpsc::UnboundedSender<TimerEvent>,
    /// Active tick source. `Some` exactly while the status is `Running`.
    ticker: Option<Ticker>,
    generation: u64,
    self_ref: Weak<Mutex<IntervalTimerEngine>>,
}

impl IntervalTimerEngine {
    /// Creates a shared engine in the idle state at the start of a study
    /// interval.
    ///
    /// # Errors
    ///
    /// Returns an error if either configured duration is zero.
    pub fn shared(
        config: TimerConfig,
        event_tx: mpsc::UnboundedSender<TimerEvent>,
    ) -> Result<SharedEngine, ConfigError> {
        config.validate()?;
        let state = TimerState::new(&config);

        Ok(Arc::new_cyclic(|self_ref| {
            Mutex::new(Self {
                config,
                state,
                event_tx,
                ticker: None,
                generation: 0,
                self_ref: self_ref.clone(),
            })
        }))
    }

    /// Starts counting down the current phase.
    ///
    /// Accepted only while `Idle` or `Finished`. Must be called from within
    /// a tokio runtime.
    pub fn start(&mut self) -> bool {
        if !self.state.status.can_start() {
            tracing::debug!(status = %self.state.status, "start ignored");
            return false;
        }

        self.state.status = TimerStatus::Running;
        self.arm_ticker();

        tracing::info!(
            phase = %self.state.phase,
            remaining_secs = self.state.remaining.as_secs(),
            "countdown started"
        );
        self.emit(TimerEvent::Started {
            phase: self.state.phase,
            remaining: self.state.remaining,
        });
        true
    }

    /// Pauses the running countdown, keeping the remaining time.
    pub fn pause(&mut self) -> bool {
        if !self.state.is_running() {
            tracing::debug!(status = %self.state.status, "pause ignored");
            return false;
        }

        self.ticker = None;
        self.state.status = TimerStatus::Paused;

        tracing::info!(remaining_secs = self.state.remaining.as_secs(), "countdown paused");
        self.emit(TimerEvent::Paused {
            remaining: self.state.remaining,
        });
        true
    }

    /// Resumes a paused countdown from the preserved remaining time.
    pub fn resume(&mut self) -> bool {
        if !self.state.is_paused() || self.state.remaining.is_zero() {
            tracing::debug!(status = %self.state.status, "resume ignored");
            return false;
        }

        self.state.status = TimerStatus::Running;
        self.arm_ticker();

        tracing::info!(remaining_secs = self.state.remaining.as_secs(), "countdown resumed");
        self.emit(TimerEvent::Resumed {
            remaining: self.state.remaining,
        });
        true
    }

    /// Stops the countdown and resets the current phase to its full length.
    ///
    /// Phase and session counter are kept. Always succeeds.
    pub fn stop(&mut self) -> bool {
        self.ticker = None;
        self.state.status = TimerStatus::Idle;
        self.state.remaining = self.config.duration_for(self.state.phase);

        tracing::info!(phase = %self.state.phase, "countdown stopped");
        self.emit(TimerEvent::Stopped {
            phase: self.state.phase,
            remaining: self.state.remaining,
        });
        true
    }

    /// Pauses when running, resumes when paused, otherwise starts.
    pub fn toggle(&mut self) -> bool {
        match self.state.status {
            TimerStatus::Running => self.pause(),
            TimerStatus::Paused => self.resume(),
            TimerStatus::Idle | TimerStatus::Finished => self.start(),
        }
    }

    /// Returns the current timer state.
    pub fn state(&self) -> &TimerState {
        &self.state
    }

    /// Returns true while a tick source is held.
    pub fn has_tick_source(&self) -> bool {
        self.ticker.is_some()
    }

    /// Entry point for the tick source.
    ///
    /// Returns whether the source should keep ticking.
    pub(crate) fn handle_tick(&mut self, generation: u64, elapsed: Duration) -> bool {
        let current = self.ticker.as_ref().map(Ticker::generation);
        if current != Some(generation) || !self.state.is_running() {
            tracing::trace!(generation, "stale tick ignored");
            return false;
        }

        self.on_tick(elapsed);
        self.state.is_running()
    }

    /// Counts down by `elapsed`, clamping at zero.
    pub(crate) fn on_tick(&mut self, elapsed: Duration) {
        if !self.state.is_running() {
            return;
        }

        self.state.remaining = self.state.remaining.saturating_sub(elapsed);
        self.emit(TimerEvent::Tick {
            remaining: self.state.remaining,
        });

        if self.state.remaining.is_zero() {
            self.on_interval_complete();
        }
    }

    /// Flips the phase after an interval ran out. The next phase is not
    /// started.
    fn on_interval_complete(&mut self) {
        self.ticker = None;

        let finished = self.state.phase;
        if finished == TimerPhase::Study {
            self.state.completed_study_sessions =
                self.state.completed_study_sessions.saturating_add(1);
        }
        self.state.phase = finished.next();
        self.state.remaining = self.config.duration_for(self.state.phase);
        self.state.status = TimerStatus::Finished;

        tracing::info!(
            finished = %finished,
            next = %self.state.phase,
            completed_study_sessions = self.state.completed_study_sessions,
            "interval complete"
        );

        self.state.status = TimerStatus::Idle;
        self.emit(TimerEvent::PhaseCompleted {
            phase: self.state.phase,
            completed_study_sessions: self.state.completed_study_sessions,
        });
    }

    fn arm_ticker(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.ticker = Some(Ticker::spawn(
            self.self_ref.clone(),
            self.generation,
            TICK_PERIOD,
        ));
    }

    fn emit(&self, event: TimerEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::debug!("timer event dropped: no receiver");
        }
    }

    /// Returns a mutable reference to the timer state (for testing).
    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut TimerState {
        &mut self.state
    }
}

// ============================================================================
// Tests
// ============================================================================
