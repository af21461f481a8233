//! Core data types for the Study Timer.
//!
//! This module defines the data structures used for:
//! - Timer phase and status
//! - Timer configuration with validation
//! - Timer state owned by the engine
//! - IPC request/response serialization

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// Default study interval (25 minutes)
pub const DEFAULT_STUDY_MINUTES: u32 = 25;

/// Default break interval (5 minutes)
pub const DEFAULT_BREAK_MINUTES: u32 = 5;

// ============================================================================
// TimerPhase
// ============================================================================

/// The interval the countdown is currently measuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    /// Study interval
    #[default]
    Study,
    /// Break interval
    Break,
}

impl TimerPhase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerPhase::Study => "study",
            TimerPhase::Break => "break",
        }
    }

    /// Returns the phase that follows this one.
    pub fn next(&self) -> TimerPhase {
        match self {
            TimerPhase::Study => TimerPhase::Break,
            TimerPhase::Break => TimerPhase::Study,
        }
    }
}

impl fmt::Display for TimerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TimerStatus
// ============================================================================

/// Lifecycle status of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerStatus {
    /// Not counting down; waiting for an explicit start
    #[default]
    Idle,
    /// Counting down with an active tick source
    Running,
    /// Countdown suspended, remaining time preserved
    Paused,
    /// An interval just elapsed (transient, settles to `Idle`)
    Finished,
}

impl TimerStatus {
    /// Returns the string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerStatus::Idle => "idle",
            TimerStatus::Running => "running",
            TimerStatus::Paused => "paused",
            TimerStatus::Finished => "finished",
        }
    }

    /// Returns true if `start()` is accepted in this status.
    pub fn can_start(&self) -> bool {
        matches!(self, TimerStatus::Idle | TimerStatus::Finished)
    }
}

impl fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TimerConfig
// ============================================================================

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A phase was configured with a zero duration
    #[error("{phase} duration must be positive")]
    ZeroDuration {
        /// The offending phase
        phase: TimerPhase,
    },
}

/// Interval lengths for the study timer.
///
/// Immutable once handed to an engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Length of a study interval
    pub study_duration: Duration,
    /// Length of a break interval
    pub break_duration: Duration,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            study_duration: minutes(DEFAULT_STUDY_MINUTES),
            break_duration: minutes(DEFAULT_BREAK_MINUTES),
        }
    }
}

impl TimerConfig {
    /// Creates a configuration from explicit durations.
    pub fn new(study_duration: Duration, break_duration: Duration) -> Self {
        Self {
            study_duration,
            break_duration,
        }
    }

    /// Sets the study interval in minutes.
    pub fn with_study_minutes(self, study_minutes: u32) -> Self {
        self.with_study_duration(minutes(study_minutes))
    }

    /// Sets the break interval in minutes.
    pub fn with_break_minutes(self, break_minutes: u32) -> Self {
        self.with_break_duration(minutes(break_minutes))
    }

    /// Sets the study interval.
    pub fn with_study_duration(mut self, duration: Duration) -> Self {
        self.study_duration = duration;
        self
    }

    /// Sets the break interval.
    pub fn with_break_duration(mut self, duration: Duration) -> Self {
        self.break_duration = duration;
        self
    }

    /// Returns the configured length of `phase`.
    pub fn duration_for(&self, phase: TimerPhase) -> Duration {
        match phase {
            TimerPhase::Study => self.study_duration,
            TimerPhase::Break => self.break_duration,
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroDuration`] if either interval is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for phase in [TimerPhase::Study, TimerPhase::Break] {
            if self.duration_for(phase).is_zero() {
                return Err(ConfigError::ZeroDuration { phase });
            }
        }
        Ok(())
    }
}

fn minutes(m: u32) -> Duration {
    Duration::from_secs(u64::from(m) * 60)
}

// ============================================================================
// TimerState
// ============================================================================

/// Mutable countdown state. One instance per engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    /// Current phase
    pub phase: TimerPhase,
    /// Time left in the current phase
    pub remaining: Duration,
    /// Lifecycle status
    pub status: TimerStatus,
    /// Number of study intervals that ran to completion
    pub completed_study_sessions: u32,
}

impl TimerState {
    /// Creates the initial state: idle at the start of a study interval.
    pub fn new(config: &TimerConfig) -> Self {
        Self {
            phase: TimerPhase::Study,
            remaining: config.study_duration,
            status: TimerStatus::Idle,
            completed_study_sessions: 0,
        }
    }

    /// Returns true if the countdown is active.
    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    /// Returns true if the countdown is paused.
    pub fn is_paused(&self) -> bool {
        self.status == TimerStatus::Paused
    }
}

// ============================================================================
// Formatting
// ============================================================================

/// Formats a duration as `HH:MM:SS`.
///
/// Sub-second precision is truncated. Hours are not wrapped.
///
/// ```
/// use std::time::Duration;
/// use study_timer::types::format_hms;
///
/// assert_eq!(format_hms(Duration::from_secs(25 * 60)), "00:25:00");
/// assert_eq!(format_hms(Duration::from_secs(3725)), "01:02:05");
/// ```
pub fn format_hms(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

// ============================================================================
// IPC Types
// ============================================================================

/// IPC request from client to daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum IpcRequest {
    /// Start counting down the current phase
    Start,
    /// Pause the running countdown
    Pause,
    /// Resume a paused countdown
    Resume,
    /// Stop and reset the current phase
    Stop,
    /// Pause, resume or start depending on the current status
    Toggle,
    /// Query the current status
    Status,
    /// Stream timer events until the client disconnects
    Subscribe,
}

/// Response data for IPC responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseData {
    /// Current phase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<TimerPhase>,
    /// Current status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TimerStatus>,
    /// Remaining seconds in the current phase
    #[serde(rename = "remainingSeconds", skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<u64>,
    /// Completed study sessions
    #[serde(
        rename = "completedStudySessions",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_study_sessions: Option<u32>,
}

impl ResponseData {
    /// Creates response data from timer state.
    pub fn from_timer_state(state: &TimerState) -> Self {
        Self {
            phase: Some(state.phase),
            status: Some(state.status),
            remaining_seconds: Some(state.remaining.as_secs()),
            completed_study_sessions: Some(state.completed_study_sessions),
        }
    }
}

/// IPC response from daemon to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Optional response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl IpcResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<ResponseData>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>, data: Option<ResponseData>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Returns true for a success response.
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

// ============================================================================
// Tests
// ============================================================================
