//! Notification content construction.
//!
//! Translates timer events into the text of the single ongoing timer
//! notification. The mapping is platform-independent and fully testable.

use crate::daemon::timer::TimerEvent;
use crate::types::{format_hms, TimerPhase};

/// Title shown on every timer notification.
pub const NOTIFICATION_TITLE: &str = "Study Timer";

/// Text shown while the countdown is paused.
pub const PAUSED_TEXT: &str = "Timer Paused";

/// Text shown after an interval runs out.
pub const FINISHED_TEXT: &str = "Timer Finished";

// ============================================================================
// NotificationAction
// ============================================================================

/// Affordances attached to the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationAction {
    /// Bring the timer display to the foreground.
    OpenTimer,
}

impl NotificationAction {
    /// Returns the button label.
    pub fn label(&self) -> &'static str {
        match self {
            NotificationAction::OpenTimer => "Open timer",
        }
    }

    /// Returns the command that brings the timer display forward.
    pub fn command(&self) -> &'static str {
        match self {
            NotificationAction::OpenTimer => "study-timer watch",
        }
    }
}

// ============================================================================
// NotificationContent
// ============================================================================

/// Content of the ongoing timer notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    /// Title line
    pub title: String,
    /// Body text (countdown, "Timer Paused" or "Timer Finished")
    pub text: String,
    /// Optional second line
    pub subtitle: Option<String>,
    /// Whether the notification stays until dismissed explicitly
    pub ongoing: bool,
    /// Action attached to the notification
    pub action: NotificationAction,
}

impl NotificationContent {
    /// Creates content with the standard title and open action.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            title: NOTIFICATION_TITLE.to_string(),
            text: text.into(),
            subtitle: None,
            ongoing: true,
            action: NotificationAction::OpenTimer,
        }
    }

    /// Sets the subtitle.
    #[must_use]
    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }
}

// ============================================================================
// NotificationUpdate
// ============================================================================

/// What the notification backend should do in response to an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationUpdate {
    /// Show or replace the notification
    Show(NotificationContent),
    /// Remove the notification
    Dismiss,
}

/// Maps a timer event to a notification update.
pub fn render(event: &TimerEvent) -> NotificationUpdate {
    match event {
        TimerEvent::Started { remaining, .. }
        | TimerEvent::Resumed { remaining }
        | TimerEvent::Tick { remaining } => {
            NotificationUpdate::Show(NotificationContent::new(format_hms(*remaining)))
        }
        TimerEvent::Paused { .. } => NotificationUpdate::Show(NotificationContent::new(PAUSED_TEXT)),
        TimerEvent::PhaseCompleted {
            phase,
            completed_study_sessions,
        } => {
            let next = match phase {
                TimerPhase::Study => "Next: study",
                TimerPhase::Break => "Next: break",
            };
            NotificationUpdate::Show(
                NotificationContent::new(FINISHED_TEXT)
                    .subtitle(format!("{next} ({completed_study_sessions} completed)")),
            )
        }
        TimerEvent::Stopped { .. } => NotificationUpdate::Dismiss,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_countdown_text() {
        let update = render(&TimerEvent::Tick {
            remaining: Duration::from_secs(25 * 60 - 1),
        });
        match update {
            NotificationUpdate::Show(content) => {
                assert_eq!(content.title, "Study Timer");
                assert_eq!(content.text, "00:24:59");
                assert!(content.ongoing);
                assert_eq!(content.action, NotificationAction::OpenTimer);
            }
            NotificationUpdate::Dismiss => panic!("expected Show"),
        }
    }

    #[test]
    fn test_started_and_resumed_show_countdown() {
        let started = render(&TimerEvent::Started {
            phase: TimerPhase::Break,
            remaining: Duration::from_secs(300),
        });
        let resumed = render(&TimerEvent::Resumed {
            remaining: Duration::from_secs(300),
        });
        assert_eq!(started, resumed);
        assert_eq!(
            started,
            NotificationUpdate::Show(NotificationContent::new("00:05:00"))
        );
    }

    #[test]
    fn test_paused_text() {
        let update = render(&TimerEvent::Paused {
            remaining: Duration::from_secs(10),
        });
        assert_eq!(
            update,
            NotificationUpdate::Show(NotificationContent::new("Timer Paused"))
        );
    }

    #[test]
    fn test_phase_completed_text() {
        let update = render(&TimerEvent::PhaseCompleted {
            phase: TimerPhase::Break,
            completed_study_sessions: 3,
        });
        assert_eq!(
            update,
            NotificationUpdate::Show(
                NotificationContent::new("Timer Finished").subtitle("Next: break (3 completed)")
            )
        );
    }

    #[test]
    fn test_stopped_dismisses() {
        let update = render(&TimerEvent::Stopped {
            phase: TimerPhase::Study,
            remaining: Duration::from_secs(1500),
        });
        assert_eq!(update, NotificationUpdate::Dismiss);
    }

    #[test]
    fn test_open_action() {
        assert_eq!(NotificationAction::OpenTimer.label(), "Open timer");
        assert_eq!(NotificationAction::OpenTimer.command(), "study-timer watch");
    }
}
