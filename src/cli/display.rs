//! Display utilities for the Study Timer CLI.
//!
//! This module provides formatted output for:
//! - Command results
//! - Status display with session history
//! - Live event rendering for `watch` and `run`

use std::io::{self, Write};

use crate::daemon::timer::TimerEvent;
use crate::types::{format_hms, IpcResponse, ResponseData, TimerPhase, TimerStatus};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the result of a control command (start/pause/resume/stop/toggle).
    pub fn show_command_result(response: &IpcResponse) {
        println!("{}", response.message);

        if let Some(data) = &response.data {
            if let (Some(phase), Some(remaining)) = (data.phase, data.remaining_seconds) {
                println!("  {}: {}", Self::phase_label(phase), format_secs(remaining));
            }
        }
    }

    /// Shows the current timer status.
    pub fn show_status(response: &IpcResponse) {
        println!("Study Timer");
        println!("─────────────────────────────");

        match &response.data {
            Some(data) => {
                for line in Self::status_lines(data) {
                    println!("{}", line);
                }
            }
            None => println!("The timer is not running"),
        }
    }

    /// Builds the status block for `data`.
    pub fn status_lines(data: &ResponseData) -> Vec<String> {
        let mut lines = Vec::new();

        let phase = data.phase.unwrap_or_default();
        let status = data.status.unwrap_or_default();
        lines.push(format!("Phase: {}", Self::phase_label(phase)));
        lines.push(format!("Status: {}", Self::status_label(status)));

        if let Some(remaining) = data.remaining_seconds {
            lines.push(format!("Remaining: {}", format_secs(remaining)));
        }
        if let Some(count) = data.completed_study_sessions {
            lines.push(Self::session_history(count));
        }
        lines.push(format!("Next action: {}", Self::action_label(phase, status)));

        lines
    }

    /// Renders a live event. Ticks redraw the current line in place.
    pub fn show_event(event: &TimerEvent) {
        match event {
            TimerEvent::Tick { remaining } => {
                print!("\r  {}", format_hms(*remaining));
                let _ = io::stdout().flush();
            }
            other => {
                println!();
                for line in Self::event_lines(other) {
                    println!("{}", line);
                }
            }
        }
    }

    /// Describes a non-tick event.
    pub fn event_lines(event: &TimerEvent) -> Vec<String> {
        match event {
            TimerEvent::Started { phase, remaining } => vec![format!(
                "> {} started ({})",
                Self::phase_label(*phase),
                format_hms(*remaining)
            )],
            TimerEvent::Paused { remaining } => {
                vec![format!("|| Paused at {}", format_hms(*remaining))]
            }
            TimerEvent::Resumed { remaining } => {
                vec![format!("> Resumed at {}", format_hms(*remaining))]
            }
            TimerEvent::Stopped { phase, remaining } => vec![format!(
                "[] Stopped, {} reset to {}",
                Self::phase_label(*phase).to_lowercase(),
                format_hms(*remaining)
            )],
            TimerEvent::Tick { remaining } => vec![format_hms(*remaining)],
            TimerEvent::PhaseCompleted {
                phase,
                completed_study_sessions,
            } => vec![
                format!("* {} finished", Self::phase_label(phase.next())),
                format!("  {}", Self::session_history(*completed_study_sessions)),
                format!(
                    "  Next action: {}",
                    Self::action_label(*phase, TimerStatus::Idle)
                ),
            ],
        }
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    /// Returns the session history line.
    pub fn session_history(completed: u32) -> String {
        format!("Session History: ({} completed)", completed)
    }

    /// Returns the label of the primary action for the given state.
    pub fn action_label(phase: TimerPhase, status: TimerStatus) -> &'static str {
        match (status, phase) {
            (TimerStatus::Running, _) => "Pause",
            (TimerStatus::Paused, _) => "Resume",
            (_, TimerPhase::Study) => "Start Study",
            (_, TimerPhase::Break) => "Start Break",
        }
    }

    fn phase_label(phase: TimerPhase) -> &'static str {
        match phase {
            TimerPhase::Study => "Study",
            TimerPhase::Break => "Break",
        }
    }

    fn status_label(status: TimerStatus) -> &'static str {
        match status {
            TimerStatus::Idle => "Idle",
            TimerStatus::Running => "Running",
            TimerStatus::Paused => "Paused",
            TimerStatus::Finished => "Finished",
        }
    }
}

fn format_secs(seconds: u64) -> String {
    format_hms(std::time::Duration::from_secs(seconds))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    mod label_tests {
        use super::*;

        #[test]
        fn test_session_history() {
            assert_eq!(Display::session_history(0), "Session History: (0 completed)");
            assert_eq!(Display::session_history(7), "Session History: (7 completed)");
        }

        #[test]
        fn test_action_label() {
            assert_eq!(
                Display::action_label(TimerPhase::Study, TimerStatus::Running),
                "Pause"
            );
            assert_eq!(
                Display::action_label(TimerPhase::Break, TimerStatus::Paused),
                "Resume"
            );
            assert_eq!(
                Display::action_label(TimerPhase::Study, TimerStatus::Idle),
                "Start Study"
            );
            assert_eq!(
                Display::action_label(TimerPhase::Break, TimerStatus::Finished),
                "Start Break"
            );
        }
    }

    mod status_tests {
        use super::*;

        #[test]
        fn test_status_lines() {
            let data = ResponseData {
                phase: Some(TimerPhase::Break),
                status: Some(TimerStatus::Idle),
                remaining_seconds: Some(300),
                completed_study_sessions: Some(1),
            };

            assert_eq!(
                Display::status_lines(&data),
                vec![
                    "Phase: Break",
                    "Status: Idle",
                    "Remaining: 00:05:00",
                    "Session History: (1 completed)",
                    "Next action: Start Break",
                ]
            );
        }

        #[test]
        fn test_status_lines_partial_data() {
            let data = ResponseData {
                status: Some(TimerStatus::Running),
                ..ResponseData::default()
            };

            let lines = Display::status_lines(&data);
            assert_eq!(lines.len(), 3);
            assert_eq!(lines[2], "Next action: Pause");
        }
    }

    mod event_tests {
        use super::*;

        #[test]
        fn test_phase_completed_lines() {
            let lines = Display::event_lines(&TimerEvent::PhaseCompleted {
                phase: TimerPhase::Break,
                completed_study_sessions: 2,
            });

            assert_eq!(
                lines,
                vec![
                    "* Study finished",
                    "  Session History: (2 completed)",
                    "  Next action: Start Break",
                ]
            );
        }

        #[test]
        fn test_pause_and_stop_lines() {
            assert_eq!(
                Display::event_lines(&TimerEvent::Paused {
                    remaining: Duration::from_secs(65)
                }),
                vec!["|| Paused at 00:01:05"]
            );
            assert_eq!(
                Display::event_lines(&TimerEvent::Stopped {
                    phase: TimerPhase::Study,
                    remaining: Duration::from_secs(1500)
                }),
                vec!["[] Stopped, study reset to 00:25:00"]
            );
        }

        #[test]
        fn test_started_line() {
            assert_eq!(
                Display::event_lines(&TimerEvent::Started {
                    phase: TimerPhase::Break,
                    remaining: Duration::from_secs(300)
                }),
                vec!["> Break started (00:05:00)"]
            );
        }
    }
}
