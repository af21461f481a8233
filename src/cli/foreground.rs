//! Foreground timer for the `run` command.
//!
//! Owns a local engine instead of talking to the daemon. Each finished
//! interval is followed by an explicit start of the next one until the
//! requested number of intervals has run.

use std::future::Future;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use crate::daemon::timer::{IntervalTimerEngine, SharedEngine, TimerEvent};
use crate::types::TimerConfig;

use super::commands::RunArgs;
use super::display::Display;

/// Runs `args.count` intervals in the foreground, stopping early on Ctrl-C.
///
/// # Errors
///
/// Returns an error if the configuration is invalid.
pub async fn run(args: &RunArgs) -> Result<()> {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {}", e);
        }
    };
    let summary = run_intervals(
        args.intervals.to_config(),
        args.count,
        Display::show_event,
        interrupt,
    )
    .await?;

    println!();
    if summary.interrupted {
        println!("Interrupted after {} interval(s)", summary.intervals);
    }
    println!("{}", Display::session_history(summary.completed_study_sessions));
    Ok(())
}

/// Outcome of a foreground run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Intervals that ran out
    pub intervals: u32,
    /// Study sessions counted by the engine
    pub completed_study_sessions: u32,
    /// Whether the run was cut short
    pub interrupted: bool,
}

/// Drives a local engine through `count` intervals, passing every event to
/// `on_event`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid.
pub async fn run_intervals<E, F>(
    config: TimerConfig,
    count: u32,
    mut on_event: E,
    interrupt: F,
) -> Result<RunSummary>
where
    E: FnMut(&TimerEvent),
    F: Future<Output = ()>,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let engine: SharedEngine =
        IntervalTimerEngine::shared(config, tx).context("Invalid timer configuration")?;

    engine.lock().await.start();

    let mut summary = RunSummary {
        intervals: 0,
        completed_study_sessions: 0,
        interrupted: false,
    };

    tokio::pin!(interrupt);
    loop {
        tokio::select! {
            _ = &mut interrupt => {
                engine.lock().await.stop();
                summary.interrupted = true;
                break;
            }
            event = rx.recv() => {
                let Some(event) = event else { break };
                on_event(&event);

                if let TimerEvent::PhaseCompleted { completed_study_sessions, .. } = event {
                    summary.intervals += 1;
                    summary.completed_study_sessions = completed_study_sessions;
                    if summary.intervals >= count {
                        break;
                    }
                    engine.lock().await.start();
                }
            }
        }
    }

    // Flush whatever the final transition emitted.
    while let Ok(event) = rx.try_recv() {
        on_event(&event);
    }

    tracing::debug!(?summary, "foreground run finished");
    Ok(summary)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;

    use crate::types::TimerPhase;

    fn fast_config() -> TimerConfig {
        TimerConfig::new(Duration::from_secs(2), Duration::from_secs(1))
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_requested_intervals() {
        let mut events = Vec::new();
        let summary = run_intervals(
            fast_config(),
            3,
            |e| events.push(e.clone()),
            std::future::pending(),
        )
        .await
        .unwrap();

        assert_eq!(
            summary,
            RunSummary {
                intervals: 3,
                completed_study_sessions: 2,
                interrupted: false,
            }
        );

        let completions: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                TimerEvent::PhaseCompleted { phase, .. } => Some(*phase),
                _ => None,
            })
            .collect();
        assert_eq!(
            completions,
            vec![TimerPhase::Break, TimerPhase::Study, TimerPhase::Break]
        );

        let starts = events
            .iter()
            .filter(|e| matches!(e, TimerEvent::Started { .. }))
            .count();
        assert_eq!(starts, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_stops_engine() {
        let (tx, rx) = oneshot::channel::<()>();
        let mut events = Vec::new();

        let interrupt = async move {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            let _ = tx.send(());
        };
        let wait = async move {
            let _ = rx.await;
        };

        let (summary, ()) = tokio::join!(
            run_intervals(fast_config(), 5, |e| events.push(e.clone()), wait),
            interrupt
        );
        let summary = summary.unwrap();

        assert!(summary.interrupted);
        assert_eq!(summary.intervals, 0);
        assert!(matches!(
            events.last(),
            Some(TimerEvent::Stopped {
                phase: TimerPhase::Study,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_invalid_config() {
        let config = TimerConfig::new(Duration::ZERO, Duration::from_secs(1));
        let result = run_intervals(config, 1, |_| {}, std::future::pending()).await;
        assert!(result.is_err());
    }
}
