//! Background daemon for the Study Timer.
//!
//! Owns the single shared engine and wires it to its observers:
//! - IPC server for commands and event subscriptions
//! - Notification thread mirroring every event
//!
//! ```text
//! engine ─mpsc─▶ fan-out ─┬─crossbeam─▶ notification thread
//!                         └─broadcast─▶ subscribers (watch)
//! ```

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{broadcast, mpsc};
use tokio::time::{timeout, Duration};

use crate::notification::{spawn_notification_thread, LogNotificationSender, NotificationSender};
use crate::types::TimerConfig;

use super::ipc::{IpcServer, RequestHandler};
use super::timer::IntervalTimerEngine;

/// Capacity of the subscriber broadcast buffer
const EVENT_BUFFER: usize = 64;

/// How long shutdown waits for queued events to reach the notification thread
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Options for running the daemon.
#[derive(Debug, Clone)]
pub struct DaemonOptions {
    /// Interval lengths for the shared engine
    pub config: TimerConfig,
    /// Socket to listen on
    pub socket_path: PathBuf,
}

/// Runs the daemon until Ctrl-C, logging notifications through tracing.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the socket cannot be
/// bound.
pub async fn run(options: DaemonOptions) -> Result<()> {
    serve(options, LogNotificationSender, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {}", e);
        }
    })
    .await
}

/// Runs the daemon until `shutdown` completes.
///
/// On shutdown the engine is stopped, which releases its tick source and
/// dismisses the notification, and the socket file is removed.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the notification thread
/// cannot be spawned, or the socket cannot be bound.
pub async fn serve<S, F>(options: DaemonOptions, notifier: S, shutdown: F) -> Result<()>
where
    S: NotificationSender + Send + 'static,
    F: Future<Output = ()>,
{
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let engine = IntervalTimerEngine::shared(options.config.clone(), event_tx)
        .context("Invalid timer configuration")?;

    let (notify_tx, notify_rx) = crossbeam_channel::unbounded();
    let notification_thread = spawn_notification_thread(notify_rx, notifier)
        .context("Failed to spawn notification thread")?;

    let (broadcast_tx, _) = broadcast::channel(EVENT_BUFFER);
    let fanout_tx = broadcast_tx.clone();
    let mut fanout = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if notify_tx.send(event.clone()).is_err() {
                tracing::warn!("notification thread is gone");
            }
            // No subscribers is fine.
            let _ = fanout_tx.send(event);
        }
    });

    let server = IpcServer::new(&options.socket_path)?;
    let handler = Arc::new(RequestHandler::new(Arc::clone(&engine), broadcast_tx));

    tracing::info!(
        socket = %server.socket_path().display(),
        study_secs = options.config.study_duration.as_secs(),
        break_secs = options.config.break_duration.as_secs(),
        "daemon listening"
    );

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("shutdown requested");
                break;
            }
            accepted = server.accept() => match accepted {
                Ok(stream) => {
                    let handler = Arc::clone(&handler);
                    tokio::spawn(async move {
                        if let Err(e) = handler.serve_connection(stream).await {
                            tracing::warn!("connection error: {:#}", e);
                        }
                    });
                }
                Err(e) => tracing::warn!("{:#}", e),
            },
        }
    }

    drop(server);
    engine.lock().await.stop();
    drop(handler);
    drop(engine);

    // Subscriber connections may still hold the engine; give the fan-out a
    // moment to flush, then cut it off.
    if timeout(SHUTDOWN_GRACE, &mut fanout).await.is_err() {
        fanout.abort();
        let _ = fanout.await;
    }
    if notification_thread.join().is_err() {
        tracing::warn!("notification thread panicked");
    }

    tracing::info!("daemon stopped");
    Ok(())
}
