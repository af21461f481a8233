//! Notification mirroring for the background daemon.
//!
//! Every timer event is rendered into the single ongoing "Study Timer"
//! notification. This module includes:
//!
//! - Event → content mapping (`content`)
//! - The [`NotificationSender`] backend trait
//! - A tracing-backed sender and a recording mock
//! - A dedicated renderer thread fed over a crossbeam channel
//!
//! # Example
//!
//! ```rust,ignore
//! use study_timer::notification::{spawn_notification_thread, LogNotificationSender};
//!
//! let (tx, rx) = crossbeam_channel::unbounded();
//! let handle = spawn_notification_thread(rx, LogNotificationSender)?;
//!
//! // From the daemon's event fan-out task
//! tx.send(event)?;
//! ```

pub mod content;
pub mod error;

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crossbeam_channel::Receiver;

use crate::daemon::timer::TimerEvent;

pub use content::{
    render, NotificationAction, NotificationContent, NotificationUpdate, NOTIFICATION_TITLE,
};
pub use error::NotificationError;

// ============================================================================
// NotificationSender
// ============================================================================

/// Backend that displays the timer notification.
pub trait NotificationSender {
    /// Shows the notification, replacing any previous content.
    fn show(&self, content: &NotificationContent) -> Result<(), NotificationError>;

    /// Removes the notification.
    fn dismiss(&self) -> Result<(), NotificationError>;

    /// Returns whether the backend can display notifications.
    fn is_available(&self) -> bool {
        true
    }
}

impl<T: NotificationSender + ?Sized> NotificationSender for Arc<T> {
    fn show(&self, content: &NotificationContent) -> Result<(), NotificationError> {
        (**self).show(content)
    }

    fn dismiss(&self) -> Result<(), NotificationError> {
        (**self).dismiss()
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

/// Applies a rendered update to a sender.
pub fn deliver<S: NotificationSender + ?Sized>(
    sender: &S,
    update: &NotificationUpdate,
) -> Result<(), NotificationError> {
    if !sender.is_available() {
        return Err(NotificationError::NotAvailable);
    }
    match update {
        NotificationUpdate::Show(content) => sender.show(content),
        NotificationUpdate::Dismiss => sender.dismiss(),
    }
}

// ============================================================================
// LogNotificationSender
// ============================================================================

/// Sender that writes the notification to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotificationSender;

impl NotificationSender for LogNotificationSender {
    fn show(&self, content: &NotificationContent) -> Result<(), NotificationError> {
        tracing::info!(
            title = %content.title,
            subtitle = content.subtitle.as_deref().unwrap_or(""),
            action = content.action.command(),
            "{}",
            content.text
        );
        Ok(())
    }

    fn dismiss(&self) -> Result<(), NotificationError> {
        tracing::info!("notification dismissed");
        Ok(())
    }
}

// ============================================================================
// MockNotificationSender
// ============================================================================

/// Sender that records updates for tests.
#[derive(Debug)]
pub struct MockNotificationSender {
    updates: Mutex<Vec<NotificationUpdate>>,
    available: AtomicBool,
    should_fail: AtomicBool,
}

impl MockNotificationSender {
    /// Creates an available mock that records every update.
    #[must_use]
    pub fn new() -> Self {
        Self {
            updates: Mutex::new(Vec::new()),
            available: AtomicBool::new(true),
            should_fail: AtomicBool::new(false),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Returns all recorded updates.
    #[must_use]
    pub fn updates(&self) -> Vec<NotificationUpdate> {
        self.updates.lock().map(|u| u.clone()).unwrap_or_default()
    }

    /// Returns the text of the last shown notification.
    #[must_use]
    pub fn last_text(&self) -> Option<String> {
        self.updates().into_iter().rev().find_map(|u| match u {
            NotificationUpdate::Show(content) => Some(content.text),
            NotificationUpdate::Dismiss => None,
        })
    }

    fn record(&self, update: NotificationUpdate) -> Result<(), NotificationError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(NotificationError::SendFailed("mock failure".to_string()));
        }
        if let Ok(mut updates) = self.updates.lock() {
            updates.push(update);
        }
        Ok(())
    }
}

impl Default for MockNotificationSender {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSender for MockNotificationSender {
    fn show(&self, content: &NotificationContent) -> Result<(), NotificationError> {
        self.record(NotificationUpdate::Show(content.clone()))
    }

    fn dismiss(&self) -> Result<(), NotificationError> {
        self.record(NotificationUpdate::Dismiss)
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Renderer thread
// ============================================================================

/// Spawns a thread that renders every received event through `sender`.
///
/// The thread exits once all senders of `events` are dropped.
///
/// # Errors
///
/// Returns an error if the OS refuses to create the thread.
pub fn spawn_notification_thread<S>(
    events: Receiver<TimerEvent>,
    sender: S,
) -> io::Result<JoinHandle<()>>
where
    S: NotificationSender + Send + 'static,
{
    thread::Builder::new()
        .name("notification".to_string())
        .spawn(move || {
            for event in events.iter() {
                let update = render(&event);
                match deliver(&sender, &update) {
                    Ok(()) => {}
                    Err(e) if e.is_transient() => {
                        tracing::warn!("notification update failed: {}", e);
                    }
                    Err(e) => tracing::debug!("notification skipped: {}", e),
                }
            }
            tracing::debug!("notification thread finished");
        })
}

// ============================================================================
// Tests
// ============================================================================
