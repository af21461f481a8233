//! Notification error types.

use thiserror::Error;

/// Errors that can occur while delivering notifications.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Failed to show or update the notification.
    #[error("failed to deliver notification: {0}")]
    SendFailed(String),

    /// The notification backend is not available.
    #[error("notification backend is not available")]
    NotAvailable,
}

impl NotificationError {
    /// Returns true if retrying the same delivery may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::SendFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NotificationError::SendFailed("bus closed".to_string());
        assert_eq!(err.to_string(), "failed to deliver notification: bus closed");
        assert_eq!(
            NotificationError::NotAvailable.to_string(),
            "notification backend is not available"
        );
    }

    #[test]
    fn test_is_transient() {
        assert!(NotificationError::SendFailed("x".into()).is_transient());
        assert!(!NotificationError::NotAvailable.is_transient());
    }
}
