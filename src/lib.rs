//! Study Timer Library
//!
//! This library provides the core functionality for the Study Timer CLI.
//! It includes:
//! - Interval engine alternating study and break countdowns
//! - Background daemon with IPC server and event subscriptions
//! - Notification mirroring of the timer state
//! - CLI command parsing and display utilities
//! - Type definitions for configuration and state

pub mod cli;
pub mod daemon;
pub mod notification;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    format_hms, ConfigError, IpcRequest, IpcResponse, ResponseData, TimerConfig, TimerPhase,
    TimerState, TimerStatus,
};

pub use daemon::{DaemonOptions, IntervalTimerEngine, SharedEngine, TimerEvent};

pub use notification::{
    LogNotificationSender, MockNotificationSender, NotificationContent, NotificationError,
    NotificationSender, NotificationUpdate,
};
