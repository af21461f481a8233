//! Daemon module for the Study Timer.
//!
//! This module contains the core engine and the background service:
//! - `timer`: Interval engine with state transitions and countdown logic
//! - `ticker`: Cancellable one-second tick source
//! - `ipc`: Unix socket server and request handling
//! - `service`: Daemon main loop wiring engine, IPC and notifications

pub mod ipc;
pub mod service;
pub mod ticker;
pub mod timer;

pub use service::DaemonOptions;
pub use timer::{IntervalTimerEngine, SharedEngine, TimerEvent};
