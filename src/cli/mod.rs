//! CLI module for the Study Timer.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `client`: IPC client for daemon communication
//! - `display`: Output formatting and display logic
//! - `foreground`: Local engine for the `run` command

pub mod client;
pub mod commands;
pub mod display;
pub mod foreground;

pub use client::{IpcClient, Subscription};
pub use commands::{Cli, Commands, IntervalArgs, RunArgs};
pub use display::Display;
