//! Command definitions for the Study Timer CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::types::{TimerConfig, DEFAULT_BREAK_MINUTES, DEFAULT_STUDY_MINUTES};

// ============================================================================
// CLI Structure
// ============================================================================

/// Study Timer CLI - alternate study and break intervals
#[derive(Parser, Debug)]
#[command(
    name = "study-timer",
    version,
    about = "Study/break interval timer",
    long_about = "A countdown timer alternating between study and break intervals.\n\
                  A background daemon owns the timer and mirrors it in a notification;\n\
                  this CLI controls and displays it.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Daemon socket path (defaults to ~/.study-timer/study-timer.sock)
    #[arg(long, global = true, value_name = "PATH")]
    pub socket: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start counting down the current interval
    Start,

    /// Pause the running timer
    Pause,

    /// Resume a paused timer
    Resume,

    /// Stop the timer and reset the current interval
    Stop,

    /// Pause, resume or start depending on the timer state
    Toggle,

    /// Show current timer status
    Status,

    /// Follow the timer live
    Watch,

    /// Run the background daemon that owns the timer
    Daemon(IntervalArgs),

    /// Run the timer in the foreground without a daemon
    Run(RunArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Interval Arguments
// ============================================================================

/// Interval lengths
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct IntervalArgs {
    /// Study duration in minutes (1-120)
    #[arg(
        short,
        long = "study",
        default_value_t = DEFAULT_STUDY_MINUTES,
        value_parser = clap::value_parser!(u32).range(1..=120)
    )]
    pub study_minutes: u32,

    /// Break duration in minutes (1-60)
    #[arg(
        short,
        long = "break",
        default_value_t = DEFAULT_BREAK_MINUTES,
        value_parser = clap::value_parser!(u32).range(1..=60)
    )]
    pub break_minutes: u32,
}

impl Default for IntervalArgs {
    fn default() -> Self {
        Self {
            study_minutes: DEFAULT_STUDY_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
        }
    }
}

impl IntervalArgs {
    /// Converts the arguments into a timer configuration.
    pub fn to_config(&self) -> TimerConfig {
        TimerConfig::default()
            .with_study_minutes(self.study_minutes)
            .with_break_minutes(self.break_minutes)
    }
}

/// Arguments for the foreground run command
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    #[command(flatten)]
    pub intervals: IntervalArgs,

    /// Number of intervals to run before exiting (1-100)
    #[arg(
        short = 'n',
        long = "intervals",
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..=100)
    )]
    pub count: u32,
}

// ============================================================================
// Tests
// ============================================================================
