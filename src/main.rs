//! Study Timer CLI
//!
//! Alternates study and break intervals:
//! - 25 minutes of study
//! - 5 minutes of break
//!
//! A background daemon owns the timer; the other commands talk to it over a
//! Unix socket. `run` drives a local timer without a daemon.

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser};

use study_timer::cli::{self, Cli, Commands, Display, IpcClient};
use study_timer::daemon::ipc::default_socket_path;
use study_timer::daemon::service::{self, DaemonOptions};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    let socket = cli.socket;

    match cli.command {
        Some(Commands::Start) => {
            let response = client(socket)?.start().await?;
            Display::show_command_result(&response);
        }
        Some(Commands::Pause) => {
            let response = client(socket)?.pause().await?;
            Display::show_command_result(&response);
        }
        Some(Commands::Resume) => {
            let response = client(socket)?.resume().await?;
            Display::show_command_result(&response);
        }
        Some(Commands::Stop) => {
            let response = client(socket)?.stop().await?;
            Display::show_command_result(&response);
        }
        Some(Commands::Toggle) => {
            let response = client(socket)?.toggle().await?;
            Display::show_command_result(&response);
        }
        Some(Commands::Status) => {
            let response = client(socket)?.status().await?;
            Display::show_status(&response);
        }
        Some(Commands::Watch) => {
            watch(client(socket)?).await?;
        }
        Some(Commands::Daemon(args)) => {
            let socket_path = match socket {
                Some(path) => path,
                None => default_socket_path()?,
            };
            service::run(DaemonOptions {
                config: args.to_config(),
                socket_path,
            })
            .await?;
        }
        Some(Commands::Run(args)) => {
            cli::foreground::run(&args).await?;
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Builds a client for the given socket, or the default one.
fn client(socket: Option<PathBuf>) -> Result<IpcClient> {
    match socket {
        Some(path) => Ok(IpcClient::with_socket_path(path)),
        None => IpcClient::new(),
    }
}

/// Follows the daemon's events until Ctrl-C or the daemon goes away.
async fn watch(client: IpcClient) -> Result<()> {
    let mut subscription = client.subscribe().await?;
    Display::show_status(&subscription.snapshot);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = subscription.next_event() => match event? {
                Some(event) => Display::show_event(&event),
                None => {
                    println!();
                    println!("The daemon closed the stream");
                    break;
                }
            },
        }
    }

    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_status() {
        let cli = Cli::parse_from(["study-timer", "status"]);
        assert!(matches!(cli.command, Some(Commands::Status)));
    }

    #[test]
    fn test_cli_parse_daemon_with_socket() {
        let cli = Cli::parse_from(["study-timer", "--socket", "/tmp/s.sock", "daemon", "-s", "1"]);
        assert_eq!(cli.socket, Some(PathBuf::from("/tmp/s.sock")));
        match cli.command {
            Some(Commands::Daemon(args)) => assert_eq!(args.study_minutes, 1),
            _ => panic!("Expected Daemon command"),
        }
    }

    #[test]
    fn test_client_uses_explicit_socket() {
        let path = PathBuf::from("/tmp/explicit.sock");
        let client = client(Some(path.clone())).unwrap();
        assert_eq!(client.socket_path(), &path);
    }

    #[test]
    fn test_cli_debug_assert() {
        Cli::command().debug_assert();
    }
}
