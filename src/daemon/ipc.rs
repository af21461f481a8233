//! IPC Server for the Study Timer.
//!
//! This module provides Unix Domain Socket IPC functionality:
//! - Server that listens on a Unix socket
//! - Request/response handling for timer commands
//! - Event subscription streams for live displays
//!
//! Responses and streamed events are newline-terminated JSON.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{timeout, Duration};

use crate::types::{IpcRequest, IpcResponse, ResponseData, TimerState, TimerStatus};

use super::timer::{SharedEngine, TimerEvent};

// ============================================================================
// Constants
// ============================================================================

/// Default socket path, relative to the home directory
pub const DEFAULT_SOCKET_PATH: &str = ".study-timer/study-timer.sock";

/// Maximum request size in bytes (4KB)
const MAX_REQUEST_SIZE: usize = 4096;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

/// Returns the default socket path under the user's home directory.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_socket_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine the home directory")?;
    Ok(home.join(DEFAULT_SOCKET_PATH))
}

// ============================================================================
// IpcError
// ============================================================================

/// IPC-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Read error
    #[error("Failed to read request: {0}")]
    ReadError(String),

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Request too large
    #[error("Request too large (max {MAX_REQUEST_SIZE} bytes)")]
    RequestTooLarge,

    /// The client closed the connection before sending a request
    #[error("Connection closed by client")]
    ConnectionClosed,
}

// ============================================================================
// IpcServer
// ============================================================================

/// Unix Domain Socket IPC server.
pub struct IpcServer {
    /// Unix socket listener
    listener: UnixListener,
    /// Socket path (for cleanup)
    socket_path: PathBuf,
}

impl IpcServer {
    /// Creates a new IPC server bound to the specified socket path.
    ///
    /// If the socket file already exists, it will be removed before binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound.
    pub fn new(socket_path: &Path) -> Result<Self> {
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .with_context(|| format!("Failed to remove existing socket: {:?}", socket_path))?;
        }

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {:?}", parent))?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind Unix socket: {:?}", socket_path))?;

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Accepts an incoming client connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be accepted.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        Ok(stream)
    }

    /// Receives and deserializes an IPC request from the stream.
    ///
    /// The request ends where the client shuts down its write side, so the
    /// stream is read to EOF. Applies a read timeout to prevent blocking
    /// indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or deserialization fails.
    pub async fn receive_request(stream: &mut UnixStream) -> Result<IpcRequest> {
        let mut buffer = Vec::with_capacity(MAX_REQUEST_SIZE);
        let mut limited = (&mut *stream).take(MAX_REQUEST_SIZE as u64 + 1);

        let read_result = timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            limited.read_to_end(&mut buffer),
        )
        .await;

        let n = match read_result {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(IpcError::ReadError(e.to_string()).into()),
            Err(_) => return Err(IpcError::Timeout.into()),
        };

        if n == 0 {
            return Err(IpcError::ConnectionClosed.into());
        }
        if n > MAX_REQUEST_SIZE {
            return Err(IpcError::RequestTooLarge.into());
        }

        let request: IpcRequest = serde_json::from_slice(&buffer)
            .with_context(|| "Failed to deserialize IPC request")?;

        Ok(request)
    }

    /// Serializes and sends an IPC response to the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub async fn send_response(stream: &mut UnixStream, response: &IpcResponse) -> Result<()> {
        write_json_line(stream, response)
            .await
            .context("Failed to write response")
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

async fn write_json_line<T: Serialize>(stream: &mut UnixStream, value: &T) -> Result<()> {
    let mut json = serde_json::to_vec(value).context("Failed to serialize message")?;
    json.push(b'\n');
    stream.write_all(&json).await?;
    stream.flush().await?;
    Ok(())
}

// ============================================================================
// RequestHandler
// ============================================================================

/// Handles IPC requests by dispatching to the interval engine.
pub struct RequestHandler {
    /// Shared reference to the timer engine
    engine: SharedEngine,
    /// Event stream for subscribers
    events: broadcast::Sender<TimerEvent>,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new(engine: SharedEngine, events: broadcast::Sender<TimerEvent>) -> Self {
        Self { engine, events }
    }

    /// Handles an IPC request and returns the appropriate response.
    ///
    /// A `subscribe` request handled here only returns the current status;
    /// use [`RequestHandler::serve_connection`] to stream events.
    pub async fn handle(&self, request: IpcRequest) -> IpcResponse {
        let mut engine = self.engine.lock().await;

        let applied = match request {
            IpcRequest::Start => engine.start(),
            IpcRequest::Pause => engine.pause(),
            IpcRequest::Resume => engine.resume(),
            IpcRequest::Stop => engine.stop(),
            IpcRequest::Toggle => engine.toggle(),
            IpcRequest::Status | IpcRequest::Subscribe => true,
        };

        let state = engine.state();
        let data = Some(ResponseData::from_timer_state(state));

        if applied {
            IpcResponse::success(success_message(&request, state), data)
        } else {
            tracing::debug!(?request, status = %state.status, "request rejected");
            IpcResponse::error(rejection_message(&request, state), data)
        }
    }

    /// Serves one client connection: reads a request and either answers it
    /// or, for `subscribe`, streams events until the client goes away.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be read or the response
    /// cannot be written.
    pub async fn serve_connection(&self, mut stream: UnixStream) -> Result<()> {
        let request = IpcServer::receive_request(&mut stream).await?;
        tracing::debug!(?request, "request received");

        if request == IpcRequest::Subscribe {
            return self.stream_events(stream).await;
        }

        let response = self.handle(request).await;
        IpcServer::send_response(&mut stream, &response).await
    }

    /// Sends a status snapshot, then every event published afterwards.
    ///
    /// The stream is eventually consistent with the snapshot: events the
    /// engine emitted just before it may still be queued for the fan-out and
    /// arrive after it, already reflected in the snapshot.
    async fn stream_events(&self, mut stream: UnixStream) -> Result<()> {
        // Subscribe first: later events are never lost, earlier ones may repeat.
        let mut events = self.events.subscribe();

        let snapshot = self.handle(IpcRequest::Status).await;
        IpcServer::send_response(&mut stream, &snapshot).await?;

        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Err(e) = write_json_line(&mut stream, &event).await {
                        tracing::debug!("subscriber disconnected: {:#}", e);
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber lagging, events dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }

        Ok(())
    }
}

fn success_message(request: &IpcRequest, state: &TimerState) -> String {
    match request {
        IpcRequest::Start => format!("Started {} interval", state.phase),
        IpcRequest::Pause => "Timer paused".to_string(),
        IpcRequest::Resume => "Timer resumed".to_string(),
        IpcRequest::Stop => "Timer stopped".to_string(),
        IpcRequest::Toggle => match state.status {
            TimerStatus::Paused => "Timer paused".to_string(),
            _ => "Timer running".to_string(),
        },
        IpcRequest::Status | IpcRequest::Subscribe => String::new(),
    }
}

fn rejection_message(request: &IpcRequest, state: &TimerState) -> String {
    match request {
        IpcRequest::Start => format!("Timer is already {}", state.status),
        IpcRequest::Pause => "Timer is not running".to_string(),
        IpcRequest::Resume if state.is_paused() => "Nothing left to resume".to_string(),
        IpcRequest::Resume => "Timer is not paused".to_string(),
        _ => format!("Request not applicable while {}", state.status),
    }
}

// ============================================================================
// Tests
// ============================================================================
