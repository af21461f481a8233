//! IPC Client for communicating with the Study Timer daemon.
//!
//! This module provides:
//! - Unix Domain Socket client
//! - Request/response handling
//! - Connection retry logic
//! - Timeout handling
//! - Event subscriptions for live display

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::UnixStream;
use tokio::time::timeout;

use crate::daemon::ipc::default_socket_path;
use crate::daemon::timer::TimerEvent;
use crate::types::{IpcRequest, IpcResponse};

// ============================================================================
// Constants
// ============================================================================

/// Connection timeout in seconds
const CONNECTION_TIMEOUT_SECS: u64 = 5;

/// Read/write timeout in seconds
const IO_TIMEOUT_SECS: u64 = 5;

/// Maximum retry attempts
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds (base delay, multiplied by attempt number)
const RETRY_DELAY_MS: u64 = 200;

// ============================================================================
// IpcClient
// ============================================================================

/// IPC client for daemon communication.
pub struct IpcClient {
    /// Socket path
    socket_path: PathBuf,
    /// Connection timeout
    timeout: Duration,
}

impl IpcClient {
    /// Creates a new IPC client with the default socket path.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        Ok(Self::with_socket_path(default_socket_path()?))
    }

    /// Creates a new IPC client with a custom socket path.
    pub fn with_socket_path(socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            timeout: Duration::from_secs(CONNECTION_TIMEOUT_SECS),
        }
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &PathBuf {
        &self.socket_path
    }

    /// Sends a start command to the daemon.
    pub async fn start(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Start).await
    }

    /// Sends a pause command to the daemon.
    pub async fn pause(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Pause).await
    }

    /// Sends a resume command to the daemon.
    pub async fn resume(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Resume).await
    }

    /// Sends a stop command to the daemon.
    pub async fn stop(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Stop).await
    }

    /// Sends a toggle command to the daemon.
    pub async fn toggle(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Toggle).await
    }

    /// Sends a status query to the daemon.
    pub async fn status(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Status).await
    }

    /// Subscribes to the daemon's event stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the daemon is unreachable or the initial status
    /// snapshot cannot be read.
    pub async fn subscribe(&self) -> Result<Subscription> {
        let stream = self.connect_and_send(&IpcRequest::Subscribe).await?;
        let mut lines = BufReader::new(stream).lines();

        let snapshot = read_response(&mut lines).await?;
        Ok(Subscription { snapshot, lines })
    }

    /// Sends a request to the daemon with retry logic.
    ///
    /// Only connection failures are retried; a rejection from the daemon is
    /// returned immediately.
    async fn send_request_with_retry(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let mut attempt = 1;
        let stream = loop {
            match self.connect_and_send(request).await {
                Ok(stream) => break stream,
                Err(e) if attempt < MAX_RETRIES => {
                    tracing::warn!("request failed (attempt {}/{}): {:#}", attempt, MAX_RETRIES, e);
                    let delay = Duration::from_millis(RETRY_DELAY_MS * u64::from(attempt));
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        let mut lines = BufReader::new(stream).lines();
        let response = read_response(&mut lines).await?;

        if !response.is_success() {
            anyhow::bail!("{}", response.message);
        }

        Ok(response)
    }

    /// Connects and writes one request, closing the write side.
    async fn connect_and_send(&self, request: &IpcRequest) -> Result<UnixStream> {
        let mut stream = timeout(self.timeout, UnixStream::connect(&self.socket_path))
            .await
            .context("Connection timed out")?
            .with_context(|| {
                format!(
                    "Cannot reach the daemon at {:?}. Start it with 'study-timer daemon'",
                    self.socket_path
                )
            })?;

        let request_json = serde_json::to_vec(request).context("Failed to serialize request")?;

        timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            stream.write_all(&request_json),
        )
        .await
        .context("Write timed out")?
        .context("Failed to send request")?;

        // Shutdown write side to signal end of request
        stream
            .shutdown()
            .await
            .context("Failed to shut down write side")?;

        Ok(stream)
    }
}

async fn read_response(lines: &mut Lines<BufReader<UnixStream>>) -> Result<IpcResponse> {
    let line = timeout(Duration::from_secs(IO_TIMEOUT_SECS), lines.next_line())
        .await
        .context("Read timed out")?
        .context("Failed to receive response")?
        .context("The daemon closed the connection without responding")?;

    serde_json::from_str(&line).context("Failed to parse response")
}

// ============================================================================
// Subscription
// ============================================================================

/// Live event stream from the daemon.
pub struct Subscription {
    /// Status at the moment of subscribing
    pub snapshot: IpcResponse,
    lines: Lines<BufReader<UnixStream>>,
}

impl Subscription {
    /// Waits for the next event. Returns `None` when the daemon closes the
    /// stream.
    ///
    /// # Errors
    ///
    /// Returns an error on a read failure or malformed event.
    pub async fn next_event(&mut self) -> Result<Option<TimerEvent>> {
        match self.lines.next_line().await.context("Failed to read event")? {
            Some(line) => {
                let event = serde_json::from_str(&line).context("Failed to parse event")?;
                Ok(Some(event))
            }
            None => Ok(None),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ResponseData, TimerPhase, TimerStatus};
    use tokio::io::AsyncReadExt;
    use tokio::net::UnixListener;

    fn create_temp_socket_path() -> PathBuf {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.sock");
        // Keep the directory so it's not deleted
        std::mem::forget(dir);
        path
    }

    /// Accepts one connection, checks the request and replies with `lines`.
    fn spawn_mock_server(
        socket_path: &PathBuf,
        expected: IpcRequest,
        lines: Vec<String>,
    ) -> tokio::task::JoinHandle<()> {
        let listener = UnixListener::bind(socket_path).unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();

            let mut buffer = Vec::new();
            stream.read_to_end(&mut buffer).await.unwrap();
            let request: IpcRequest = serde_json::from_slice(&buffer).unwrap();
            assert_eq!(request, expected);

            for line in lines {
                stream.write_all(line.as_bytes()).await.unwrap();
                stream.write_all(b"\n").await.unwrap();
            }
        })
    }

    fn idle_response() -> IpcResponse {
        IpcResponse::success(
            "",
            Some(ResponseData {
                phase: Some(TimerPhase::Study),
                status: Some(TimerStatus::Idle),
                remaining_seconds: Some(1500),
                completed_study_sessions: Some(0),
            }),
        )
    }

    #[test]
    fn test_with_socket_path() {
        let path = PathBuf::from("/tmp/test.sock");
        let client = IpcClient::with_socket_path(path.clone());
        assert_eq!(client.socket_path(), &path);
    }

    #[tokio::test]
    async fn test_connection_failure() {
        let client = IpcClient::with_socket_path(create_temp_socket_path());

        let result = client.status().await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Cannot reach the daemon"));
    }

    #[tokio::test]
    async fn test_status_request() {
        let socket_path = create_temp_socket_path();
        let server = spawn_mock_server(
            &socket_path,
            IpcRequest::Status,
            vec![serde_json::to_string(&idle_response()).unwrap()],
        );

        let client = IpcClient::with_socket_path(socket_path);
        let response = client.status().await.unwrap();
        server.await.unwrap();

        assert_eq!(response, idle_response());
    }

    #[tokio::test]
    async fn test_error_response_becomes_error() {
        let socket_path = create_temp_socket_path();
        let rejection = IpcResponse::error("Timer is not paused", None);
        let server = spawn_mock_server(
            &socket_path,
            IpcRequest::Resume,
            vec![serde_json::to_string(&rejection).unwrap()],
        );

        let client = IpcClient::with_socket_path(socket_path);
        let result = client.resume().await;
        server.await.unwrap();

        assert_eq!(result.unwrap_err().to_string(), "Timer is not paused");
    }

    #[tokio::test]
    async fn test_subscription_reads_snapshot_and_events() {
        let socket_path = create_temp_socket_path();
        let tick = TimerEvent::Tick {
            remaining: Duration::from_secs(1499),
        };
        let server = spawn_mock_server(
            &socket_path,
            IpcRequest::Subscribe,
            vec![
                serde_json::to_string(&idle_response()).unwrap(),
                serde_json::to_string(&tick).unwrap(),
            ],
        );

        let client = IpcClient::with_socket_path(socket_path);
        let mut subscription = client.subscribe().await.unwrap();
        assert_eq!(subscription.snapshot, idle_response());

        assert_eq!(subscription.next_event().await.unwrap(), Some(tick));
        server.await.unwrap();
        assert_eq!(subscription.next_event().await.unwrap(), None);
    }
}
