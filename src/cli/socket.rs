//! Unix Domain Socket communication for session control

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;
use tokio::time::timeout;

use super::signals::{SessionCommand, SessionRequest};
use crate::domain::session::MemoState;

/// How long a client waits for the session loop to process a toggle
const REPLY_TIMEOUT: StdDuration = StdDuration::from_secs(5);

/// Socket path resolver
#[derive(Debug, Clone)]
pub struct SocketPath {
    path: PathBuf,
}

impl SocketPath {
    /// Create socket path, preferring XDG_RUNTIME_DIR with temp_dir as fallback
    pub fn new() -> Self {
        let path = std::env::var("XDG_RUNTIME_DIR")
            .map(|dir| PathBuf::from(dir).join("voice-memo.sock"))
            .unwrap_or_else(|_| std::env::temp_dir().join("voice-memo.sock"));
        Self { path }
    }

    /// Get the socket path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if socket file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Remove socket file if it exists
    pub fn cleanup(&self) -> io::Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

impl Default for SocketPath {
    fn default() -> Self {
        Self::new()
    }
}

/// Session socket server - listens for commands and sends to channel
pub struct SessionSocketServer {
    socket_path: SocketPath,
    listener: Option<UnixListener>,
}

impl SessionSocketServer {
    /// Create a new socket server
    pub fn new(socket_path: SocketPath) -> Self {
        Self {
            socket_path,
            listener: None,
        }
    }

    /// Bind to the socket
    pub fn bind(&mut self) -> io::Result<()> {
        // Remove stale socket file if it exists
        self.socket_path.cleanup()?;

        // Bind listener
        let listener = UnixListener::bind(self.socket_path.path())?;
        self.listener = Some(listener);
        Ok(())
    }

    /// Get the socket path
    pub fn path(&self) -> &Path {
        self.socket_path.path()
    }

    /// Accept and handle connections
    ///
    /// This runs in a loop, accepting connections and processing commands.
    /// Each command is sent to the provided channel.
    /// The state_fn is called to get current session state for status queries.
    pub async fn run<F>(&self, tx: mpsc::Sender<SessionRequest>, state_fn: F) -> io::Result<()>
    where
        F: Fn() -> MemoState + Send + Sync + 'static,
    {
        let listener = self
            .listener
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "Socket not bound"))?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let tx = tx.clone();
                    let state = state_fn();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, tx, state).await {
                            eprintln!("Socket connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    eprintln!("Socket accept error: {}", e);
                }
            }
        }
    }

    /// Cleanup socket file
    pub fn cleanup(&self) {
        let _ = self.socket_path.cleanup();
    }
}

impl Drop for SessionSocketServer {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Handle a single client connection
async fn handle_connection(
    stream: UnixStream,
    tx: mpsc::Sender<SessionRequest>,
    current_state: MemoState,
) -> io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    // Read command
    reader.read_line(&mut line).await?;
    let cmd = line.trim();

    // Process command; toggles answer with the post-toggle state so the
    // client sees what the session became
    let response = match cmd {
        "record" => toggle_response(&tx, SessionCommand::ToggleRecord).await,
        "play" => toggle_response(&tx, SessionCommand::TogglePlay).await,
        "status" => format!("{}\n", current_state),
        _ => "error: unknown command\n".to_string(),
    };

    writer.write_all(response.as_bytes()).await?;
    writer.flush().await?;

    Ok(())
}

/// Queue a toggle on the session loop and wait for its outcome
async fn toggle_response(tx: &mpsc::Sender<SessionRequest>, command: SessionCommand) -> String {
    let (request, outcome) = SessionRequest::with_reply(command);
    if tx.send(request).await.is_err() {
        return "error: session is shutting down\n".to_string();
    }

    match timeout(REPLY_TIMEOUT, outcome).await {
        Ok(Ok(Ok(state))) => format!("{}\n", state),
        Ok(Ok(Err(message))) => format!("error: {}\n", message),
        Ok(Err(_)) | Err(_) => "error: session did not respond\n".to_string(),
    }
}

/// Session socket client - connects and sends commands
pub struct SessionSocketClient {
    socket_path: SocketPath,
}

impl SessionSocketClient {
    /// Create a new socket client
    pub fn new(socket_path: SocketPath) -> Self {
        Self { socket_path }
    }

    /// Check if a session appears to be running (socket exists)
    pub fn is_session_running(&self) -> bool {
        self.socket_path.exists()
    }

    /// Send a command and receive response
    pub async fn send_command(&self, cmd: &str) -> io::Result<String> {
        let stream = UnixStream::connect(self.socket_path.path()).await?;
        let (reader, mut writer) = stream.into_split();

        // Send command
        writer.write_all(format!("{}\n", cmd).as_bytes()).await?;
        writer.flush().await?;

        // Read response
        let mut reader = BufReader::new(reader);
        let mut response = String::new();
        reader.read_line(&mut response).await?;

        Ok(response)
    }
}
