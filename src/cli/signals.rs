//! Signal handling for the session process

use colored::Colorize;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::{mpsc, oneshot};

use crate::domain::session::MemoState;

/// Commands delivered to the session loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Toggle recording (start if idle, stop if recording)
    ToggleRecord,
    /// Toggle playback (start if idle, stop if playing)
    TogglePlay,
    /// Shutdown session (SIGINT/SIGTERM)
    Shutdown,
}

/// Outcome reported back to a control client: the session state the
/// command produced, or the refusal message
pub type CommandReply = Result<MemoState, String>;

/// A command paired with an optional reply slot.
///
/// Signal-originated commands carry no reply slot; socket-originated
/// toggles carry one so the client sees the post-toggle state.
#[derive(Debug)]
pub struct SessionRequest {
    pub command: SessionCommand,
    pub reply: Option<oneshot::Sender<CommandReply>>,
}

impl SessionRequest {
    /// A request with no reply slot
    pub fn fire_and_forget(command: SessionCommand) -> Self {
        Self {
            command,
            reply: None,
        }
    }

    /// A request paired with a receiver for the command outcome
    pub fn with_reply(command: SessionCommand) -> (Self, oneshot::Receiver<CommandReply>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                command,
                reply: Some(tx),
            },
            rx,
        )
    }
}

/// Session command handler
///
/// Handles OS shutdown signals (SIGINT/SIGTERM) and provides a channel
/// for receiving session commands from other sources (e.g., socket server).
pub struct SessionCommandHandler {
    receiver: mpsc::Receiver<SessionRequest>,
}

impl SessionCommandHandler {
    /// Create a new handler and start listening for shutdown signals.
    ///
    /// Returns the handler and a sender that can be used by other sources
    /// (like a socket server) to send commands to the session loop.
    pub async fn new() -> Result<(Self, mpsc::Sender<SessionRequest>), std::io::Error> {
        let (tx, rx) = mpsc::channel(10);

        // Setup SIGINT handler (shutdown)
        let tx_int = tx.clone();
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::spawn(async move {
            sigint.recv().await;
            eprintln!("{} Received SIGINT (shutdown)", "↓".cyan());
            let _ = tx_int
                .send(SessionRequest::fire_and_forget(SessionCommand::Shutdown))
                .await;
        });

        // Setup SIGTERM handler (shutdown)
        let tx_term = tx.clone();
        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::spawn(async move {
            sigterm.recv().await;
            eprintln!("{} Received SIGTERM (shutdown)", "↓".cyan());
            let _ = tx_term
                .send(SessionRequest::fire_and_forget(SessionCommand::Shutdown))
                .await;
        });

        Ok((Self { receiver: rx }, tx))
    }

    /// Wait for the next command
    pub async fn recv(&mut self) -> Option<SessionRequest> {
        self.receiver.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_command_equality() {
        assert_eq!(SessionCommand::ToggleRecord, SessionCommand::ToggleRecord);
        assert_ne!(SessionCommand::ToggleRecord, SessionCommand::TogglePlay);
    }

    #[tokio::test]
    async fn sender_delivers_to_handler() {
        let (mut handler, tx) = SessionCommandHandler::new().await.unwrap();
        tx.send(SessionRequest::fire_and_forget(SessionCommand::TogglePlay))
            .await
            .unwrap();
        let request = handler.recv().await.unwrap();
        assert_eq!(request.command, SessionCommand::TogglePlay);
        assert!(request.reply.is_none());
    }

    #[tokio::test]
    async fn reply_slot_carries_outcome_back() {
        let (request, outcome) = SessionRequest::with_reply(SessionCommand::ToggleRecord);
        request
            .reply
            .expect("toggle requests carry a reply slot")
            .send(Ok(MemoState::Recording))
            .unwrap();
        assert_eq!(outcome.await.unwrap(), Ok(MemoState::Recording));
    }
}
