//! Control command handler - sends commands to the running session via its socket

use super::presenter::Presenter;
use super::socket::{SessionSocketClient, SocketPath};

/// Control actions understood by the session socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    ToggleRecord,
    TogglePlay,
    Status,
}

impl ControlAction {
    fn wire_command(self) -> &'static str {
        match self {
            ControlAction::ToggleRecord => "record",
            ControlAction::TogglePlay => "play",
            ControlAction::Status => "status",
        }
    }
}

/// Handle record/play/status subcommands
pub async fn handle_control_command(
    action: ControlAction,
    presenter: &Presenter,
) -> Result<(), String> {
    let client = SessionSocketClient::new(SocketPath::new());

    // Check if a session is running
    if !client.is_session_running() {
        return Err("No session running. Start with: voice-memo".to_string());
    }

    let cmd = action.wire_command();
    let response = client
        .send_command(cmd)
        .await
        .map_err(|e| format!("Failed to communicate with session: {}", e))?;

    let response = response.trim();
    if let Some(stripped) = response.strip_prefix("error:") {
        return Err(stripped.trim().to_string());
    }

    // Toggles answer with the post-toggle state, so all three actions
    // print the session state the command left behind
    presenter.output(response);

    Ok(())
}
