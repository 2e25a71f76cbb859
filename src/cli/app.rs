//! Session app runner

use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::application::ports::{ConfigStore, Notifier, PlaybackFinished, Player, Recorder};
use crate::application::{MemoSessionService, SessionConfig};
use crate::domain::config::AppConfig;
use crate::domain::session::MemoState;
use crate::infrastructure::{create_notifier, create_recorder, RodioPlayer, XdgConfigStore};

use super::args::SessionOptions;
use super::pid_file::{PidFile, PidFileError};
use super::presenter::Presenter;
use super::signals::{CommandReply, SessionCommand, SessionCommandHandler, SessionRequest};
use super::socket::{SessionSocketServer, SocketPath};

/// Exit code for success
pub const EXIT_SUCCESS: u8 = 0;
/// Exit code for runtime errors
pub const EXIT_ERROR: u8 = 1;
/// Exit code for usage errors
pub const EXIT_USAGE: u8 = 2;

/// Events the session loop reacts to
enum SessionEvent {
    Command(SessionRequest),
    PlaybackDone(u64),
}

/// Run the foreground session process
pub async fn run_session(options: SessionOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    // Acquire PID file
    let pid_file = PidFile::new();
    if let Err(e) = pid_file.acquire() {
        match e {
            PidFileError::AlreadyRunning(pid) => {
                presenter.error(&format!("Another session is already running (PID: {})", pid));
            }
            _ => {
                presenter.error(&e.to_string());
            }
        }
        return ExitCode::from(EXIT_ERROR);
    }

    // Create adapters; the player reports finished takes over this channel
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<PlaybackFinished>();
    let recorder = create_recorder();
    let player = RodioPlayer::new(done_tx);
    let notifier = create_notifier();

    // Create session config
    let config = SessionConfig {
        artifact: options.artifact,
        max_duration: options.max_duration,
        enable_notify: options.notify,
    };

    let service = MemoSessionService::new(recorder, player, notifier, config);

    // Setup command handler (returns handler + sender for socket server)
    let (mut commands, command_tx) = match SessionCommandHandler::new().await {
        Ok(s) => s,
        Err(e) => {
            presenter.error(&format!("Failed to setup signal handler: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    // Setup socket server
    let socket_path = SocketPath::new();
    let mut socket_server = SessionSocketServer::new(socket_path.clone());

    if let Err(e) = socket_server.bind() {
        presenter.error(&format!("Failed to bind socket: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }

    // Wrap state in Arc<Mutex> for sharing with socket server
    let state = Arc::new(Mutex::new(MemoState::Idle));
    let state_for_socket = Arc::clone(&state);

    // Spawn socket server task
    tokio::spawn(async move {
        let _ = socket_server
            .run(command_tx, move || {
                // Use std::sync::Mutex - safe because lock is very brief
                *state_for_socket.lock().unwrap_or_else(|e| e.into_inner())
            })
            .await;
    });

    presenter.session_status("Started, waiting for commands...");
    presenter.info(&format!(
        "Memo: {} | PID: {} | Socket: {} | SIGINT: exit",
        service.artifact().path().display(),
        std::process::id(),
        socket_path.path().display()
    ));

    // Main command loop
    let max_duration_ms = options.max_duration.as_millis();
    let result = session_loop(
        &service,
        &mut commands,
        &mut done_rx,
        &mut presenter,
        max_duration_ms,
        &state,
    )
    .await;

    // Cleanup (socket server Drop will clean up socket file)
    let _ = pid_file.release();

    if result {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}

async fn session_loop<R, P, N>(
    service: &MemoSessionService<R, P, N>,
    commands: &mut SessionCommandHandler,
    done_rx: &mut mpsc::UnboundedReceiver<PlaybackFinished>,
    presenter: &mut Presenter,
    max_duration_ms: u64,
    shared_state: &Arc<Mutex<MemoState>>,
) -> bool
where
    R: Recorder,
    P: Player,
    N: Notifier,
{
    loop {
        let state = service.state().await;
        // Update shared state for socket server
        if let Ok(mut guard) = shared_state.lock() {
            *guard = state;
        }

        // If recording, poll with a timeout so the safety limit is enforced
        let event = if state == MemoState::Recording {
            let remaining_ms = max_duration_ms.saturating_sub(service.elapsed_ms());
            if remaining_ms == 0 {
                Some(SessionEvent::Command(SessionRequest::fire_and_forget(
                    SessionCommand::ToggleRecord,
                )))
            } else {
                match timeout(
                    StdDuration::from_millis(remaining_ms.min(100)),
                    next_event(commands, done_rx),
                )
                .await
                {
                    Ok(event) => event,
                    Err(_) => {
                        // Timeout - check if max duration reached
                        if service.check_max_duration() {
                            presenter.stop_spinner();
                            presenter.warn("Max duration reached, auto-stopping");
                            Some(SessionEvent::Command(SessionRequest::fire_and_forget(
                                SessionCommand::ToggleRecord,
                            )))
                        } else {
                            presenter
                                .update_recording_progress(service.elapsed_ms(), max_duration_ms);
                            continue;
                        }
                    }
                }
            }
        } else {
            next_event(commands, done_rx).await
        };

        match event {
            Some(SessionEvent::Command(request)) => match request.command {
                SessionCommand::ToggleRecord => {
                    let outcome = toggle_record(service, presenter).await;
                    if let Some(reply) = request.reply {
                        let _ = reply.send(outcome);
                    }
                }
                SessionCommand::TogglePlay => {
                    let outcome = toggle_play(service, presenter).await;
                    if let Some(reply) = request.reply {
                        let _ = reply.send(outcome);
                    }
                }
                SessionCommand::Shutdown => {
                    presenter.stop_spinner();
                    if let Err(e) = service.cancel().await {
                        presenter.warn(&format!("Cleanup failed: {}", e));
                    }
                    presenter.session_status("Shutting down...");
                    if let Some(reply) = request.reply {
                        let _ = reply.send(Ok(MemoState::Idle));
                    }
                    return true;
                }
            },
            Some(SessionEvent::PlaybackDone(generation)) => {
                // Stale generations are no-ops: playback was already stopped
                if service.finish_playback(generation).await {
                    presenter.session_status("Idle (playback finished)");
                }
            }
            None => {
                // Channel closed
                return false;
            }
        }
    }
}

/// Process a record toggle and report the state it produced
async fn toggle_record<R, P, N>(
    service: &MemoSessionService<R, P, N>,
    presenter: &mut Presenter,
) -> CommandReply
where
    R: Recorder,
    P: Player,
    N: Notifier,
{
    match service.state().await {
        MemoState::Idle => {
            if let Err(e) = service.start_recording().await {
                presenter.error(&format!("Failed to start recording: {}", e));
                return Err(e.to_string());
            }
            presenter.start_spinner("Recording...");
            Ok(MemoState::Recording)
        }
        MemoState::Recording => {
            presenter.stop_spinner();
            let outcome = match service.stop_recording().await {
                Ok(Some(take)) => {
                    presenter.success(&format!(
                        "Recorded {} ({})",
                        take.human_readable_duration(),
                        take.human_readable_size()
                    ));
                    Ok(MemoState::Idle)
                }
                Ok(None) => Ok(MemoState::Idle),
                Err(e) => {
                    presenter.error(&format!("Failed to stop recording: {}", e));
                    Err(e.to_string())
                }
            };
            presenter.session_status("Idle");
            outcome
        }
        MemoState::Playing => {
            presenter.warn("Playing, stop playback before recording");
            Err("playing, stop playback first".to_string())
        }
    }
}

/// Process a play toggle and report the state it produced
async fn toggle_play<R, P, N>(
    service: &MemoSessionService<R, P, N>,
    presenter: &mut Presenter,
) -> CommandReply
where
    R: Recorder,
    P: Player,
    N: Notifier,
{
    match service.state().await {
        MemoState::Idle => {
            if let Err(e) = service.start_playback().await {
                presenter.error(&format!("Failed to start playback: {}", e));
                return Err(e.to_string());
            }
            presenter.session_status("Playing...");
            Ok(MemoState::Playing)
        }
        MemoState::Playing => match service.stop_playback().await {
            Ok(_) => {
                presenter.session_status("Idle");
                Ok(MemoState::Idle)
            }
            Err(e) => {
                presenter.error(&format!("Failed to stop playback: {}", e));
                Err(e.to_string())
            }
        },
        MemoState::Recording => {
            presenter.warn("Recording, stop recording before playback");
            Err("recording, stop recording first".to_string())
        }
    }
}

/// Load and merge configuration from file and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load().await.unwrap_or_else(|_| AppConfig::empty());

    // Merge: defaults < file < cli (--file also absorbs VOICE_MEMO_FILE)
    AppConfig::defaults().merge(file_config).merge(cli_config)
}

/// Wait for the next command or playback completion
async fn next_event(
    commands: &mut SessionCommandHandler,
    done_rx: &mut mpsc::UnboundedReceiver<PlaybackFinished>,
) -> Option<SessionEvent> {
    tokio::select! {
        cmd = commands.recv() => cmd.map(SessionEvent::Command),
        done = done_rx.recv() => done.map(|d| SessionEvent::PlaybackDone(d.generation)),
    }
}
