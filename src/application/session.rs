//! Memo session use case
//!
//! Drives the four session operations (start/stop recording, start/stop
//! playback) around the domain state machine, keeping the adapters and
//! the state in agreement. All calls are expected to arrive from a
//! single owner (the session event loop); the internal mutex only
//! guards against stray concurrent use.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::memo::{MemoArtifact, TakeSummary};
use crate::domain::recording::Duration;
use crate::domain::session::{InvalidStateTransition, MemoSession, MemoState};
use crate::domain::APP_NAME;

use super::ports::{
    CaptureError, NotificationIcon, Notifier, PlaybackError, Player, Recorder,
};

/// Errors from the session use case
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Recording failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("Playback failed: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Invalid state transition: {0}")]
    InvalidState(#[from] InvalidStateTransition),

    #[error("Nothing recorded yet: no memo at {0}")]
    MissingMemo(String),
}

/// Configuration for a memo session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// The single artifact the session records into and plays from
    pub artifact: MemoArtifact,
    /// Safety limit on a single recording take
    pub max_duration: Duration,
    /// Whether to show desktop notifications on state changes
    pub enable_notify: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            artifact: MemoArtifact::default_location(),
            max_duration: Duration::default_max_duration(),
            enable_notify: false,
        }
    }
}

/// Memo session use case
pub struct MemoSessionService<R, P, N>
where
    R: Recorder,
    P: Player,
    N: Notifier,
{
    recorder: R,
    player: P,
    notifier: N,
    session: Arc<Mutex<MemoSession>>,
    config: SessionConfig,
}

impl<R, P, N> MemoSessionService<R, P, N>
where
    R: Recorder,
    P: Player,
    N: Notifier,
{
    /// Create a new session use case instance
    pub fn new(recorder: R, player: P, notifier: N, config: SessionConfig) -> Self {
        Self {
            recorder,
            player,
            notifier,
            session: Arc::new(Mutex::new(MemoSession::new())),
            config,
        }
    }

    /// Get current session state
    pub async fn state(&self) -> MemoState {
        self.session.lock().await.state()
    }

    /// Get the memo artifact this session works against
    pub fn artifact(&self) -> &MemoArtifact {
        &self.config.artifact
    }

    /// Start recording into the memo artifact.
    ///
    /// Rejected while recording or playing. A setup failure (no device,
    /// unwritable sink) reverts the session to idle with no retained
    /// resource and surfaces a transient notification.
    pub async fn start_recording(&self) -> Result<(), SessionError> {
        {
            let mut session = self.session.lock().await;
            session.start_recording()?;
        }

        if let Err(e) = self.recorder.start(self.config.artifact.path()).await {
            // Setup failure: discard the transition and report
            self.session.lock().await.stop_recording();
            self.notify_failure(&format!("Recording failed: {}", e)).await;
            return Err(e.into());
        }

        if self.config.enable_notify {
            let _ = self
                .notifier
                .notify(APP_NAME, "Recording...", NotificationIcon::Recording)
                .await;
        }

        Ok(())
    }

    /// Stop recording and finalize the artifact.
    ///
    /// A no-op while not recording (returns Ok(None)). The session
    /// returns to idle and the capture device is released even when
    /// finalization fails; the error is reported, never propagated as a
    /// panic.
    pub async fn stop_recording(&self) -> Result<Option<TakeSummary>, SessionError> {
        {
            let mut session = self.session.lock().await;
            if !session.stop_recording() {
                return Ok(None);
            }
        }

        match self.recorder.stop().await {
            Ok(summary) => {
                if self.config.enable_notify {
                    let _ = self
                        .notifier
                        .notify(
                            APP_NAME,
                            &format!(
                                "Recorded {} ({})",
                                summary.human_readable_duration(),
                                summary.human_readable_size()
                            ),
                            NotificationIcon::Info,
                        )
                        .await;
                }
                Ok(Some(summary))
            }
            Err(e) => {
                // State is already idle; the adapter has released the
                // device. Surface the finalize error instead of aborting.
                self.notify_failure(&format!("Recording failed: {}", e)).await;
                Err(e.into())
            }
        }
    }

    /// Start playing the memo artifact.
    ///
    /// Rejected while recording or playing. A missing artifact or any
    /// other setup failure reverts the session to idle.
    pub async fn start_playback(&self) -> Result<(), SessionError> {
        if !self.config.artifact.exists() {
            let err = SessionError::MissingMemo(
                self.config.artifact.path().display().to_string(),
            );
            self.notify_failure(&err.to_string()).await;
            return Err(err);
        }

        let generation = {
            let mut session = self.session.lock().await;
            session.start_playback()?
        };

        if let Err(e) = self
            .player
            .start(self.config.artifact.path(), generation)
            .await
        {
            self.session.lock().await.stop_playback();
            self.notify_failure(&format!("Playback failed: {}", e)).await;
            return Err(e.into());
        }

        if self.config.enable_notify {
            let _ = self
                .notifier
                .notify(APP_NAME, "Playing...", NotificationIcon::Playing)
                .await;
        }

        Ok(())
    }

    /// Stop the active playback.
    ///
    /// A no-op while not playing (returns Ok(false)). The stopped
    /// playback will not deliver a completion event, and one that
    /// already raced this stop is discarded by generation check.
    pub async fn stop_playback(&self) -> Result<bool, SessionError> {
        {
            let mut session = self.session.lock().await;
            if !session.stop_playback() {
                return Ok(false);
            }
        }

        self.player.stop().await?;
        Ok(true)
    }

    /// Handle a playback completion event from the playback engine.
    ///
    /// Performs the same transition as an explicit stop when the
    /// generation still matches; stale generations are a defined no-op.
    /// Returns whether the event was applied.
    pub async fn finish_playback(&self, generation: u64) -> bool {
        let applied = {
            let mut session = self.session.lock().await;
            session.finish_playback(generation)
        };

        if applied {
            // Release is idempotent; the engine has usually already
            // drained by the time the event arrives.
            let _ = self.player.stop().await;
        }

        applied
    }

    /// Cancel whatever is active (shutdown path). Always ends idle.
    pub async fn cancel(&self) -> Result<(), SessionError> {
        let state = {
            let mut session = self.session.lock().await;
            let state = session.state();
            session.stop_recording();
            session.stop_playback();
            state
        };

        match state {
            MemoState::Recording => self.recorder.cancel().await?,
            MemoState::Playing => self.player.stop().await?,
            MemoState::Idle => {}
        }

        Ok(())
    }

    /// Check if recording has exceeded max duration
    pub fn check_max_duration(&self) -> bool {
        self.recorder.elapsed_ms() >= self.config.max_duration.as_millis()
    }

    /// Get elapsed recording time in milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        self.recorder.elapsed_ms()
    }

    /// Check if currently recording
    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    async fn notify_failure(&self, message: &str) {
        let _ = self
            .notifier
            .notify(APP_NAME, message, NotificationIcon::Error)
            .await;
    }
}
