//! Playback port interface

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tokio::sync::mpsc;

/// Playback errors
#[derive(Debug, Clone, Error)]
pub enum PlaybackError {
    #[error("Failed to start playback: {0}")]
    StartFailed(String),

    #[error("Cannot open memo file: {0}")]
    OpenFailed(String),

    #[error("Unsupported or corrupt audio data: {0}")]
    DecodeFailed(String),

    #[error("No audio output device available")]
    NoOutputDevice,
}

/// Event emitted when a playback runs to its natural end.
///
/// Carries the generation token the playback was started with so the
/// session can discard completions that raced an explicit stop or belong
/// to a superseded playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackFinished {
    pub generation: u64,
}

/// Channel on which playback adapters deliver completion events
pub type CompletionSender = mpsc::UnboundedSender<PlaybackFinished>;

/// Port for playing the memo artifact through the default output device.
///
/// A player holds at most one active playback at a time. Completion is
/// delivered asynchronously on the completion channel the adapter was
/// built with, never by calling back into the session directly.
#[async_trait]
pub trait Player: Send + Sync {
    /// Start playing `source`, tagging the eventual completion event
    /// with `generation`.
    ///
    /// Fails with a setup error (file missing, undecodable, no output
    /// device) without retaining any resource.
    async fn start(&self, source: &Path, generation: u64) -> Result<(), PlaybackError>;

    /// Stop and release the active playback. No-op when nothing is
    /// playing; a stopped playback emits no completion event.
    async fn stop(&self) -> Result<(), PlaybackError>;

    /// Check if currently playing
    fn is_playing(&self) -> bool;
}
