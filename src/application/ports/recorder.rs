//! Recording port interface

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

use crate::domain::memo::TakeSummary;

/// Capture errors
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("Failed to start recording: {0}")]
    StartFailed(String),

    #[error("Recording failed: {0}")]
    RecordingFailed(String),

    #[error("Failed to finalize recording: {0}")]
    FinalizeFailed(String),

    #[error("No recording in progress")]
    NotRecording,

    #[error("No audio input device available")]
    NoAudioDevice,
}

/// Port for signal-controlled audio capture into the memo artifact.
///
/// A recorder holds at most one active capture at a time. `start` arms the
/// capture against a sink path; `stop` finalizes the artifact and releases
/// the device; `cancel` releases without keeping the artifact.
#[async_trait]
pub trait Recorder: Send + Sync {
    /// Start capturing into `sink`.
    ///
    /// Fails with a setup error (device missing, unsupported config,
    /// unwritable sink) without retaining any resource.
    async fn start(&self, sink: &Path) -> Result<(), CaptureError>;

    /// Stop capturing, finalize the artifact, and release the device.
    ///
    /// The device is released even when finalization fails; the error is
    /// reported rather than aborting the caller.
    async fn stop(&self) -> Result<TakeSummary, CaptureError>;

    /// Abandon the capture without keeping the artifact.
    async fn cancel(&self) -> Result<(), CaptureError>;

    /// Check if currently capturing
    fn is_recording(&self) -> bool;

    /// Get elapsed capture time in milliseconds
    fn elapsed_ms(&self) -> u64;
}
