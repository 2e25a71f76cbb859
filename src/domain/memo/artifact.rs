//! Memo artifact value object

use std::path::{Path, PathBuf};

/// File name of the memo artifact inside its directory
pub const MEMO_FILE_NAME: &str = "memo.wav";

/// Value object identifying the single audio artifact the session ever
/// produces or consumes. Used as both the record sink and the playback
/// source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoArtifact {
    path: PathBuf,
}

impl MemoArtifact {
    /// Create an artifact at an explicit path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default artifact location: `<user cache dir>/voice-memo/memo.wav`
    pub fn default_location() -> Self {
        let dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("voice-memo");
        Self {
            path: dir.join(MEMO_FILE_NAME),
        }
    }

    /// Get the artifact path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check whether the artifact exists on disk
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl Default for MemoArtifact {
    fn default() -> Self {
        Self::default_location()
    }
}

/// Summary of a completed recording take
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TakeSummary {
    /// Captured audio length in milliseconds
    pub duration_ms: u64,
    /// Size of the written artifact in bytes
    pub size_bytes: u64,
}

impl TakeSummary {
    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        let bytes = self.size_bytes;
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }

    /// Get human-readable duration, e.g. "3.2s"
    pub fn human_readable_duration(&self) -> String {
        format!("{:.1}s", self.duration_ms as f64 / 1000.0)
    }
}
