//! Domain layer - Core business logic
//!
//! Contains value objects, entities, and domain errors.
//! This layer has no dependencies on external systems.

pub mod config;
pub mod error;
pub mod memo;
pub mod recording;
pub mod session;

/// Application name, shown in desktop notifications
pub const APP_NAME: &str = "VoiceMemo";

// Re-export common types
pub use config::AppConfig;
pub use error::*;
pub use memo::{MemoArtifact, TakeSummary};
pub use recording::Duration;
pub use session::{MemoSession, MemoState};
