//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod config;
pub mod notifier;
pub mod player;
pub mod recorder;

// Re-export common types
pub use config::ConfigStore;
pub use notifier::{NotificationError, NotificationIcon, Notifier};
pub use player::{CompletionSender, PlaybackError, PlaybackFinished, Player};
pub use recorder::{CaptureError, Recorder};
