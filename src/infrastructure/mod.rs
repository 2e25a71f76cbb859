//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with the audio devices, the filesystem, and the desktop.

pub mod config;
pub mod notification;
pub mod playback;
pub mod recording;

// Re-export adapters
pub use config::XdgConfigStore;
pub use notification::{create_notifier, NotifyRustNotifier};
pub use playback::RodioPlayer;
pub use recording::{create_recorder, CpalRecorder};
