//! CLI argument definitions using Clap

use clap::{Parser, Subcommand};

use crate::domain::memo::MemoArtifact;
use crate::domain::recording::Duration;

/// VoiceMemo - record a voice memo to a single file and play it back
#[derive(Parser, Debug)]
#[command(name = "voice-memo")]
#[command(version)]
#[command(about = "Record a voice memo to a single file and play it back")]
#[command(long_about = None)]
pub struct Cli {
    /// Path of the memo file (record sink and playback source)
    #[arg(short = 'f', long, value_name = "PATH", env = "VOICE_MEMO_FILE")]
    pub file: Option<String>,

    /// Max recording duration safety limit (e.g., 30s, 5m)
    #[arg(long, value_name = "TIME")]
    pub max_duration: Option<String>,

    /// Show desktop notifications on state changes
    #[arg(short = 'n', long)]
    pub notify: bool,

    /// Subcommand (without one, runs the session in the foreground)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Toggle recording in the running session (start if idle, stop if recording)
    Record,
    /// Toggle playback in the running session (start if idle, stop if playing)
    Play,
    /// Show the session status
    Status,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Options for running the session
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub artifact: MemoArtifact,
    pub max_duration: Duration,
    pub notify: bool,
}

/// Valid configuration keys
pub const VALID_CONFIG_KEYS: &[&str] = &["memo_path", "max_duration", "notify"];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
