//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting, signal handling,
//! and the session runner.

pub mod app;
pub mod args;
pub mod config_cmd;
pub mod control_cmd;
pub mod pid_file;
pub mod presenter;
pub mod signals;
pub mod socket;

// Re-export commonly used types
pub use app::{run_session, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};
pub use args::{Cli, Commands, ConfigAction, SessionOptions};
pub use control_cmd::{handle_control_command, ControlAction};
pub use presenter::Presenter;
