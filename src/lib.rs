//! VoiceMemo - single-slot voice memo recorder and player
//!
//! This crate records a voice memo from the microphone into a single WAV file
//! and plays it back, controlled through a long-running session process.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Session state machine, memo artifact, config, and errors
//! - **Application**: Use cases and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal, rodio, notifications, config)
//! - **CLI**: Command-line interface, socket control, and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
