//! Memo session state machine

use std::fmt;
use thiserror::Error;

/// Session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MemoState {
    #[default]
    Idle,
    Recording,
    Playing,
}

impl MemoState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Playing => "playing",
        }
    }
}

impl fmt::Display for MemoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: MemoState,
    pub action: String,
}

/// Memo session entity.
/// Manages state transitions for the record/playback lifecycle.
///
/// State machine:
///   IDLE -> RECORDING (start_recording)
///   RECORDING -> IDLE (stop_recording)
///   IDLE -> PLAYING (start_playback)
///   PLAYING -> IDLE (stop_playback / finish_playback)
///
/// Starting while armed is rejected rather than replacing the live
/// resource. Stop operations are no-ops outside their armed state, so a
/// stray stop never faults. Each playback carries a generation token;
/// a completion event for an older generation is ignored, which makes a
/// completion racing an explicit stop a defined no-op.
#[derive(Debug, Default)]
pub struct MemoSession {
    state: MemoState,
    playback_generation: u64,
}

impl MemoSession {
    /// Create a new session in idle state
    pub fn new() -> Self {
        Self {
            state: MemoState::Idle,
            playback_generation: 0,
        }
    }

    /// Get the current state
    pub fn state(&self) -> MemoState {
        self.state
    }

    /// Check if currently idle
    pub fn is_idle(&self) -> bool {
        self.state == MemoState::Idle
    }

    /// Check if currently recording
    pub fn is_recording(&self) -> bool {
        self.state == MemoState::Recording
    }

    /// Check if currently playing
    pub fn is_playing(&self) -> bool {
        self.state == MemoState::Playing
    }

    /// Generation token of the current (or most recent) playback
    pub fn playback_generation(&self) -> u64 {
        self.playback_generation
    }

    /// Transition from IDLE to RECORDING
    pub fn start_recording(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != MemoState::Idle {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "start recording".to_string(),
            });
        }
        self.state = MemoState::Recording;
        Ok(())
    }

    /// Transition from RECORDING to IDLE.
    /// Returns whether a recording was actually active; stopping while
    /// not recording leaves the state untouched.
    pub fn stop_recording(&mut self) -> bool {
        if self.state != MemoState::Recording {
            return false;
        }
        self.state = MemoState::Idle;
        true
    }

    /// Transition from IDLE to PLAYING, allocating a new generation token
    pub fn start_playback(&mut self) -> Result<u64, InvalidStateTransition> {
        if self.state != MemoState::Idle {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "start playback".to_string(),
            });
        }
        self.state = MemoState::Playing;
        self.playback_generation += 1;
        Ok(self.playback_generation)
    }

    /// Transition from PLAYING to IDLE.
    /// Returns whether a playback was actually active.
    pub fn stop_playback(&mut self) -> bool {
        if self.state != MemoState::Playing {
            return false;
        }
        self.state = MemoState::Idle;
        true
    }

    /// Handle a completion event from the playback engine.
    /// Only the generation that is still playing may complete; a stale
    /// generation (already stopped, or superseded by a newer playback)
    /// is a no-op and returns false.
    pub fn finish_playback(&mut self, generation: u64) -> bool {
        if self.state != MemoState::Playing || generation != self.playback_generation {
            return false;
        }
        self.state = MemoState::Idle;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_idle() {
        let session = MemoSession::new();
        assert!(session.is_idle());
        assert!(!session.is_recording());
        assert!(!session.is_playing());
    }

    #[test]
    fn start_recording_from_idle() {
        let mut session = MemoSession::new();
        assert!(session.start_recording().is_ok());
        assert!(session.is_recording());
    }

    #[test]
    fn start_recording_while_recording_fails() {
        let mut session = MemoSession::new();
        session.start_recording().unwrap();

        let err = session.start_recording().unwrap_err();
        assert_eq!(err.current_state, MemoState::Recording);
        assert!(err.action.contains("start recording"));
    }

    #[test]
    fn start_recording_while_playing_fails() {
        let mut session = MemoSession::new();
        session.start_playback().unwrap();

        let err = session.start_recording().unwrap_err();
        assert_eq!(err.current_state, MemoState::Playing);
    }

    #[test]
    fn stop_recording_from_recording() {
        let mut session = MemoSession::new();
        session.start_recording().unwrap();

        assert!(session.stop_recording());
        assert!(session.is_idle());
    }

    #[test]
    fn stop_recording_while_idle_is_noop() {
        let mut session = MemoSession::new();
        assert!(!session.stop_recording());
        assert!(session.is_idle());
    }

    #[test]
    fn repeated_stops_while_idle_stay_idle() {
        let mut session = MemoSession::new();
        for _ in 0..3 {
            assert!(!session.stop_recording());
            assert!(!session.stop_playback());
            assert!(session.is_idle());
        }
    }

    #[test]
    fn start_playback_from_idle() {
        let mut session = MemoSession::new();
        let generation = session.start_playback().unwrap();
        assert!(session.is_playing());
        assert_eq!(generation, session.playback_generation());
    }

    #[test]
    fn start_playback_while_recording_fails() {
        let mut session = MemoSession::new();
        session.start_recording().unwrap();

        let err = session.start_playback().unwrap_err();
        assert_eq!(err.current_state, MemoState::Recording);
    }

    #[test]
    fn stop_playback_from_playing() {
        let mut session = MemoSession::new();
        session.start_playback().unwrap();

        assert!(session.stop_playback());
        assert!(session.is_idle());
    }

    #[test]
    fn stop_playback_while_idle_is_noop() {
        let mut session = MemoSession::new();
        assert!(!session.stop_playback());
        assert!(session.is_idle());
    }

    #[test]
    fn finish_playback_matches_explicit_stop() {
        let mut session = MemoSession::new();
        let generation = session.start_playback().unwrap();

        assert!(session.finish_playback(generation));
        assert!(session.is_idle());
    }

    #[test]
    fn stale_completion_after_stop_is_noop() {
        let mut session = MemoSession::new();
        let generation = session.start_playback().unwrap();
        session.stop_playback();

        // Completion arriving after an explicit stop must not fault
        assert!(!session.finish_playback(generation));
        assert!(session.is_idle());
    }

    #[test]
    fn stale_completion_does_not_stop_newer_playback() {
        let mut session = MemoSession::new();
        let first = session.start_playback().unwrap();
        session.stop_playback();
        let second = session.start_playback().unwrap();
        assert_ne!(first, second);

        assert!(!session.finish_playback(first));
        assert!(session.is_playing());

        assert!(session.finish_playback(second));
        assert!(session.is_idle());
    }

    #[test]
    fn full_cycle() {
        let mut session = MemoSession::new();
        assert!(session.is_idle());

        session.start_recording().unwrap();
        assert!(session.is_recording());

        session.stop_recording();
        assert!(session.is_idle());

        let generation = session.start_playback().unwrap();
        assert!(session.is_playing());

        session.finish_playback(generation);
        assert!(session.is_idle());

        // Can start another cycle
        session.start_recording().unwrap();
        assert!(session.is_recording());
    }

    #[test]
    fn state_display() {
        assert_eq!(MemoState::Idle.to_string(), "idle");
        assert_eq!(MemoState::Recording.to_string(), "recording");
        assert_eq!(MemoState::Playing.to_string(), "playing");
    }

    #[test]
    fn error_display() {
        let err = InvalidStateTransition {
            current_state: MemoState::Playing,
            action: "start recording".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("start recording"));
        assert!(msg.contains("playing"));
    }
}
