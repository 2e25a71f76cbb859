//! Recording infrastructure module
//!
//! Cross-platform audio capture using cpal, finalized into the memo
//! artifact as 16kHz mono 16-bit WAV.

mod cpal_recorder;
mod wav_take;

pub use cpal_recorder::CpalRecorder;
pub use wav_take::{memo_wav_spec, resample_to_target, write_wav_take, TARGET_SAMPLE_RATE};

/// Create the default recorder for the current platform
pub fn create_recorder() -> CpalRecorder {
    CpalRecorder::new()
}
