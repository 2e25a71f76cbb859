//! WAV take finalization
//!
//! Converts captured PCM to the fixed speech-oriented memo format and
//! writes the artifact:
//! - 16kHz sample rate (resampling from device rate when needed)
//! - Mono channel
//! - 16-bit integer samples in a WAV container

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use rubato::{FftFixedIn, Resampler};

use crate::application::ports::CaptureError;

/// Target sample rate for the memo artifact
pub const TARGET_SAMPLE_RATE: u32 = 16000;

/// Bits per sample (16-bit audio)
const BITS_PER_SAMPLE: u16 = 16;

/// Number of channels (mono)
const CHANNELS: u16 = 1;

/// WAV spec of the memo artifact
pub fn memo_wav_spec() -> WavSpec {
    WavSpec {
        channels: CHANNELS,
        sample_rate: TARGET_SAMPLE_RATE,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    }
}

/// Resample mono PCM from the device rate to the 16kHz target
pub fn resample_to_target(samples: &[i16], source_rate: u32) -> Result<Vec<i16>, CaptureError> {
    if source_rate == TARGET_SAMPLE_RATE {
        return Ok(samples.to_vec());
    }

    // Convert i16 to f32 for resampling
    let samples_f32: Vec<f32> = samples.iter().map(|&s| s as f32 / 32768.0).collect();

    // Calculate output length
    let ratio = TARGET_SAMPLE_RATE as f64 / source_rate as f64;
    let output_len = (samples_f32.len() as f64 * ratio).ceil() as usize;

    let mut resampler = FftFixedIn::<f32>::new(
        source_rate as usize,
        TARGET_SAMPLE_RATE as usize,
        1024, // Chunk size
        2,    // Sub-chunks
        1,    // Mono
    )
    .map_err(|e| CaptureError::FinalizeFailed(format!("Resampler init failed: {}", e)))?;

    let mut output = Vec::with_capacity(output_len);
    let mut input_pos = 0;

    while input_pos < samples_f32.len() {
        let frames_needed = resampler.input_frames_next();
        let end_pos = (input_pos + frames_needed).min(samples_f32.len());
        let chunk: Vec<Vec<f32>> = vec![samples_f32[input_pos..end_pos].to_vec()];

        // Pad the tail chunk to the frame count the resampler expects
        let chunk = if chunk[0].len() < frames_needed {
            let mut padded = chunk[0].clone();
            padded.resize(frames_needed, 0.0);
            vec![padded]
        } else {
            chunk
        };

        let resampled = resampler
            .process(&chunk, None)
            .map_err(|e| CaptureError::FinalizeFailed(format!("Resampling failed: {}", e)))?;

        output.extend(resampled[0].iter().map(|&s| (s * 32767.0) as i16));
        input_pos = end_pos;
    }

    // Trim to expected output length
    output.truncate(output_len);

    Ok(output)
}

/// Write a finished take to `path` in the memo artifact format
pub fn write_wav_take(
    path: &Path,
    samples: &[i16],
    source_rate: u32,
) -> Result<(), CaptureError> {
    let resampled = resample_to_target(samples, source_rate)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| CaptureError::FinalizeFailed(e.to_string()))?;
    }

    let mut writer = WavWriter::create(path, memo_wav_spec())
        .map_err(|e| CaptureError::FinalizeFailed(e.to_string()))?;

    for &sample in &resampled {
        writer
            .write_sample(sample)
            .map_err(|e| CaptureError::FinalizeFailed(e.to_string()))?;
    }

    writer
        .finalize()
        .map_err(|e| CaptureError::FinalizeFailed(e.to_string()))?;

    Ok(())
}
