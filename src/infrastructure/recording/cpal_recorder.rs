//! Cross-platform audio recorder using cpal
//!
//! Captures mono PCM from the default input device and finalizes each
//! take into the memo artifact (16kHz mono 16-bit WAV) on stop.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use tokio::time::Duration as TokioDuration;

use super::wav_take::{write_wav_take, TARGET_SAMPLE_RATE};
use crate::application::ports::{CaptureError, Recorder};
use crate::domain::memo::TakeSummary;

/// Audio recorder using cpal.
///
/// The stream is managed on a dedicated thread because cpal::Stream is
/// not Send; the struct only holds the shared capture buffer and flags.
pub struct CpalRecorder {
    /// Captured audio samples (mono, i16, at device sample rate)
    audio_buffer: Arc<StdMutex<Vec<i16>>>,
    /// Device sample rate (may differ from the 16kHz target)
    device_sample_rate: Arc<AtomicU32>,
    /// Capture state
    is_recording: Arc<AtomicBool>,
    /// Capture start time (millis since epoch, for atomic access)
    start_time_ms: Arc<AtomicU64>,
    /// Elapsed capture time in milliseconds
    elapsed_ms: Arc<AtomicU64>,
    /// Most recent setup error from the capture thread
    setup_error: Arc<StdMutex<Option<String>>>,
    /// Sink path of the active take
    sink_path: StdMutex<Option<PathBuf>>,
}

impl CpalRecorder {
    /// Create a new cpal-based recorder
    pub fn new() -> Self {
        Self {
            audio_buffer: Arc::new(StdMutex::new(Vec::new())),
            device_sample_rate: Arc::new(AtomicU32::new(0)),
            is_recording: Arc::new(AtomicBool::new(false)),
            start_time_ms: Arc::new(AtomicU64::new(0)),
            elapsed_ms: Arc::new(AtomicU64::new(0)),
            setup_error: Arc::new(StdMutex::new(None)),
            sink_path: StdMutex::new(None),
        }
    }

    /// Get the default input device
    fn get_input_device() -> Result<cpal::Device, CaptureError> {
        let host = cpal::default_host();
        host.default_input_device()
            .ok_or(CaptureError::NoAudioDevice)
    }

    /// Get a suitable input configuration
    fn get_input_config(
        device: &cpal::Device,
    ) -> Result<(StreamConfig, SampleFormat), CaptureError> {
        let supported_configs = device
            .supported_input_configs()
            .map_err(|e| CaptureError::StartFailed(format!("Failed to get configs: {}", e)))?;

        // Try to find a config that supports our target sample rate.
        // Prefer mono, but accept stereo (we'll mix down).
        let mut best_config: Option<cpal::SupportedStreamConfigRange> = None;

        for config in supported_configs {
            // Only consider i16 or f32 formats
            if config.sample_format() != SampleFormat::I16
                && config.sample_format() != SampleFormat::F32
            {
                continue;
            }

            let includes_target = config.min_sample_rate().0 <= TARGET_SAMPLE_RATE
                && config.max_sample_rate().0 >= TARGET_SAMPLE_RATE;

            let is_better = match &best_config {
                None => true,
                Some(current) => {
                    let fewer_channels = config.channels() < current.channels();
                    let better_rate =
                        includes_target && current.min_sample_rate().0 > TARGET_SAMPLE_RATE;
                    fewer_channels || better_rate
                }
            };
            if is_better {
                best_config = Some(config);
            }
        }

        let config_range = best_config.ok_or(CaptureError::StartFailed(
            "No suitable input config found".into(),
        ))?;

        // Use the target sample rate if supported, otherwise the minimum
        let sample_rate = if config_range.min_sample_rate().0 <= TARGET_SAMPLE_RATE
            && config_range.max_sample_rate().0 >= TARGET_SAMPLE_RATE
        {
            SampleRate(TARGET_SAMPLE_RATE)
        } else {
            config_range.min_sample_rate()
        };

        let sample_format = config_range.sample_format();
        let config = StreamConfig {
            channels: config_range.channels(),
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        Ok((config, sample_format))
    }

    /// Mix stereo to mono
    fn stereo_to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
        if channels == 1 {
            return samples.to_vec();
        }

        samples
            .chunks(channels as usize)
            .map(|chunk| {
                let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
                (sum / channels as i32) as i16
            })
            .collect()
    }

    fn record_setup_error(slot: &Arc<StdMutex<Option<String>>>, message: impl Into<String>) {
        if let Ok(mut guard) = slot.lock() {
            *guard = Some(message.into());
        }
    }

    /// Probe the sink path so an unwritable target fails at start, not
    /// at finalize. Truncates any previous take, matching the
    /// single-artifact model.
    fn probe_sink(sink: &Path) -> Result<(), CaptureError> {
        if let Some(parent) = sink.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CaptureError::StartFailed(e.to_string()))?;
        }
        std::fs::File::create(sink).map_err(|e| CaptureError::StartFailed(e.to_string()))?;
        Ok(())
    }
}

impl Default for CpalRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Recorder for CpalRecorder {
    async fn start(&self, sink: &Path) -> Result<(), CaptureError> {
        if self.is_recording.load(Ordering::SeqCst) {
            return Err(CaptureError::StartFailed(
                "Recording already in progress".to_string(),
            ));
        }

        Self::probe_sink(sink)?;

        // Clear buffer and error slot
        {
            let mut buffer = self.audio_buffer.lock().unwrap();
            buffer.clear();
        }
        {
            let mut error = self.setup_error.lock().unwrap();
            *error = None;
        }
        if let Ok(mut path) = self.sink_path.lock() {
            *path = Some(sink.to_path_buf());
        }

        // Mark as recording
        self.is_recording.store(true, Ordering::SeqCst);

        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        self.start_time_ms.store(now, Ordering::SeqCst);

        // Clone Arcs for the capture thread
        let audio_buffer = Arc::clone(&self.audio_buffer);
        let device_sample_rate = Arc::clone(&self.device_sample_rate);
        let is_recording = Arc::clone(&self.is_recording);
        let elapsed_ms = Arc::clone(&self.elapsed_ms);
        let start_time_ms = Arc::clone(&self.start_time_ms);
        let setup_error = Arc::clone(&self.setup_error);

        // Capture runs on a background thread (cpal::Stream is not Send)
        std::thread::spawn(move || {
            let device = match CpalRecorder::get_input_device() {
                Ok(d) => d,
                Err(e) => {
                    CpalRecorder::record_setup_error(&setup_error, e.to_string());
                    is_recording.store(false, Ordering::SeqCst);
                    return;
                }
            };

            let (config, sample_format) = match CpalRecorder::get_input_config(&device) {
                Ok(c) => c,
                Err(e) => {
                    CpalRecorder::record_setup_error(&setup_error, e.to_string());
                    is_recording.store(false, Ordering::SeqCst);
                    return;
                }
            };

            let sample_rate = config.sample_rate.0;
            let channels = config.channels;
            device_sample_rate.store(sample_rate, Ordering::SeqCst);

            let audio_buffer_clone = Arc::clone(&audio_buffer);
            let is_recording_clone = Arc::clone(&is_recording);

            let stream_result = match sample_format {
                SampleFormat::I16 => device.build_input_stream(
                    &config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        if is_recording_clone.load(Ordering::SeqCst) {
                            let mono = CpalRecorder::stereo_to_mono(data, channels);
                            if let Ok(mut buffer) = audio_buffer_clone.lock() {
                                buffer.extend_from_slice(&mono);
                            }
                        }
                    },
                    |err| eprintln!("Audio stream error: {}", err),
                    None,
                ),

                SampleFormat::F32 => {
                    let audio_buffer_clone = Arc::clone(&audio_buffer);
                    let is_recording_clone = Arc::clone(&is_recording);

                    device.build_input_stream(
                        &config,
                        move |data: &[f32], _: &cpal::InputCallbackInfo| {
                            if is_recording_clone.load(Ordering::SeqCst) {
                                let i16_data: Vec<i16> =
                                    data.iter().map(|&s| (s * 32767.0) as i16).collect();
                                let mono = CpalRecorder::stereo_to_mono(&i16_data, channels);
                                if let Ok(mut buffer) = audio_buffer_clone.lock() {
                                    buffer.extend_from_slice(&mono);
                                }
                            }
                        },
                        |err| eprintln!("Audio stream error: {}", err),
                        None,
                    )
                }

                _ => {
                    CpalRecorder::record_setup_error(&setup_error, "Unsupported sample format");
                    is_recording.store(false, Ordering::SeqCst);
                    return;
                }
            };

            let stream = match stream_result {
                Ok(s) => s,
                Err(e) => {
                    CpalRecorder::record_setup_error(&setup_error, e.to_string());
                    is_recording.store(false, Ordering::SeqCst);
                    return;
                }
            };

            if let Err(e) = stream.play() {
                CpalRecorder::record_setup_error(&setup_error, e.to_string());
                is_recording.store(false, Ordering::SeqCst);
                return;
            }

            // Keep capturing until stopped
            while is_recording.load(Ordering::SeqCst) {
                let now = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_millis() as u64)
                    .unwrap_or(0);
                let start = start_time_ms.load(Ordering::SeqCst);
                elapsed_ms.store(now.saturating_sub(start), Ordering::SeqCst);

                std::thread::sleep(std::time::Duration::from_millis(100));
            }

            drop(stream);
        });

        // Give the thread a moment to arm the device
        tokio::time::sleep(TokioDuration::from_millis(50)).await;

        // Check if capture actually started
        if !self.is_recording.load(Ordering::SeqCst) {
            let message = self
                .setup_error
                .lock()
                .ok()
                .and_then(|mut e| e.take())
                .unwrap_or_else(|| "Failed to start recording".to_string());
            return Err(CaptureError::StartFailed(message));
        }

        Ok(())
    }

    async fn stop(&self) -> Result<TakeSummary, CaptureError> {
        if !self.is_recording.load(Ordering::SeqCst) {
            return Err(CaptureError::NotRecording);
        }

        // Stop capturing
        self.is_recording.store(false, Ordering::SeqCst);

        // Give the thread a moment to drop the stream
        tokio::time::sleep(TokioDuration::from_millis(100)).await;

        let sample_rate = self.device_sample_rate.load(Ordering::SeqCst);
        if sample_rate == 0 {
            return Err(CaptureError::RecordingFailed("Sample rate not set".into()));
        }

        let sink = self
            .sink_path
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| CaptureError::RecordingFailed("Sink path not set".into()))?;

        // Take the captured samples
        let samples = {
            let mut buffer = self.audio_buffer.lock().unwrap();
            std::mem::take(&mut *buffer)
        };

        if samples.is_empty() {
            return Err(CaptureError::RecordingFailed(
                "No audio data captured".to_string(),
            ));
        }

        let duration_ms = samples.len() as u64 * 1000 / sample_rate as u64;

        // Finalize the artifact (CPU-heavy resample runs off the runtime)
        let sink_for_write = sink.clone();
        tokio::task::spawn_blocking(move || write_wav_take(&sink_for_write, &samples, sample_rate))
            .await
            .map_err(|e| CaptureError::FinalizeFailed(format!("Finalize task error: {}", e)))??;

        let size_bytes = std::fs::metadata(&sink)
            .map(|m| m.len())
            .map_err(|e| CaptureError::FinalizeFailed(e.to_string()))?;

        self.elapsed_ms.store(0, Ordering::SeqCst);

        Ok(TakeSummary {
            duration_ms,
            size_bytes,
        })
    }

    async fn cancel(&self) -> Result<(), CaptureError> {
        // Stop capturing
        self.is_recording.store(false, Ordering::SeqCst);

        // Give the thread a moment to clean up
        tokio::time::sleep(TokioDuration::from_millis(100)).await;

        // Discard the take
        {
            let mut buffer = self.audio_buffer.lock().unwrap();
            buffer.clear();
        }
        if let Ok(mut path) = self.sink_path.lock() {
            *path = None;
        }

        self.elapsed_ms.store(0, Ordering::SeqCst);

        Ok(())
    }

    fn is_recording(&self) -> bool {
        self.is_recording.load(Ordering::SeqCst)
    }

    fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms.load(Ordering::SeqCst)
    }
}
