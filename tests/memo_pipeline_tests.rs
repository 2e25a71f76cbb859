//! Memo artifact pipeline integration tests
//!
//! Exercises the WAV take writer and the session state machine through the
//! public library API, without touching real audio devices.

use voice_memo::domain::memo::{MemoArtifact, MEMO_FILE_NAME};
use voice_memo::domain::session::MemoSession;
use voice_memo::infrastructure::recording::{write_wav_take, TARGET_SAMPLE_RATE};

#[test]
fn written_take_becomes_playable_artifact() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(MEMO_FILE_NAME);

    // One second of a quiet ramp at the target rate
    let samples: Vec<i16> = (0..TARGET_SAMPLE_RATE).map(|i| (i % 256) as i16).collect();
    write_wav_take(&path, &samples, TARGET_SAMPLE_RATE).expect("write take");

    let artifact = MemoArtifact::new(&path);
    assert!(artifact.exists());

    let reader = hound::WavReader::open(&path).expect("open wav");
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, TARGET_SAMPLE_RATE);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(reader.duration(), TARGET_SAMPLE_RATE);
}

#[test]
fn rerecording_overwrites_previous_take() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(MEMO_FILE_NAME);

    let long_take: Vec<i16> = vec![100; TARGET_SAMPLE_RATE as usize * 2];
    write_wav_take(&path, &long_take, TARGET_SAMPLE_RATE).expect("first take");

    let short_take: Vec<i16> = vec![-100; TARGET_SAMPLE_RATE as usize / 2];
    write_wav_take(&path, &short_take, TARGET_SAMPLE_RATE).expect("second take");

    // The single slot holds only the latest take
    let reader = hound::WavReader::open(&path).expect("open wav");
    assert_eq!(reader.duration(), TARGET_SAMPLE_RATE / 2);
}

#[test]
fn session_lifecycle_record_then_play() {
    let mut session = MemoSession::new();

    session.start_recording().expect("idle accepts recording");
    assert!(session.start_playback().is_err());
    assert!(session.stop_recording());

    let generation = session.start_playback().expect("idle accepts playback");
    assert!(session.start_recording().is_err());
    assert!(session.finish_playback(generation));

    // Finished playback returns the session to the recordable state
    assert!(session.start_recording().is_ok());
}

#[test]
fn stale_completion_does_not_disturb_next_playback() {
    let mut session = MemoSession::new();

    let first = session.start_playback().expect("start first playback");
    assert!(session.stop_playback());

    let second = session.start_playback().expect("start second playback");
    assert!(!session.finish_playback(first));
    assert!(session.finish_playback(second));
}
