// Integration tests for audio payload assembly and the file capture backend
//
// These tests verify that captured frames are finalized into a single
// WAV-encoded payload, and that the file backend replays WAV files as
// timed frames through the backend trait.

use anyhow::Result;
use feedback_analyzer::audio::{
    AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFrame, AudioPayload, AudioSource,
    FileBackend, PayloadRecorder,
};
use feedback_analyzer::{DeviceError, Error};
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;
use tokio::sync::mpsc;

fn write_test_wav(path: &Path, sample_count: usize) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for i in 0..sample_count {
        writer.write_sample((i % 100) as i16)?;
    }
    writer.finalize()?;

    Ok(())
}

fn read_payload_samples(payload: &AudioPayload) -> Result<(hound::WavSpec, Vec<i16>)> {
    let reader = hound::WavReader::new(Cursor::new(payload.bytes.clone()))?;
    let spec = reader.spec();
    let samples = reader.into_samples::<i16>().collect::<Result<Vec<_>, _>>()?;

    Ok((spec, samples))
}

#[test]
fn test_payload_recorder_encodes_wav() -> Result<()> {
    let mut recorder = PayloadRecorder::new(16000, 1);

    for i in 0..3u64 {
        recorder.push_frame(&AudioFrame {
            samples: vec![7i16; 1600],
            sample_rate: 16000,
            channels: 1,
            timestamp_ms: i * 100,
        });
    }

    assert_eq!(recorder.sample_count(), 4800);

    let payload = recorder.finish()?;
    assert_eq!(payload.mime_type, "audio/wav");

    let (spec, samples) = read_payload_samples(&payload)?;
    assert_eq!(spec.sample_rate, 16000);
    assert_eq!(spec.channels, 1);
    assert_eq!(samples.len(), 4800);
    assert!(samples.iter().all(|&s| s == 7));

    Ok(())
}

#[test]
fn test_payload_recorder_adopts_frame_format() -> Result<()> {
    // The recorder follows the format the backend actually produced, not
    // the format it was seeded with.
    let mut recorder = PayloadRecorder::new(16000, 1);

    recorder.push_frame(&AudioFrame {
        samples: vec![0i16; 4410],
        sample_rate: 44100,
        channels: 2,
        timestamp_ms: 0,
    });

    let payload = recorder.finish()?;
    let (spec, _) = read_payload_samples(&payload)?;

    assert_eq!(spec.sample_rate, 44100);
    assert_eq!(spec.channels, 2);

    Ok(())
}

#[test]
fn test_empty_recording_still_yields_valid_payload() -> Result<()> {
    // Stopping before any frame was captured must not fault; the payload
    // is a valid WAV container with zero samples.
    let recorder = PayloadRecorder::new(16000, 1);
    assert_eq!(recorder.sample_count(), 0);

    let payload = recorder.finish()?;
    assert_eq!(payload.mime_type, "audio/wav");
    assert!(!payload.bytes.is_empty(), "WAV header should be present");

    let (_, samples) = read_payload_samples(&payload)?;
    assert_eq!(samples.len(), 0);

    Ok(())
}

#[tokio::test]
async fn test_payload_recorder_drains_channel_until_close() -> Result<()> {
    let recorder = PayloadRecorder::new(16000, 1);
    let (tx, rx) = mpsc::channel(100);

    let handle = tokio::spawn(recorder.record(rx));

    for i in 0..10u64 {
        tx.send(AudioFrame {
            samples: vec![1i16; 1600],
            sample_rate: 16000,
            channels: 1,
            timestamp_ms: i * 100,
        })
        .await?;
    }

    // Closing the channel signals end of capture.
    drop(tx);

    let payload = handle.await??;
    let (_, samples) = read_payload_samples(&payload)?;
    assert_eq!(samples.len(), 16000);

    Ok(())
}

#[tokio::test]
async fn test_file_backend_replays_all_samples() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let wav_path = temp_dir.path().join("feedback.wav");
    write_test_wav(&wav_path, 8000)?;

    let mut backend = FileBackend::new(wav_path, AudioBackendConfig::default())?;

    let mut rx = backend.start().await?;

    let mut total = 0;
    while let Some(frame) = rx.recv().await {
        assert_eq!(frame.sample_rate, 16000);
        assert_eq!(frame.channels, 1);
        total += frame.samples.len();
    }

    assert_eq!(total, 8000, "All samples should be replayed");

    backend.stop().await?;
    assert!(!backend.is_capturing(), "Device should be released after stop");

    Ok(())
}

#[test]
fn test_file_backend_missing_file_is_device_unavailable() {
    let err = FileBackend::new(
        "does/not/exist.wav".into(),
        AudioBackendConfig::default(),
    )
    .err()
    .expect("missing file should be rejected");

    assert!(matches!(err, Error::Device(DeviceError::Unavailable)));
}

#[test]
fn test_factory_creates_file_backend() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let wav_path = temp_dir.path().join("feedback.wav");
    write_test_wav(&wav_path, 1600)?;

    let backend =
        AudioBackendFactory::create(AudioSource::File(wav_path), AudioBackendConfig::default())?;

    assert_eq!(backend.name(), "file");
    assert!(!backend.is_capturing());

    Ok(())
}

#[cfg(not(feature = "microphone"))]
#[test]
fn test_factory_microphone_unsupported_without_feature() {
    // Without the microphone feature the factory reports the
    // distinguished capability-unsupported cause.
    let err = AudioBackendFactory::create(AudioSource::Microphone, AudioBackendConfig::default())
        .err()
        .expect("microphone source should be rejected");

    assert!(matches!(err, Error::Device(DeviceError::Unsupported)));
}

#[test]
fn test_audio_backend_config_default() {
    let config = AudioBackendConfig::default();

    assert_eq!(config.sample_rate, 16000, "Default should be 16kHz");
    assert_eq!(config.channels, 1, "Default should be mono");
    assert_eq!(config.buffer_duration_ms, 100, "Default frame should be 100ms");
}
