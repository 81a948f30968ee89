use crate::error::{DeviceError, Result};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::backend::{AudioBackend, AudioBackendConfig, AudioFrame};

/// Audio backend that replays a WAV file as a sequence of timed frames.
///
/// Used by tests and for batch transcription of prerecorded feedback.
pub struct FileBackend {
    path: PathBuf,
    config: AudioBackendConfig,
    capturing: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl FileBackend {
    pub fn new(path: PathBuf, config: AudioBackendConfig) -> Result<Self> {
        if !path.is_file() {
            warn!("Audio file not found: {}", path.display());
            return Err(DeviceError::Unavailable.into());
        }

        Ok(Self {
            path,
            config,
            capturing: Arc::new(AtomicBool::new(false)),
            task: None,
        })
    }
}

#[async_trait::async_trait]
impl AudioBackend for FileBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        let reader = hound::WavReader::open(&self.path).map_err(|e| {
            warn!("Failed to open WAV file {}: {}", self.path.display(), e);
            DeviceError::Unavailable
        })?;

        let spec = reader.spec();
        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| {
                warn!("Failed to read samples from {}: {}", self.path.display(), e);
                DeviceError::Unavailable
            })?;

        info!(
            "Replaying audio file: {} ({} samples, {}Hz, {}ch)",
            self.path.display(),
            samples.len(),
            spec.sample_rate,
            spec.channels
        );

        let (tx, rx) = mpsc::channel(64);
        let capturing = Arc::clone(&self.capturing);
        capturing.store(true, Ordering::SeqCst);

        let frame_ms = self.config.buffer_duration_ms;
        let samples_per_frame = ((spec.sample_rate as u64 * frame_ms / 1000) as usize
            * spec.channels as usize)
            .max(1);

        let task = tokio::spawn(async move {
            let mut timestamp_ms = 0;

            for chunk in samples.chunks(samples_per_frame) {
                if !capturing.load(Ordering::SeqCst) {
                    break;
                }

                let frame = AudioFrame {
                    samples: chunk.to_vec(),
                    sample_rate: spec.sample_rate,
                    channels: spec.channels,
                    timestamp_ms,
                };

                if tx.send(frame).await.is_err() {
                    break;
                }

                timestamp_ms += frame_ms;
            }

            capturing.store(false, Ordering::SeqCst);
        });

        self.task = Some(task);

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.capturing.store(false, Ordering::SeqCst);

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("File replay task panicked: {}", e);
            }
        }

        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "file"
    }
}
