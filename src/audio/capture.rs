use crate::error::{Error, Result};
use std::io::Cursor;
use tokio::sync::mpsc;
use tracing::info;

use super::backend::AudioFrame;

/// One completed recording, ready for transcription.
///
/// Consumed exactly once by the transcription client and discarded after
/// transcription completes or fails.
#[derive(Debug, Clone)]
pub struct AudioPayload {
    /// Encoded audio bytes
    pub bytes: Vec<u8>,
    /// MIME type tag for the encoding
    pub mime_type: String,
}

/// Buffers captured audio frames and finalizes them into a single
/// WAV-encoded [`AudioPayload`].
///
/// The recorder adopts the format of the first frame it sees; the
/// constructor arguments only seed the format for an empty recording.
pub struct PayloadRecorder {
    sample_rate: u32,
    channels: u16,
    samples: Vec<i16>,
}

impl PayloadRecorder {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
            samples: Vec::new(),
        }
    }

    /// Drain the frame channel until the backend closes it, then finalize.
    pub async fn record(mut self, mut audio_rx: mpsc::Receiver<AudioFrame>) -> Result<AudioPayload> {
        while let Some(frame) = audio_rx.recv().await {
            self.push_frame(&frame);
        }

        self.finish()
    }

    pub fn push_frame(&mut self, frame: &AudioFrame) {
        if self.samples.is_empty() {
            self.sample_rate = frame.sample_rate;
            self.channels = frame.channels;
        }

        self.samples.extend_from_slice(&frame.samples);
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Finalize the buffered samples into one WAV payload.
    ///
    /// A recording with zero captured frames still produces a valid
    /// (empty) payload.
    pub fn finish(self) -> Result<AudioPayload> {
        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());

        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)
                .map_err(|e| Error::Internal(format!("failed to create WAV writer: {e}")))?;

            for &sample in &self.samples {
                writer
                    .write_sample(sample)
                    .map_err(|e| Error::Internal(format!("failed to encode sample: {e}")))?;
            }

            writer
                .finalize()
                .map_err(|e| Error::Internal(format!("failed to finalize WAV payload: {e}")))?;
        }

        let bytes = cursor.into_inner();

        info!(
            "Recording finalized: {} samples, {} bytes",
            self.samples.len(),
            bytes.len()
        );

        Ok(AudioPayload {
            bytes,
            mime_type: "audio/wav".to_string(),
        })
    }
}
