use crate::audio::AudioSource;

/// Configuration for a feedback session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Unique session identifier
    pub session_id: String,

    /// Where captured audio comes from
    pub source: AudioSource,

    /// Sample rate for captured audio
    pub sample_rate: u32,

    /// Number of audio channels (1 = mono, 2 = stereo)
    pub channels: u16,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("feedback-{}", uuid::Uuid::new_v4()),
            source: AudioSource::Microphone,
            sample_rate: 16000,
            channels: 1,
        }
    }
}
