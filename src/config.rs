use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    /// API access credential, usually supplied via GEMINI_API_KEY.
    /// Absence is surfaced per operation, not at load time.
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "feedback-analyzer")?
            .set_default("service.http.bind", "127.0.0.1")?
            .set_default("service.http.port", 8080_i64)?
            .set_default("audio.sample_rate", 16000_i64)?
            .set_default("audio.channels", 1_i64)?
            .set_default("gemini.model", "gemini-2.5-flash-preview-04-17")?
            .set_default(
                "gemini.endpoint",
                "https://generativelanguage.googleapis.com/v1beta",
            )?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("FEEDBACK").separator("__"))
            .build()?;

        let mut cfg: Config = settings.try_deserialize()?;

        // The credential comes from the conventional variable when the
        // config file does not provide one.
        if cfg.gemini.api_key.as_deref().map_or(true, str::is_empty) {
            cfg.gemini.api_key = std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|key| !key.is_empty());
        }

        Ok(cfg)
    }
}
