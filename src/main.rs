use anyhow::Result;
use clap::Parser;
use feedback_analyzer::{create_router, AppState, Config, FeedbackSession, GeminiClient, SessionConfig};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(
    name = "feedback-analyzer",
    about = "Employee feedback transcription and analysis service"
)]
struct Cli {
    /// Path to the configuration file (without extension)
    #[arg(long, default_value = "config/feedback-analyzer")]
    config: String,

    /// Override the HTTP bind address
    #[arg(long)]
    bind: Option<String>,

    /// Override the HTTP port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut cfg = Config::load(&cli.config)?;
    if let Some(bind) = cli.bind {
        cfg.service.http.bind = bind;
    }
    if let Some(port) = cli.port {
        cfg.service.http.port = port;
    }

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    if cfg.gemini.api_key.is_none() {
        warn!("GEMINI_API_KEY environment variable is not set. Gemini API calls will fail.");
    }

    let client = Arc::new(GeminiClient::new(&cfg.gemini));

    let session_config = SessionConfig {
        sample_rate: cfg.audio.sample_rate,
        channels: cfg.audio.channels,
        ..SessionConfig::default()
    };

    let session = Arc::new(FeedbackSession::new(
        session_config,
        client.clone(),
        client.clone(),
    ));

    let state = AppState::new(Arc::clone(&session));
    let router = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(session))
        .await?;

    Ok(())
}

/// Wait for ctrl-c, then release any live capture before the server stops.
async fn shutdown_signal(session: Arc<FeedbackSession>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }

    info!("Shutdown signal received");
    session.shutdown().await;
}
