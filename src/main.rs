//! LectureMate AI relay - forwards explain/summarize/flashcard requests to the
//! chat-completion gateway so the API key never reaches the browser.
//!
//! The library modules are organized as follows:
//!
//! - `models`: Notes, timestamps, flashcards, dictionary and relay wire types
//! - `notes`: Note construction, timestamp merge, tags, search
//! - `storage`: Note store over an injected persistence backend (sled)
//! - `export`: Markdown export
//! - `video_url`: Video URL parsing
//! - `ai`: Prompts, gateway client and relay client
//! - `study`: Flashcard parsing and study sessions
//! - `dictionary`, `oembed`: Public API clients
//! - `companion`: The flows a front end drives
//! - `handlers`: HTTP route handlers

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use lecturemate::{config::Config, router, AppState, AI_RELAY_PATH};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("lecturemate=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    let state = Arc::new(AppState::new(&config)?);

    if state.gateway.is_configured() {
        tracing::info!(model = %config.gateway.model, "AI gateway: {}", config.gateway.url);
    } else {
        tracing::warn!("AI gateway API key not set (AI_GATEWAY_API_KEY); AI requests will fail");
    }

    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("AI relay listening on http://{}{}", addr, AI_RELAY_PATH);

    axum::serve(listener, app).await?;

    Ok(())
}
