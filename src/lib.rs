//! LectureMate library - video notes, timestamps and AI study helpers.
//!
//! This module exposes every part of the application for the relay binary,
//! for front ends embedding the note store, and for tests.

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, Method,
    },
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod ai;
pub mod companion;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod export;
pub mod handlers;
pub mod models;
pub mod notes;
pub mod oembed;
pub mod storage;
pub mod study;
pub mod video_url;

use crate::config::Config;

/// Path the relay answers AI requests on.
pub const AI_RELAY_PATH: &str = "/api/ai-explain";

// ============================================================================
// Application State
// ============================================================================

pub struct AppState {
    pub gateway: AiGateway,
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let gateway = AiGateway::new(config.gateway.clone(), config.request_timeout)?;
        Ok(Self { gateway })
    }
}

// ============================================================================
// Router
// ============================================================================

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // OPTIONS on any route, preflight or not, is answered by the CORS layer.
        .route(AI_RELAY_PATH, post(handlers::ai_explain))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

// Re-export commonly used types
pub use models::{
    AiRequest, AiRequestType, AiResponse, DictionaryEntry, Flashcard, NoteStats, ParsedVideoUrl,
    Timestamp, VideoNote,
};

pub use error::{AiError, CompanionError, FlashcardError, LookupError, NoteError, StoreError};

pub use notes::{
    add_tag, add_timestamp, create_note, format_time, generate_id, note_stats, remove_tag,
    remove_timestamp, search_notes, set_content,
};

pub use storage::{MemoryPersistence, NotePersistence, NoteStore, SledPersistence};

pub use export::{export_filename, export_to_markdown};

pub use video_url::parse_video_url;

pub use ai::{AiGateway, RelayClient};

pub use study::{parse_flashcards, FlashcardSession};

pub use dictionary::DictionaryClient;

pub use oembed::OembedClient;

pub use companion::Companion;
