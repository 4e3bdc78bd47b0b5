//! Error types for every operation in the crate.
//!
//! Each failure is scoped to the operation that raised it; nothing here is
//! fatal to the process.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorBody;

/// Failures writing the note collection. Reads never fail; they degrade to
/// an empty collection instead.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(#[from] sled::Error),

    #[error("Failed to encode notes: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("A note for video {0} already exists")]
    DuplicateVideo(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NoteError {
    #[error("Tag cannot be empty")]
    EmptyTag,

    #[error("This tag is already added.")]
    DuplicateTag(String),
}

/// The AI relay's failure taxonomy, shared by the relay server and the
/// client that calls it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AiError {
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("AI credits depleted. Please add more credits.")]
    CreditsExhausted,

    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("AI gateway API key is not configured")]
    NotConfigured,

    #[error("AI gateway unreachable: {0}")]
    Unreachable(String),

    #[error("AI gateway timed out")]
    TimedOut,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl AiError {
    pub fn status(&self) -> StatusCode {
        match self {
            AiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AiError::CreditsExhausted => StatusCode::PAYMENT_REQUIRED,
            AiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AiError::Upstream { .. }
            | AiError::NotConfigured
            | AiError::Unreachable(_)
            | AiError::TimedOut => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AiError::Upstream { .. }
            | AiError::NotConfigured
            | AiError::Unreachable(_)
            | AiError::TimedOut => {
                tracing::error!("AI relay failure: {}", self);
            }
            _ => tracing::warn!("AI relay rejected request: {}", self),
        }

        let body = Json(ErrorBody {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// The AI answered, but not with usable flashcards.
#[derive(Error, Debug)]
pub enum FlashcardError {
    #[error("Failed to parse AI response: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Enter a word to look up.")]
    EmptyWord,

    #[error("Word not found. Try another word.")]
    NotFound(String),

    #[error("Failed to look up word. Please try again.")]
    Failed(u16),

    #[error("Failed to look up word. Please try again.")]
    Malformed(String),

    #[error("Network error. Please check your connection.")]
    Network(String),
}

#[derive(Error, Debug)]
pub enum CompanionError {
    #[error("Please enter a YouTube video URL.")]
    UrlRequired,

    #[error("Please enter a valid YouTube video URL.")]
    InvalidUrl,

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Highlight some text to get an AI explanation.")]
    EmptySelection,

    #[error("Add some notes or timestamps first.")]
    NothingToStudy,

    #[error(transparent)]
    Note(#[from] NoteError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Ai(#[from] AiError),

    #[error(transparent)]
    Flashcards(#[from] FlashcardError),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}
