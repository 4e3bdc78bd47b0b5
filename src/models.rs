//! Data models for the video notes companion.
//!
//! This module contains the core data structures shared by the store, the
//! exporters and the network contracts: video notes and their timestamps,
//! study flashcards, dictionary entries and the AI relay wire types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Core Note Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoNote {
    pub id: String,
    pub video_id: String,
    pub video_title: String,
    pub video_url: String,
    /// Derived from `video_id`; stored for the render surface's convenience.
    pub thumbnail_url: String,
    pub content: String,
    /// Always sorted ascending by `time`.
    pub timestamps: Vec<Timestamp>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Unique, kept in insertion order for display.
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timestamp {
    pub id: String,
    /// Playback position in seconds.
    pub time: f64,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteStats {
    pub total_notes: usize,
    pub total_timestamps: usize,
    pub unique_tags: usize,
}

// ============================================================================
// Video URLs
// ============================================================================

/// Result of parsing a pasted video URL. An absent `video_id` means the input
/// was not a recognised video link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedVideoUrl {
    pub video_id: Option<String>,
    pub start_offset_seconds: u32,
}

// ============================================================================
// Study
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub note_id: String,
    pub mastered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<DateTime<Utc>>,
}

/// A question/answer pair as produced by the AI before it becomes a card.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FlashcardDraft {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StudyScore {
    pub correct: u32,
    pub incorrect: u32,
}

// ============================================================================
// Dictionary
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryEntry {
    pub word: String,
    #[serde(default)]
    pub phonetic: Option<String>,
    #[serde(default)]
    pub phonetics: Vec<Phonetic>,
    #[serde(default)]
    pub meanings: Vec<Meaning>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phonetic {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub audio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meaning {
    pub part_of_speech: String,
    #[serde(default)]
    pub definitions: Vec<Definition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    pub definition: String,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

// ============================================================================
// AI Relay Wire Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiRequestType {
    Explain,
    Summarize,
    Flashcards,
}

impl std::fmt::Display for AiRequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AiRequestType::Explain => write!(f, "explain"),
            AiRequestType::Summarize => write!(f, "summarize"),
            AiRequestType::Flashcards => write!(f, "flashcards"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(rename = "type")]
    pub kind: AiRequestType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiResponse {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
