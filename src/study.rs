//! Flashcard parsing and study sessions.
//!
//! Flashcards are ephemeral: generated from AI output for one session and
//! discarded afterwards.

use crate::error::FlashcardError;
use crate::models::{Flashcard, FlashcardDraft, StudyScore};
use crate::notes::generate_id;
use chrono::Utc;
use regex::Regex;
use std::sync::LazyLock;

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?:json)?\s*([\s\S]*?)```").expect("code fence pattern is valid")
});

// ============================================================================
// Parsing
// ============================================================================

/// The body of the first fenced code block, or the whole input if there is
/// none.
pub fn strip_code_fence(content: &str) -> &str {
    CODE_FENCE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(content)
        .trim()
}

/// Turn AI output into flashcards owned by `note_id`.
pub fn parse_flashcards(content: &str, note_id: &str) -> Result<Vec<Flashcard>, FlashcardError> {
    let drafts: Vec<FlashcardDraft> = match serde_json::from_str(strip_code_fence(content)) {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!(content_len = content.len(), "Failed to parse flashcards: {}", e);
            return Err(e.into());
        }
    };

    Ok(drafts
        .into_iter()
        .map(|d| Flashcard {
            id: generate_id(),
            question: d.question,
            answer: d.answer,
            note_id: note_id.to_string(),
            mastered: false,
            last_reviewed: None,
        })
        .collect())
}

// ============================================================================
// Study Session
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct FlashcardSession {
    pub cards: Vec<Flashcard>,
    pub current_index: usize,
    pub show_answer: bool,
    pub score: StudyScore,
}

impl FlashcardSession {
    pub fn new(cards: Vec<Flashcard>) -> Self {
        Self {
            cards,
            ..Default::default()
        }
    }

    pub fn current(&self) -> Option<&Flashcard> {
        self.cards.get(self.current_index)
    }

    pub fn flip(&mut self) {
        self.show_answer = !self.show_answer;
    }

    /// Record the answer to the current card and move on.
    pub fn answer(&mut self, correct: bool) {
        if correct {
            self.score.correct += 1;
        } else {
            self.score.incorrect += 1;
        }
        if let Some(card) = self.cards.get_mut(self.current_index) {
            card.mastered = correct;
            card.last_reviewed = Some(Utc::now());
        }
        self.next();
    }

    pub fn next(&mut self) {
        if self.current_index + 1 < self.cards.len() {
            self.current_index += 1;
            self.show_answer = false;
        }
    }

    pub fn prev(&mut self) {
        if self.current_index > 0 {
            self.current_index -= 1;
            self.show_answer = false;
        }
    }

    pub fn restart(&mut self) {
        self.current_index = 0;
        self.show_answer = false;
        self.score = StudyScore::default();
    }

    /// Percentage of the deck reached, counting the current card.
    pub fn progress(&self) -> f64 {
        if self.cards.is_empty() {
            return 0.0;
        }
        (self.current_index + 1) as f64 / self.cards.len() as f64 * 100.0
    }

    pub fn is_complete(&self) -> bool {
        !self.cards.is_empty() && self.current_index == self.cards.len() - 1 && self.show_answer
    }
}
