//! Note construction, timestamp merging, tag editing and search.
//!
//! Every editing operation here is pure: it takes the current note by
//! reference and returns a new value with `updated_at` refreshed. Persisting
//! the result is the store's job.

use crate::error::NoteError;
use crate::models::{NoteStats, Timestamp, VideoNote};
use chrono::Utc;
use rand::Rng;
use std::collections::HashSet;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_RANDOM_LEN: usize = 11;

// ============================================================================
// Identifiers
// ============================================================================

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

/// Generate an identifier: random base-36 characters followed by the
/// base-36 millisecond clock. Unique enough for a single device, not
/// cryptographically strong.
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    let random: String = (0..ID_RANDOM_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    format!("{}{}", random, to_base36(millis))
}

// ============================================================================
// Note Construction
// ============================================================================

pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{}/maxresdefault.jpg", video_id)
}

pub fn create_note(video_id: &str, video_title: &str, video_url: &str) -> VideoNote {
    let now = Utc::now();
    VideoNote {
        id: generate_id(),
        video_id: video_id.to_string(),
        video_title: video_title.to_string(),
        video_url: video_url.to_string(),
        thumbnail_url: thumbnail_url(video_id),
        content: String::new(),
        timestamps: Vec::new(),
        created_at: now,
        updated_at: now,
        tags: Vec::new(),
        folder: None,
    }
}

// ============================================================================
// Time Formatting
// ============================================================================

pub(crate) fn sanitize_time(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}

/// Format a playback position as `m:ss`, or `h:mm:ss` from one hour on.
pub fn format_time(seconds: f64) -> String {
    let total = sanitize_time(seconds).floor() as u64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;

    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

pub fn default_timestamp_label(seconds: f64) -> String {
    format!("Timestamp at {}", format_time(seconds))
}

// ============================================================================
// Timestamp Merge
// ============================================================================

/// Return a copy of `note` with a new timestamp merged into its list.
///
/// The list is stable-sorted by time, so a timestamp at the same position as
/// an existing one lands after it.
pub fn add_timestamp(note: &VideoNote, time: f64, label: &str) -> VideoNote {
    let mut updated = note.clone();
    updated.timestamps.push(Timestamp {
        id: generate_id(),
        time: sanitize_time(time),
        label: label.to_string(),
        note: None,
    });
    updated.timestamps.sort_by(|a, b| a.time.total_cmp(&b.time));
    updated.updated_at = Utc::now();
    updated
}

pub fn remove_timestamp(note: &VideoNote, timestamp_id: &str) -> VideoNote {
    let mut updated = note.clone();
    updated.timestamps.retain(|t| t.id != timestamp_id);
    updated.updated_at = Utc::now();
    updated
}

// ============================================================================
// Tags and Content
// ============================================================================

pub fn add_tag(note: &VideoNote, tag: &str) -> Result<VideoNote, NoteError> {
    let tag = tag.trim();
    if tag.is_empty() {
        return Err(NoteError::EmptyTag);
    }
    if note.tags.iter().any(|t| t == tag) {
        return Err(NoteError::DuplicateTag(tag.to_string()));
    }

    let mut updated = note.clone();
    updated.tags.push(tag.to_string());
    updated.updated_at = Utc::now();
    Ok(updated)
}

pub fn remove_tag(note: &VideoNote, tag: &str) -> VideoNote {
    let mut updated = note.clone();
    updated.tags.retain(|t| t != tag);
    updated.updated_at = Utc::now();
    updated
}

pub fn set_content(note: &VideoNote, content: &str) -> VideoNote {
    let mut updated = note.clone();
    updated.content = content.to_string();
    updated.updated_at = Utc::now();
    updated
}

// ============================================================================
// Search and Stats
// ============================================================================

/// Case-insensitive filter over title, content and tags. An empty query
/// matches everything.
pub fn search_notes<'a>(notes: &'a [VideoNote], query: &str) -> Vec<&'a VideoNote> {
    let query_lower = query.to_lowercase();
    if query_lower.is_empty() {
        return notes.iter().collect();
    }

    notes
        .iter()
        .filter(|note| {
            note.video_title.to_lowercase().contains(&query_lower)
                || note.content.to_lowercase().contains(&query_lower)
                || note
                    .tags
                    .iter()
                    .any(|tag| tag.to_lowercase().contains(&query_lower))
        })
        .collect()
}

pub fn note_stats(notes: &[VideoNote]) -> NoteStats {
    let unique_tags: HashSet<&str> = notes
        .iter()
        .flat_map(|n| n.tags.iter().map(String::as_str))
        .collect();

    NoteStats {
        total_notes: notes.len(),
        total_timestamps: notes.iter().map(|n| n.timestamps.len()).sum(),
        unique_tags: unique_tags.len(),
    }
}
