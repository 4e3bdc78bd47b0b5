//! Note persistence.
//!
//! All notes live in one serialized JSON array stored under a single
//! well-known key. The backing medium is injected through
//! [`NotePersistence`]; [`NoteStore`] holds the CRUD logic and never depends
//! on sled directly.
//!
//! Reads never fail: a missing, unreadable or corrupt blob yields an empty
//! collection so the user is never blocked.

use crate::error::StoreError;
use crate::models::VideoNote;
use crate::notes::{create_note, sanitize_time};
use chrono::Utc;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

/// Key under which the serialized note collection is stored.
pub const STORAGE_KEY: &str = "lecturemate_notes";

// ============================================================================
// Persistence Backends
// ============================================================================

pub trait NotePersistence: Send + Sync {
    /// Raw serialized collection, or `None` if nothing was ever stored.
    fn load_blob(&self) -> Result<Option<Vec<u8>>, StoreError>;

    fn save_blob(&self, blob: &[u8]) -> Result<(), StoreError>;
}

/// sled-backed persistence. sled holds an exclusive lock on its directory, so
/// a second process cannot open the same database concurrently.
pub struct SledPersistence {
    db: sled::Db,
}

impl SledPersistence {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self {
            db: sled::open(path)?,
        })
    }

    /// A throwaway database removed when dropped.
    pub fn temporary() -> Result<Self, StoreError> {
        Ok(Self {
            db: sled::Config::new().temporary(true).open()?,
        })
    }

    pub fn from_db(db: sled::Db) -> Self {
        Self { db }
    }
}

impl NotePersistence for SledPersistence {
    fn load_blob(&self) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.db.get(STORAGE_KEY)?.map(|v| v.to_vec()))
    }

    fn save_blob(&self, blob: &[u8]) -> Result<(), StoreError> {
        self.db.insert(STORAGE_KEY, blob)?;
        self.db.flush()?;
        Ok(())
    }
}

/// In-memory persistence, used for embedding and tests.
#[derive(Default)]
pub struct MemoryPersistence {
    blob: Mutex<Option<Vec<u8>>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<Vec<u8>>) -> Self {
        Self {
            blob: Mutex::new(Some(blob.into())),
        }
    }

    pub fn blob(&self) -> Option<Vec<u8>> {
        self.blob
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl NotePersistence for MemoryPersistence {
    fn load_blob(&self) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.blob())
    }

    fn save_blob(&self, blob: &[u8]) -> Result<(), StoreError> {
        *self.blob.lock().unwrap_or_else(PoisonError::into_inner) = Some(blob.to_vec());
        Ok(())
    }
}

// ============================================================================
// Note Store
// ============================================================================

pub struct NoteStore<P: NotePersistence = SledPersistence> {
    backend: P,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl<P: NotePersistence> NoteStore<P> {
    pub fn new(backend: P) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
        }
    }

    pub fn backend(&self) -> &P {
        &self.backend
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_all(&self, notes: &[VideoNote]) -> Result<(), StoreError> {
        let blob = serde_json::to_vec(notes)?;
        self.backend.save_blob(&blob)
    }

    fn decode(bytes: &[u8]) -> Vec<VideoNote> {
        match serde_json::from_slice(bytes) {
            Ok(notes) => notes,
            Err(e) => {
                tracing::warn!("Stored notes are unreadable, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    /// All notes in stored order.
    pub fn list(&self) -> Vec<VideoNote> {
        match self.backend.load_blob() {
            Ok(Some(bytes)) => Self::decode(&bytes),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read stored notes, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    /// The collection a write starts from. A backend that cannot be read
    /// fails the write so the stored notes are never overwritten blind.
    fn load_for_write(&self) -> Result<Vec<VideoNote>, StoreError> {
        Ok(self
            .backend
            .load_blob()?
            .map(|bytes| Self::decode(&bytes))
            .unwrap_or_default())
    }

    /// The note attached to a video, if any.
    pub fn get(&self, video_id: &str) -> Option<VideoNote> {
        self.list().into_iter().find(|n| n.video_id == video_id)
    }

    pub fn get_by_id(&self, id: &str) -> Option<VideoNote> {
        self.list().into_iter().find(|n| n.id == id)
    }

    /// Build a fresh, unsaved note for a video.
    pub fn create(&self, video_id: &str, video_title: &str, video_url: &str) -> VideoNote {
        create_note(video_id, video_title, video_url)
    }

    /// Upsert by note id. A replaced note gets `updated_at` stamped with the
    /// current time; a new note is appended as-is.
    pub fn save(&self, note: &VideoNote) -> Result<(), StoreError> {
        let _guard = self.lock();
        let mut notes = self.load_for_write()?;
        upsert(&mut notes, note);
        self.write_all(&notes)?;
        tracing::debug!(id = %note.id, video_id = %note.video_id, "Saved note");
        Ok(())
    }

    /// Like [`save`](Self::save), but refuses a note whose video already has
    /// a different note attached.
    pub fn insert_new(&self, note: &VideoNote) -> Result<(), StoreError> {
        let _guard = self.lock();
        let mut notes = self.load_for_write()?;
        if notes
            .iter()
            .any(|n| n.video_id == note.video_id && n.id != note.id)
        {
            return Err(StoreError::DuplicateVideo(note.video_id.clone()));
        }
        upsert(&mut notes, note);
        self.write_all(&notes)
    }

    /// Return the note for `video_id`, creating and persisting one if the
    /// video has none yet.
    pub fn open_or_create(
        &self,
        video_id: &str,
        video_title: &str,
        video_url: &str,
    ) -> Result<VideoNote, StoreError> {
        let _guard = self.lock();
        let mut notes = self.load_for_write()?;
        if let Some(existing) = notes.iter().find(|n| n.video_id == video_id) {
            return Ok(existing.clone());
        }

        let note = create_note(video_id, video_title, video_url);
        notes.push(note.clone());
        self.write_all(&notes)?;
        tracing::info!(id = %note.id, video_id = %video_id, "Created note");
        Ok(note)
    }

    /// Remove a note by id. Deleting an unknown id is a no-op.
    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let _guard = self.lock();
        let mut notes = self.load_for_write()?;
        let before = notes.len();
        notes.retain(|n| n.id != id);
        if notes.len() == before {
            return Ok(());
        }
        self.write_all(&notes)?;
        tracing::info!(id = %id, "Deleted note");
        Ok(())
    }
}

/// Non-finite times would serialize as `null` and make the whole blob
/// unreadable, so they are clamped before the note is stored.
fn upsert(notes: &mut Vec<VideoNote>, note: &VideoNote) {
    let mut stored = note.clone();
    for ts in &mut stored.timestamps {
        ts.time = sanitize_time(ts.time);
    }

    match notes.iter().position(|n| n.id == note.id) {
        Some(idx) => {
            stored.updated_at = Utc::now();
            notes[idx] = stored;
        }
        None => notes.push(stored),
    }
}
