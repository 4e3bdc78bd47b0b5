//! The note-taking flows a front end drives.
//!
//! [`Companion`] ties the note store to the relay, dictionary and oEmbed
//! clients. Validation failures are reported before any network call is
//! made; every other failure is scoped to the one operation that raised it.

use crate::ai::RelayClient;
use crate::config::Config;
use crate::dictionary::DictionaryClient;
use crate::error::CompanionError;
use crate::export::{export_filename, export_to_markdown};
use crate::models::{DictionaryEntry, VideoNote};
use crate::notes;
use crate::oembed::OembedClient;
use crate::storage::{NotePersistence, NoteStore, SledPersistence};
use crate::study::{parse_flashcards, FlashcardSession};
use crate::video_url::parse_video_url;

pub struct Companion<P: NotePersistence = SledPersistence> {
    store: NoteStore<P>,
    relay: RelayClient,
    dictionary: DictionaryClient,
    oembed: OembedClient,
}

impl Companion<SledPersistence> {
    /// Open the configured sled database and build clients from `config`.
    pub fn open(config: &Config) -> anyhow::Result<Self> {
        let backend = SledPersistence::open(&config.db_path)?;
        Self::with_backend(backend, config)
    }
}

impl<P: NotePersistence> Companion<P> {
    pub fn with_backend(backend: P, config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            store: NoteStore::new(backend),
            relay: RelayClient::new(config.relay_url.clone(), config.request_timeout)?,
            dictionary: DictionaryClient::new(config.dictionary_url.clone(), config.request_timeout)?,
            oembed: OembedClient::new(config.oembed_url.clone(), config.request_timeout)?,
        })
    }

    pub fn store(&self) -> &NoteStore<P> {
        &self.store
    }

    fn note(&self, note_id: &str) -> Result<VideoNote, CompanionError> {
        self.store
            .get_by_id(note_id)
            .ok_or_else(|| CompanionError::NoteNotFound(note_id.to_string()))
    }

    /// Save and hand back the note as stored, with its refreshed `updated_at`.
    fn persist(&self, note: VideoNote) -> Result<VideoNote, CompanionError> {
        self.store.save(&note)?;
        Ok(self.store.get_by_id(&note.id).unwrap_or(note))
    }

    // ========================================================================
    // Notes
    // ========================================================================

    /// Open the note for a pasted video URL, creating it if the video has
    /// none yet.
    pub async fn add_video(&self, url: &str) -> Result<VideoNote, CompanionError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(CompanionError::UrlRequired);
        }
        let video_id = parse_video_url(url)
            .video_id
            .ok_or(CompanionError::InvalidUrl)?;

        if let Some(existing) = self.store.get(&video_id) {
            tracing::debug!(video_id = %video_id, "Video already has a note");
            return Ok(existing);
        }

        let title = self.oembed.fetch_title(&video_id).await;
        Ok(self.store.open_or_create(&video_id, &title, url)?)
    }

    pub fn list(&self) -> Vec<VideoNote> {
        self.store.list()
    }

    pub fn search(&self, query: &str) -> Vec<VideoNote> {
        let all = self.store.list();
        notes::search_notes(&all, query).into_iter().cloned().collect()
    }

    pub fn add_timestamp(
        &self,
        note_id: &str,
        time: f64,
        label: Option<&str>,
    ) -> Result<VideoNote, CompanionError> {
        let note = self.note(note_id)?;
        let label = match label.map(str::trim).filter(|l| !l.is_empty()) {
            Some(l) => l.to_string(),
            None => notes::default_timestamp_label(time),
        };
        self.persist(notes::add_timestamp(&note, time, &label))
    }

    pub fn remove_timestamp(
        &self,
        note_id: &str,
        timestamp_id: &str,
    ) -> Result<VideoNote, CompanionError> {
        let note = self.note(note_id)?;
        self.persist(notes::remove_timestamp(&note, timestamp_id))
    }

    pub fn add_tag(&self, note_id: &str, tag: &str) -> Result<VideoNote, CompanionError> {
        let note = self.note(note_id)?;
        self.persist(notes::add_tag(&note, tag)?)
    }

    pub fn remove_tag(&self, note_id: &str, tag: &str) -> Result<VideoNote, CompanionError> {
        let note = self.note(note_id)?;
        self.persist(notes::remove_tag(&note, tag))
    }

    pub fn update_content(&self, note_id: &str, content: &str) -> Result<VideoNote, CompanionError> {
        let note = self.note(note_id)?;
        self.persist(notes::set_content(&note, content))
    }

    pub fn delete_note(&self, note_id: &str) -> Result<(), CompanionError> {
        Ok(self.store.delete(note_id)?)
    }

    /// Filename and Markdown body for a note.
    pub fn export_markdown(&self, note_id: &str) -> Result<(String, String), CompanionError> {
        let note = self.note(note_id)?;
        Ok((export_filename(&note), export_to_markdown(&note)))
    }

    // ========================================================================
    // AI and Lookup
    // ========================================================================

    pub async fn explain(
        &self,
        selection: &str,
        context: Option<&str>,
    ) -> Result<String, CompanionError> {
        if selection.trim().is_empty() {
            return Err(CompanionError::EmptySelection);
        }
        Ok(self.relay.explain(selection, context).await?)
    }

    fn studyable(&self, note_id: &str) -> Result<VideoNote, CompanionError> {
        let note = self.note(note_id)?;
        if note.content.trim().is_empty() && note.timestamps.is_empty() {
            return Err(CompanionError::NothingToStudy);
        }
        Ok(note)
    }

    pub async fn summarize(&self, note_id: &str) -> Result<String, CompanionError> {
        let note = self.studyable(note_id)?;
        Ok(self.relay.summarize(&note).await?)
    }

    /// Generate a fresh flashcard deck for a note.
    pub async fn study(&self, note_id: &str) -> Result<FlashcardSession, CompanionError> {
        let note = self.studyable(note_id)?;
        let content = self.relay.flashcards(&note).await?;
        let cards = parse_flashcards(&content, &note.id)?;
        tracing::info!(note_id = %note.id, cards = cards.len(), "Generated flashcards");
        Ok(FlashcardSession::new(cards))
    }

    pub async fn define(&self, word: &str) -> Result<DictionaryEntry, CompanionError> {
        Ok(self.dictionary.lookup(word).await?)
    }
}
