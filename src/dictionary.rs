//! Word definitions from the public dictionary API.
//!
//! The three failure modes (word not found, lookup failed, no connectivity)
//! are kept apart so the caller can phrase them differently.

use crate::error::LookupError;
use crate::models::DictionaryEntry;
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub const DICTIONARY_API_URL: &str = "https://api.dictionaryapi.dev/api/v2/entries/en";

pub struct DictionaryClient {
    client: Client,
    base_url: String,
}

impl DictionaryClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Look up a word, returning the first entry the API reports.
    pub async fn lookup(&self, word: &str) -> Result<DictionaryEntry, LookupError> {
        let word = word.trim();
        if word.is_empty() {
            return Err(LookupError::EmptyWord);
        }

        let url = format!("{}/{}", self.base_url, urlencoding::encode(word));
        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(word, "Dictionary request failed: {}", e);
                return Err(LookupError::Network(e.to_string()));
            }
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound(word.to_string()));
        }
        if !status.is_success() {
            tracing::warn!(word, status = status.as_u16(), "Dictionary lookup failed");
            return Err(LookupError::Failed(status.as_u16()));
        }

        let entries: Vec<DictionaryEntry> = response
            .json()
            .await
            .map_err(|e| LookupError::Malformed(e.to_string()))?;

        entries
            .into_iter()
            .next()
            .ok_or_else(|| LookupError::NotFound(word.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_decodes_with_missing_optional_fields() {
        let json = r#"[{
            "word": "borrow",
            "phonetics": [{"text": "/ˈbɒɹəʊ/"}, {"audio": "https://example.org/borrow.mp3"}],
            "meanings": [{
                "partOfSpeech": "verb",
                "definitions": [{"definition": "To receive temporarily.", "synonyms": ["take"]}]
            }]
        }]"#;
        let entries: Vec<DictionaryEntry> = serde_json::from_str(json).unwrap();
        let entry = &entries[0];
        assert_eq!(entry.word, "borrow");
        assert!(entry.phonetic.is_none());
        assert_eq!(entry.phonetics.len(), 2);
        assert_eq!(entry.meanings[0].part_of_speech, "verb");
        assert_eq!(entry.meanings[0].definitions[0].synonyms, vec!["take"]);
        assert!(entry.meanings[0].definitions[0].example.is_none());
    }

    #[tokio::test]
    async fn test_blank_word_is_rejected_without_a_request() {
        let client = DictionaryClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        assert_eq!(client.lookup("   ").await, Err(LookupError::EmptyWord));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            LookupError::NotFound("x".into()).to_string(),
            "Word not found. Try another word."
        );
        assert_eq!(
            LookupError::Failed(500).to_string(),
            "Failed to look up word. Please try again."
        );
        assert_eq!(
            LookupError::Network("refused".into()).to_string(),
            "Network error. Please check your connection."
        );
    }
}
