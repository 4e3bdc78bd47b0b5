//! AI explain/summarize/flashcard requests.
//!
//! Two halves of one contract live here:
//! - [`AiGateway`]: used by the relay server to turn an [`AiRequest`] into a
//!   chat-completion call against the third-party gateway
//! - [`RelayClient`]: used by the companion to call the relay and map its
//!   responses back onto the same [`AiError`] taxonomy

use crate::config::GatewayConfig;
use crate::error::AiError;
use crate::models::{AiRequest, AiRequestType, AiResponse, ErrorBody, VideoNote};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Prompts
// ============================================================================

const EXPLAIN_SYSTEM_PROMPT: &str = "You are an expert educator. Explain concepts clearly and concisely. Use examples when helpful. Keep explanations focused and under 200 words.";

const SUMMARIZE_SYSTEM_PROMPT: &str = "You are an expert at summarizing content. Create clear, bullet-point summaries that capture key points.";

const FLASHCARDS_SYSTEM_PROMPT: &str = "You are an expert educator who creates effective study flashcards. Generate flashcards in JSON format only.";

/// System and user prompt for a request.
pub fn build_prompts(request: &AiRequest) -> (String, String) {
    match request.kind {
        AiRequestType::Explain => {
            let user = match request.context.as_deref().filter(|c| !c.trim().is_empty()) {
                Some(context) => format!(
                    "Explain this text in simple terms:\n\n\"{}\"\n\nContext from the video notes: {}",
                    request.text, context
                ),
                None => format!("Explain this text in simple terms:\n\n\"{}\"", request.text),
            };
            (EXPLAIN_SYSTEM_PROMPT.to_string(), user)
        }
        AiRequestType::Summarize => (
            SUMMARIZE_SYSTEM_PROMPT.to_string(),
            format!(
                "Summarize the following notes into key bullet points:\n\n{}",
                request.text
            ),
        ),
        AiRequestType::Flashcards => (
            FLASHCARDS_SYSTEM_PROMPT.to_string(),
            format!(
                "Based on these notes, generate 5-8 flashcards for studying. Return ONLY a JSON array with objects containing \"question\" and \"answer\" fields. No other text.\n\nNotes:\n{}",
                request.text
            ),
        ),
    }
}

/// Plain-text digest of a note sent as the `text` of summarize and
/// flashcard requests. Summaries bracket each timestamp label.
pub fn note_digest(note: &VideoNote, kind: AiRequestType) -> String {
    let labels: Vec<String> = note
        .timestamps
        .iter()
        .map(|t| match kind {
            AiRequestType::Summarize => format!("[{}]", t.label),
            _ => t.label.clone(),
        })
        .collect();

    format!(
        "Video: {}\nNotes: {}\nTimestamps: {}\nTags: {}",
        note.video_title,
        note.content,
        labels.join(", "),
        note.tags.join(", ")
    )
    .trim()
    .to_string()
}

fn transport_error(e: reqwest::Error) -> AiError {
    if e.is_timeout() {
        AiError::TimedOut
    } else {
        AiError::Unreachable(e.to_string())
    }
}

// ============================================================================
// Gateway Client (relay side)
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct AiGateway {
    client: Client,
    config: GatewayConfig,
}

impl AiGateway {
    pub fn new(config: GatewayConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }

    fn api_key(&self) -> Option<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
    }

    /// Forward a request to the gateway and return the completion text.
    pub async fn complete(&self, request: &AiRequest) -> Result<String, AiError> {
        if request.text.trim().is_empty() {
            return Err(AiError::InvalidRequest("text is required".to_string()));
        }
        let api_key = self.api_key().ok_or(AiError::NotConfigured)?;

        let (system_prompt, user_prompt) = build_prompts(request);
        tracing::info!(
            kind = %request.kind,
            text_len = request.text.len(),
            "AI request"
        );

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
        };

        let response = self
            .client
            .post(&self.config.url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => AiError::RateLimited,
                StatusCode::PAYMENT_REQUIRED => AiError::CreditsExhausted,
                _ => {
                    let error_text = response.text().await.unwrap_or_default();
                    tracing::error!(status = status.as_u16(), body = %error_text, "AI gateway error");
                    AiError::Upstream {
                        status: status.as_u16(),
                        message: format!("AI gateway error: {}", status.as_u16()),
                    }
                }
            });
        }

        let chat: ChatResponse = response.json().await.map_err(|e| AiError::Upstream {
            status: status.as_u16(),
            message: format!("Malformed AI gateway response: {}", e),
        })?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AiError::Upstream {
                status: status.as_u16(),
                message: "AI response contained no content".to_string(),
            })?;

        tracing::info!(content_len = content.len(), "AI response received");
        Ok(content)
    }
}

// ============================================================================
// Relay Client (companion side)
// ============================================================================

pub struct RelayClient {
    client: Client,
    endpoint: String,
}

impl RelayClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub async fn request(&self, request: &AiRequest) -> Result<String, AiError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            let body: AiResponse = response.json().await.map_err(|e| AiError::Upstream {
                status: status.as_u16(),
                message: format!("Malformed AI relay response: {}", e),
            })?;
            return Ok(body.content);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .map(|b| b.error)
            .unwrap_or_else(|_| format!("AI relay error: {}", status.as_u16()));

        Err(match status {
            StatusCode::TOO_MANY_REQUESTS => AiError::RateLimited,
            StatusCode::PAYMENT_REQUIRED => AiError::CreditsExhausted,
            StatusCode::BAD_REQUEST => AiError::InvalidRequest(message),
            // The relay's only signal for a missing key is its error text.
            _ if message == AiError::NotConfigured.to_string() => AiError::NotConfigured,
            _ => AiError::Upstream {
                status: status.as_u16(),
                message,
            },
        })
    }

    pub async fn explain(&self, text: &str, context: Option<&str>) -> Result<String, AiError> {
        self.request(&AiRequest {
            text: text.to_string(),
            context: context.map(str::to_string),
            kind: AiRequestType::Explain,
        })
        .await
    }

    pub async fn summarize(&self, note: &VideoNote) -> Result<String, AiError> {
        self.request(&AiRequest {
            text: note_digest(note, AiRequestType::Summarize),
            context: None,
            kind: AiRequestType::Summarize,
        })
        .await
    }

    /// Raw flashcard content; see [`crate::study::parse_flashcards`].
    pub async fn flashcards(&self, note: &VideoNote) -> Result<String, AiError> {
        self.request(&AiRequest {
            text: note_digest(note, AiRequestType::Flashcards),
            context: None,
            kind: AiRequestType::Flashcards,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::{add_tag, add_timestamp, create_note};

    fn request(kind: AiRequestType, context: Option<&str>) -> AiRequest {
        AiRequest {
            text: "ownership".to_string(),
            context: context.map(str::to_string),
            kind,
        }
    }

    #[test]
    fn test_explain_prompt_with_and_without_context() {
        let (system, user) = build_prompts(&request(AiRequestType::Explain, None));
        assert!(system.contains("under 200 words"));
        assert_eq!(user, "Explain this text in simple terms:\n\n\"ownership\"");

        let (_, user) = build_prompts(&request(AiRequestType::Explain, Some("Rust course")));
        assert!(user.ends_with("\n\nContext from the video notes: Rust course"));
    }

    #[test]
    fn test_summarize_and_flashcard_prompts() {
        let (system, user) = build_prompts(&request(AiRequestType::Summarize, None));
        assert!(system.contains("bullet-point"));
        assert!(user.ends_with("key bullet points:\n\nownership"));

        let (system, user) = build_prompts(&request(AiRequestType::Flashcards, None));
        assert!(system.contains("JSON format only"));
        assert!(user.contains("\"question\" and \"answer\""));
        assert!(user.ends_with("Notes:\nownership"));
    }

    #[test]
    fn test_note_digest() {
        let note = create_note("v", "Borrowing", "u");
        let note = add_timestamp(&note, 10.0, "Intro");
        let note = add_timestamp(&note, 20.0, "Rules");
        let mut note = add_tag(&note, "rust").unwrap();
        note.content = "Shared XOR mutable".to_string();

        assert_eq!(
            note_digest(&note, AiRequestType::Summarize),
            "Video: Borrowing\nNotes: Shared XOR mutable\nTimestamps: [Intro], [Rules]\nTags: rust"
        );
        assert_eq!(
            note_digest(&note, AiRequestType::Flashcards),
            "Video: Borrowing\nNotes: Shared XOR mutable\nTimestamps: Intro, Rules\nTags: rust"
        );
    }

    #[test]
    fn test_request_wire_format() {
        let json = serde_json::to_value(request(AiRequestType::Flashcards, None)).unwrap();
        assert_eq!(json, serde_json::json!({"text": "ownership", "type": "flashcards"}));

        let parsed: AiRequest =
            serde_json::from_str(r#"{"text":"x","context":"y","type":"explain"}"#).unwrap();
        assert_eq!(parsed.kind, AiRequestType::Explain);
        assert_eq!(parsed.context.as_deref(), Some("y"));
    }
}
