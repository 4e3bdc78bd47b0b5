//! Video title lookup through the oEmbed endpoint.
//!
//! Title fetching never fails the add-video flow: any problem falls back to
//! a placeholder title.

use crate::video_url::watch_url;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const OEMBED_URL: &str = "https://www.youtube.com/oembed";
pub const UNTITLED_VIDEO: &str = "Untitled Video";

#[derive(Debug, Deserialize)]
struct OembedResponse {
    #[serde(default)]
    title: Option<String>,
}

pub struct OembedClient {
    client: Client,
    endpoint: String,
}

impl OembedClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    async fn try_fetch_title(&self, video_id: &str) -> Option<String> {
        let response = match self
            .client
            .get(&self.endpoint)
            .query(&[("url", watch_url(video_id).as_str()), ("format", "json")])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(video_id, "oEmbed request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!(video_id, status = response.status().as_u16(), "oEmbed lookup failed");
            return None;
        }

        let body: OembedResponse = response.json().await.ok()?;
        body.title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }

    /// The video's title, or [`UNTITLED_VIDEO`] if it cannot be fetched.
    pub async fn fetch_title(&self, video_id: &str) -> String {
        self.try_fetch_title(video_id)
            .await
            .unwrap_or_else(|| UNTITLED_VIDEO.to_string())
    }
}
