//! Configuration loaded from environment variables.

use crate::dictionary::DICTIONARY_API_URL;
use crate::oembed::OEMBED_URL;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";
pub const DEFAULT_DB_PATH: &str = ".lecturemate_db";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where and how the relay reaches the chat-completion gateway
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub url: String,
    /// `None` leaves the relay running but answering every request with a
    /// configuration error.
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_GATEWAY_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Relay server host address
    pub host: String,
    /// Relay server port
    pub port: u16,
    pub gateway: GatewayConfig,
    /// Deadline applied to every outbound HTTP request
    pub request_timeout: Duration,
    /// sled database holding the local note collection
    pub db_path: PathBuf,
    /// Relay endpoint the companion sends AI requests to
    pub relay_url: String,
    pub dictionary_url: String,
    pub oembed_url: String,
}

impl Default for Config {
    fn default() -> Self {
        let host = "127.0.0.1".to_string();
        let port = 3000;
        Self {
            relay_url: relay_endpoint(&host, port),
            host,
            port,
            gateway: GatewayConfig::default(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            dictionary_url: DICTIONARY_API_URL.to_string(),
            oembed_url: OEMBED_URL.to_string(),
        }
    }
}

fn relay_endpoint(host: &str, port: u16) -> String {
    format!("http://{}:{}/api/ai-explain", host, port)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let host = env::var("HOST").unwrap_or(defaults.host);
        let port = match env::var("PORT") {
            Ok(p) => p.parse()?,
            Err(_) => defaults.port,
        };
        let request_timeout = match env::var("REQUEST_TIMEOUT_SECS") {
            Ok(s) => Duration::from_secs(s.parse()?),
            Err(_) => defaults.request_timeout,
        };

        let gateway = GatewayConfig {
            url: env::var("AI_GATEWAY_URL").unwrap_or(defaults.gateway.url),
            api_key: env::var("AI_GATEWAY_API_KEY")
                .or_else(|_| env::var("LOVABLE_API_KEY"))
                .ok(),
            model: env::var("AI_MODEL").unwrap_or(defaults.gateway.model),
        };

        let relay_url = env::var("RELAY_URL").unwrap_or_else(|_| relay_endpoint(&host, port));

        Ok(Self {
            host,
            port,
            gateway,
            request_timeout,
            db_path: env::var("NOTES_DB")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            relay_url,
            dictionary_url: env::var("DICTIONARY_URL").unwrap_or(defaults.dictionary_url),
            oembed_url: env::var("OEMBED_URL").unwrap_or(defaults.oembed_url),
        })
    }
}
