//! Video URL parsing.
//!
//! This module extracts a video id and an optional start offset from a URL
//! pasted by the user. Two host shapes are recognised:
//! - `youtube.com` (any subdomain): id in the `v` query parameter
//! - `youtu.be` short links: id is the first path segment
//!
//! Anything else yields an absent id, which callers treat as invalid input
//! rather than an error.

use crate::models::ParsedVideoUrl;
use url::Url;

const PRIMARY_HOST: &str = "youtube.com";
const SHORT_LINK_HOST: &str = "youtu.be";
const OFFSET_PARAM: &str = "t";
const VIDEO_PARAM: &str = "v";

/// Which of the recognised host shapes a URL uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostKind {
    Primary,
    ShortLink,
}

fn host_kind(host: &str) -> Option<HostKind> {
    let host_lower = host.to_lowercase();

    if host_lower.contains(PRIMARY_HOST) {
        Some(HostKind::Primary)
    } else if host_lower.contains(SHORT_LINK_HOST) {
        Some(HostKind::ShortLink)
    } else {
        None
    }
}

fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Parse a start offset such as `90`, `90s`, `1m30s` or `1h2m3s`.
///
/// Digits followed by `h`, `m` or `s` are summed with the matching unit;
/// trailing digits without a unit count as seconds. Parsing stops at the
/// first unexpected character, so `12abc` is 12 and `abc` is 0.
fn parse_offset(raw: &str) -> u32 {
    let mut total: u64 = 0;
    let mut current: Option<u64> = None;

    for c in raw.trim().chars() {
        match c {
            '0'..='9' => {
                let digit = u64::from(c as u8 - b'0');
                current = Some(current.unwrap_or(0).saturating_mul(10).saturating_add(digit));
            }
            'h' | 'm' | 's' => {
                let Some(value) = current.take() else { break };
                let unit = match c {
                    'h' => 3600,
                    'm' => 60,
                    _ => 1,
                };
                total = total.saturating_add(value.saturating_mul(unit));
            }
            _ => break,
        }
    }

    total = total.saturating_add(current.unwrap_or(0));
    u32::try_from(total).unwrap_or(u32::MAX)
}

/// Parse a pasted video URL
///
/// # Arguments
/// * `url_str` - The raw text the user entered
///
/// # Returns
/// The video id (absent when the input is not a recognised video link) and
/// the start offset in seconds (0 when absent or unparsable).
pub fn parse_video_url(url_str: &str) -> ParsedVideoUrl {
    let url = match Url::parse(url_str.trim()) {
        Ok(u) => u,
        Err(_) => return ParsedVideoUrl::default(),
    };

    let kind = match url.host_str().and_then(host_kind) {
        Some(k) => k,
        None => return ParsedVideoUrl::default(),
    };

    let video_id = match kind {
        HostKind::Primary => query_param(&url, VIDEO_PARAM),
        HostKind::ShortLink => url
            .path_segments()
            .and_then(|mut segments| segments.next())
            .map(|s| s.to_string()),
    }
    .filter(|id| !id.is_empty());

    let start_offset_seconds = query_param(&url, OFFSET_PARAM)
        .map(|t| parse_offset(&t))
        .unwrap_or(0);

    ParsedVideoUrl {
        video_id,
        start_offset_seconds,
    }
}

/// Canonical watch URL for a video id
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_of(url: &str) -> Option<String> {
        parse_video_url(url).video_id
    }

    #[test]
    fn test_watch_url_with_offset() {
        let parsed = parse_video_url("https://www.youtube.com/watch?v=abc123&t=90s");
        assert_eq!(
            parsed,
            ParsedVideoUrl {
                video_id: Some("abc123".to_string()),
                start_offset_seconds: 90,
            }
        );
    }

    #[test]
    fn test_short_link() {
        let parsed = parse_video_url("https://youtu.be/xyz789");
        assert_eq!(parsed.video_id.as_deref(), Some("xyz789"));
        assert_eq!(parsed.start_offset_seconds, 0);

        let parsed = parse_video_url("https://youtu.be/xyz789?t=42");
        assert_eq!(parsed.start_offset_seconds, 42);
    }

    #[test]
    fn test_not_a_url() {
        assert_eq!(parse_video_url("not a url"), ParsedVideoUrl::default());
        assert_eq!(id_of(""), None);
        assert_eq!(id_of("youtube.com/watch?v=abc"), None);
    }

    #[test]
    fn test_unknown_host() {
        assert_eq!(id_of("https://vimeo.com/12345"), None);
        assert_eq!(id_of("https://example.com/watch?v=abc123"), None);
    }

    #[test]
    fn test_subdomains_and_param_order() {
        assert_eq!(id_of("https://m.youtube.com/watch?v=mob1"), Some("mob1".to_string()));
        assert_eq!(
            id_of("https://www.youtube.com/watch?list=PL1&v=abc&index=2"),
            Some("abc".to_string())
        );
        assert_eq!(id_of("https://WWW.YOUTUBE.COM/watch?v=Caps"), Some("Caps".to_string()));
    }

    #[test]
    fn test_empty_ids_are_absent() {
        assert_eq!(id_of("https://www.youtube.com/watch?v="), None);
        assert_eq!(id_of("https://www.youtube.com/watch"), None);
        assert_eq!(id_of("https://youtu.be/"), None);
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("90"), 90);
        assert_eq!(parse_offset("90s"), 90);
        assert_eq!(parse_offset("1m30s"), 90);
        assert_eq!(parse_offset("1h2m3s"), 3723);
        assert_eq!(parse_offset("12abc"), 12);
        assert_eq!(parse_offset("abc"), 0);
        assert_eq!(parse_offset(""), 0);
        assert_eq!(parse_offset("99999999999999"), u32::MAX);
    }

    #[test]
    fn test_unparsable_offset_defaults_to_zero() {
        let parsed = parse_video_url("https://www.youtube.com/watch?v=abc&t=later");
        assert_eq!(parsed.video_id.as_deref(), Some("abc"));
        assert_eq!(parsed.start_offset_seconds, 0);
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(watch_url("abc123"), "https://www.youtube.com/watch?v=abc123");
    }
}
