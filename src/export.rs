//! Markdown export for a single note.
//!
//! The output is used both for file downloads and clipboard copies, so it
//! must be byte-for-byte identical for identical input.

use crate::models::VideoNote;
use crate::notes::format_time;

pub fn export_to_markdown(note: &VideoNote) -> String {
    let mut md = format!("# {}\n\n", note.video_title);
    md.push_str(&format!(
        "**Video:** [Watch on YouTube]({})\n\n",
        note.video_url
    ));
    md.push_str(&format!(
        "**Date:** {}\n\n",
        note.updated_at.format("%-m/%-d/%Y")
    ));

    if !note.timestamps.is_empty() {
        md.push_str("## Timestamps\n\n");
        for ts in &note.timestamps {
            md.push_str(&format!("- **{}** - {}\n", format_time(ts.time), ts.label));
        }
        md.push('\n');
    }

    if !note.tags.is_empty() {
        md.push_str(&format!("**Tags:** {}\n\n", note.tags.join(", ")));
    }

    // Content is trusted plain text and goes out unescaped.
    md.push_str("## Notes\n\n");
    md.push_str(&note.content);

    md
}

/// Download filename: every character outside `[A-Za-z0-9]` becomes `_`.
pub fn export_filename(note: &VideoNote) -> String {
    let stem: String = note
        .video_title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}.md", stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Timestamp;
    use chrono::{TimeZone, Utc};

    fn fixed_note() -> VideoNote {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 15, 4, 5).unwrap();
        VideoNote {
            id: "n1".to_string(),
            video_id: "abc123".to_string(),
            video_title: "Rust Lifetimes: Part 1".to_string(),
            video_url: "https://www.youtube.com/watch?v=abc123".to_string(),
            thumbnail_url: "https://img.youtube.com/vi/abc123/maxresdefault.jpg".to_string(),
            content: "Lifetimes are *regions*.\n<not escaped>".to_string(),
            timestamps: vec![
                Timestamp {
                    id: "t1".to_string(),
                    time: 65.0,
                    label: "Elision rules".to_string(),
                    note: None,
                },
                Timestamp {
                    id: "t2".to_string(),
                    time: 3723.0,
                    label: "Variance".to_string(),
                    note: None,
                },
            ],
            created_at: at,
            updated_at: at,
            tags: vec!["rust".to_string(), "types".to_string()],
            folder: None,
        }
    }

    #[test]
    fn test_full_export() {
        let expected = "# Rust Lifetimes: Part 1\n\n\
**Video:** [Watch on YouTube](https://www.youtube.com/watch?v=abc123)\n\n\
**Date:** 3/7/2024\n\n\
## Timestamps\n\n\
- **1:05** - Elision rules\n\
- **1:02:03** - Variance\n\n\
**Tags:** rust, types\n\n\
## Notes\n\n\
Lifetimes are *regions*.\n<not escaped>";
        assert_eq!(export_to_markdown(&fixed_note()), expected);
    }

    #[test]
    fn test_optional_sections_omitted() {
        let mut note = fixed_note();
        note.timestamps.clear();
        note.tags.clear();
        note.content.clear();

        let md = export_to_markdown(&note);
        assert!(!md.contains("## Timestamps"));
        assert!(!md.contains("**Tags:**"));
        assert!(md.ends_with("**Date:** 3/7/2024\n\n## Notes\n\n"));
    }

    #[test]
    fn test_export_is_deterministic() {
        let note = fixed_note();
        assert_eq!(export_to_markdown(&note), export_to_markdown(&note.clone()));
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(export_filename(&fixed_note()), "Rust_Lifetimes__Part_1.md");
    }
}
