use serde::{Deserialize, Serialize};

use crate::model::text_range::TextRange;

/// Preview length for highlight list entries, in characters.
pub const PREVIEW_LEN: usize = 50;

/// A saved place: the chapter it points at, plus display metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub chapter: String,
    pub title: String,
    pub date: String,
}

impl Bookmark {
    pub fn new(
        chapter: impl Into<String>,
        title: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            chapter: chapter.into(),
            title: title.into(),
            date: date.into(),
        }
    }
}

/// Marker colors available for highlights.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HighlightColor {
    #[default]
    Yellow,
    Green,
    Blue,
    Pink,
}

impl HighlightColor {
    pub const ALL: [HighlightColor; 4] = [
        HighlightColor::Yellow,
        HighlightColor::Green,
        HighlightColor::Blue,
        HighlightColor::Pink,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            HighlightColor::Yellow => "Yellow",
            HighlightColor::Green => "Green",
            HighlightColor::Blue => "Blue",
            HighlightColor::Pink => "Pink",
        }
    }
}

/// A highlighted passage anchored to a chapter by character offsets.
///
/// `text` is the sidebar preview; `full_text` keeps the whole passage so the
/// preview can be regenerated and the anchor checked against the body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub chapter: String,
    pub text: String,
    #[serde(default)]
    pub full_text: String,
    pub color: HighlightColor,
    pub date: String,
    #[serde(default)]
    pub start_offset: usize,
    #[serde(default)]
    pub end_offset: usize,
}

impl Highlight {
    pub fn new(
        chapter: impl Into<String>,
        full_text: impl Into<String>,
        color: HighlightColor,
        range: TextRange,
        date: impl Into<String>,
    ) -> Self {
        let full_text = full_text.into();
        Self {
            chapter: chapter.into(),
            text: preview(&full_text),
            full_text,
            color,
            date: date.into(),
            start_offset: range.start_offset,
            end_offset: range.end_offset,
        }
    }

    pub fn range(&self) -> TextRange {
        TextRange::new(self.start_offset, self.end_offset)
    }

    /// True when the stored offsets still describe a usable span.
    pub fn is_anchored(&self) -> bool {
        !self.range().is_empty()
    }
}

/// First [`PREVIEW_LEN`] characters of a passage, with a trailing ellipsis
/// when there is more.
pub fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_LEN).collect();
    if text.chars().count() > PREVIEW_LEN {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_text_is_unchanged() {
        assert_eq!(preview("short"), "short");
        let exact: String = "x".repeat(PREVIEW_LEN);
        assert_eq!(preview(&exact), exact);
    }

    #[test]
    fn test_preview_truncates_long_text() {
        let long: String = "a".repeat(60);
        let got = preview(&long);
        assert_eq!(got.chars().count(), PREVIEW_LEN + 3);
        assert!(got.ends_with("..."));
        assert!(got.starts_with(&"a".repeat(PREVIEW_LEN)));
    }

    #[test]
    fn test_preview_counts_chars_not_bytes() {
        let long: String = "é".repeat(51);
        let got = preview(&long);
        assert_eq!(got.chars().count(), PREVIEW_LEN + 3);
    }

    #[test]
    fn test_highlight_new_fills_preview_and_offsets() {
        let h = Highlight::new(
            "ch2",
            "b".repeat(60),
            HighlightColor::Green,
            TextRange::new(10, 70),
            "2024-01-05",
        );
        assert_eq!(h.text.chars().count(), PREVIEW_LEN + 3);
        assert_eq!(h.full_text.chars().count(), 60);
        assert_eq!(h.range(), TextRange::new(10, 70));
        assert!(h.is_anchored());
    }

    #[test]
    fn test_color_serializes_lowercase() {
        let json = serde_json::to_string(&HighlightColor::Pink).unwrap();
        assert_eq!(json, "\"pink\"");
        let back: HighlightColor = serde_json::from_str("\"blue\"").unwrap();
        assert_eq!(back, HighlightColor::Blue);
    }

    #[test]
    fn test_highlight_json_uses_camel_case_keys() {
        let h = Highlight::new(
            "intro",
            "words",
            HighlightColor::Yellow,
            TextRange::new(0, 5),
            "2024-01-05",
        );
        let v = serde_json::to_value(&h).unwrap();
        assert!(v.get("fullText").is_some());
        assert!(v.get("startOffset").is_some());
        assert!(v.get("full_text").is_none());
    }

    #[test]
    fn test_highlight_missing_offsets_default_to_unanchored() {
        let json = r#"{"chapter":"ch1","text":"old","color":"yellow","date":"1/1/2024"}"#;
        let h: Highlight = serde_json::from_str(json).unwrap();
        assert_eq!(h.full_text, "");
        assert!(!h.is_anchored());
    }
}
