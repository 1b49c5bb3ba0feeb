//! The persisted reader state: position, appearance, annotations, progress.
//!
//! The state serializes to a single JSON document with camelCase keys. Every
//! field carries a default so documents written by older versions load
//! cleanly, with missing fields filled in and unknown fields ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Bookmark, Highlight};

pub const FONT_SIZE_MIN: u8 = 14;
pub const FONT_SIZE_MAX: u8 = 24;
pub const FONT_SIZE_DEFAULT: u8 = 18;
pub const FONT_SIZE_STEP: i8 = 2;

/// Suffix for per-chapter scroll keys in the progress map.
const SCROLL_SUFFIX: &str = "_scroll";

/// Color scheme for the whole interface.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Theme::Dark)
    }
}

/// One value in the progress map.
///
/// The map mixes two kinds of entries under one namespace: `"ch3": true`
/// marks a chapter read, `"ch3_scroll": 37.5` remembers scroll depth. The
/// untagged representation keeps that wire shape.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ProgressEntry {
    Read(bool),
    Scroll(f64),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ReaderState {
    pub current_chapter: String,
    pub font_size: u8,
    pub theme: Theme,
    pub bookmarks: Vec<Bookmark>,
    pub highlights: Vec<Highlight>,
    pub progress: BTreeMap<String, ProgressEntry>,
}

impl Default for ReaderState {
    fn default() -> Self {
        Self {
            current_chapter: "intro".to_string(),
            font_size: FONT_SIZE_DEFAULT,
            theme: Theme::Light,
            bookmarks: Vec::new(),
            highlights: Vec::new(),
            progress: BTreeMap::new(),
        }
    }
}

impl ReaderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step the font size, clamped to [`FONT_SIZE_MIN`]..=[`FONT_SIZE_MAX`].
    /// Returns false when already at the limit.
    pub fn adjust_font_size(&mut self, delta: i8) -> bool {
        let next = (self.font_size as i16 + delta as i16)
            .clamp(FONT_SIZE_MIN as i16, FONT_SIZE_MAX as i16) as u8;
        let changed = next != self.font_size;
        self.font_size = next;
        changed
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    pub fn mark_read(&mut self, chapter: &str) {
        self.progress
            .insert(chapter.to_string(), ProgressEntry::Read(true));
    }

    pub fn is_read(&self, chapter: &str) -> bool {
        matches!(
            self.progress.get(chapter),
            Some(ProgressEntry::Read(true))
        )
    }

    /// Number of chapters flagged read. Scroll entries never count, whatever
    /// their value.
    pub fn read_count(&self) -> usize {
        self.progress
            .values()
            .filter(|v| matches!(v, ProgressEntry::Read(true)))
            .count()
    }

    pub fn set_scroll_depth(&mut self, chapter: &str, depth: f64) {
        self.progress.insert(
            format!("{chapter}{SCROLL_SUFFIX}"),
            ProgressEntry::Scroll(depth.clamp(0.0, 100.0)),
        );
    }

    pub fn scroll_depth(&self, chapter: &str) -> Option<f64> {
        match self.progress.get(&format!("{chapter}{SCROLL_SUFFIX}")) {
            Some(ProgressEntry::Scroll(depth)) => Some(*depth),
            _ => None,
        }
    }

    /// Add or remove the bookmark for a chapter. Returns true when one was
    /// added, false when an existing one was removed.
    pub fn toggle_bookmark(
        &mut self,
        chapter: &str,
        title: impl Into<String>,
        date: impl Into<String>,
    ) -> bool {
        match self.bookmarks.iter().position(|b| b.chapter == chapter) {
            Some(index) => {
                self.bookmarks.remove(index);
                false
            }
            None => {
                self.bookmarks.push(Bookmark::new(chapter, title, date));
                true
            }
        }
    }

    pub fn is_bookmarked(&self, chapter: &str) -> bool {
        self.bookmarks.iter().any(|b| b.chapter == chapter)
    }

    pub fn add_highlight(&mut self, highlight: Highlight) {
        self.highlights.push(highlight);
    }

    pub fn highlights_for<'a>(
        &'a self,
        chapter: &'a str,
    ) -> impl Iterator<Item = &'a Highlight> {
        self.highlights.iter().filter(move |h| h.chapter == chapter)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
