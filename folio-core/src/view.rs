//! Pure view models shared by the terminal and web frontends.
//!
//! Everything here is a plain function of book + state, so the rendering
//! code stays free of decisions and the decisions stay testable.

use crate::model::{Book, HighlightColor, TextRange};
use crate::state::ReaderState;

pub const NO_BOOKMARKS: &str = "No bookmarks yet";
pub const NO_HIGHLIGHTS: &str = "No highlights yet";

/// One row of the sidebar, top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub enum SidebarRow {
    Section(&'static str),
    Toc {
        id: String,
        title: String,
        read: bool,
        current: bool,
    },
    Bookmark {
        chapter: String,
        title: String,
        date: String,
    },
    Highlight {
        chapter: String,
        text: String,
        color: HighlightColor,
        date: String,
        start_offset: usize,
    },
    Placeholder(&'static str),
}

impl SidebarRow {
    /// Rows the selection can land on. Headers and placeholders are skipped.
    pub fn selectable(&self) -> bool {
        matches!(
            self,
            SidebarRow::Toc { .. } | SidebarRow::Bookmark { .. } | SidebarRow::Highlight { .. }
        )
    }
}

/// The full sidebar: table of contents, then bookmarks, then highlights,
/// with a placeholder line for each empty list.
pub fn sidebar_rows(book: &Book, state: &ReaderState) -> Vec<SidebarRow> {
    let mut rows = Vec::new();

    rows.push(SidebarRow::Section("Contents"));
    for chapter in &book.chapters {
        rows.push(SidebarRow::Toc {
            id: chapter.id.clone(),
            title: chapter.title.clone(),
            read: state.is_read(&chapter.id),
            current: chapter.id == state.current_chapter,
        });
    }

    rows.push(SidebarRow::Section("Bookmarks"));
    if state.bookmarks.is_empty() {
        rows.push(SidebarRow::Placeholder(NO_BOOKMARKS));
    } else {
        for bookmark in &state.bookmarks {
            rows.push(SidebarRow::Bookmark {
                chapter: bookmark.chapter.clone(),
                title: bookmark.title.clone(),
                date: bookmark.date.clone(),
            });
        }
    }

    rows.push(SidebarRow::Section("Highlights"));
    if state.highlights.is_empty() {
        rows.push(SidebarRow::Placeholder(NO_HIGHLIGHTS));
    } else {
        for highlight in &state.highlights {
            rows.push(SidebarRow::Highlight {
                chapter: highlight.chapter.clone(),
                text: highlight.text.clone(),
                color: highlight.color,
                date: highlight.date.clone(),
                start_offset: highlight.start_offset,
            });
        }
    }

    rows
}

/// Share of chapters marked read, as a rounded whole percentage.
pub fn reading_percent(book: &Book, state: &ReaderState) -> u8 {
    if book.is_empty() {
        return 0;
    }
    let ratio = state.read_count() as f64 / book.len() as f64;
    ((ratio * 100.0).round() as u8).min(100)
}

pub fn progress_label(percent: u8) -> String {
    format!("{percent}% read")
}

/// Position line for the status bar, e.g. `Chapter 5 of 13`.
pub fn chapter_label(book: &Book, state: &ReaderState) -> String {
    match book.position(&state.current_chapter) {
        Some(index) => format!("Chapter {} of {}", index + 1, book.len()),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavButtons {
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

/// Which of the previous/next controls are live at the current position.
pub fn nav_buttons(book: &Book, state: &ReaderState) -> NavButtons {
    match book.position(&state.current_chapter) {
        Some(index) => NavButtons {
            prev_enabled: index > 0,
            next_enabled: index + 1 < book.len(),
        },
        None => NavButtons {
            prev_enabled: false,
            next_enabled: false,
        },
    }
}

/// Styling applied to a run of characters in the reading pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    Highlight(HighlightColor),
    Selection,
}

/// The styling in effect at one absolute offset. The selection wins over
/// highlights; among overlapping highlights the later one wins, matching
/// their stored order.
pub fn span_kind_at(
    offset: usize,
    highlights: &[(TextRange, HighlightColor)],
    selection: Option<TextRange>,
) -> Option<SpanKind> {
    let mut kind = None;
    for (range, color) in highlights {
        if range.contains(offset) {
            kind = Some(SpanKind::Highlight(*color));
        }
    }
    if let Some(range) = selection {
        if range.contains(offset) {
            kind = Some(SpanKind::Selection);
        }
    }
    kind
}

/// Split one line into styled runs. `line_start` is the absolute char offset
/// of the line's first character.
pub fn line_spans(
    line: &str,
    line_start: usize,
    highlights: &[(TextRange, HighlightColor)],
    selection: Option<TextRange>,
) -> Vec<(String, Option<SpanKind>)> {
    let mut runs: Vec<(String, Option<SpanKind>)> = Vec::new();
    for (col, ch) in line.chars().enumerate() {
        let kind = span_kind_at(line_start + col, highlights, selection);
        match runs.last_mut() {
            Some((text, last)) if *last == kind => text.push(ch),
            _ => runs.push((ch.to_string(), kind)),
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Highlight;

    fn sample_state() -> (Book, ReaderState) {
        (Book::sample(), ReaderState::default())
    }

    #[test]
    fn test_sidebar_shows_placeholders_when_empty() {
        let (book, state) = sample_state();
        let rows = sidebar_rows(&book, &state);
        assert!(rows.contains(&SidebarRow::Placeholder(NO_BOOKMARKS)));
        assert!(rows.contains(&SidebarRow::Placeholder(NO_HIGHLIGHTS)));
        let toc = rows.iter().filter(|r| matches!(r, SidebarRow::Toc { .. }));
        assert_eq!(toc.count(), book.len());
    }

    #[test]
    fn test_sidebar_lists_annotations_in_order() {
        let (book, mut state) = sample_state();
        state.toggle_bookmark("ch2", "The Pilot's Examination", "2024-03-01");
        state.add_highlight(Highlight::new(
            "ch1",
            "a lamp burning under the water",
            HighlightColor::Green,
            TextRange::new(20, 50),
            "2024-03-02",
        ));
        let rows = sidebar_rows(&book, &state);
        assert!(!rows.contains(&SidebarRow::Placeholder(NO_BOOKMARKS)));
        assert!(rows.iter().any(|r| matches!(
            r,
            SidebarRow::Bookmark { chapter, .. } if chapter == "ch2"
        )));
        assert!(rows.iter().any(|r| matches!(
            r,
            SidebarRow::Highlight { color: HighlightColor::Green, .. }
        )));
    }

    #[test]
    fn test_section_rows_are_not_selectable() {
        assert!(!SidebarRow::Section("Contents").selectable());
        assert!(!SidebarRow::Placeholder(NO_BOOKMARKS).selectable());
        assert!(SidebarRow::Toc {
            id: "ch1".into(),
            title: "t".into(),
            read: false,
            current: false
        }
        .selectable());
    }

    #[test]
    fn test_percent_of_one_read_chapter_in_thirteen() {
        let (book, mut state) = sample_state();
        assert_eq!(reading_percent(&book, &state), 0);
        state.mark_read("intro");
        assert_eq!(reading_percent(&book, &state), 8);
        assert_eq!(progress_label(8), "8% read");
    }

    #[test]
    fn test_percent_is_capped_at_hundred() {
        let (book, mut state) = sample_state();
        for chapter in &book.chapters {
            state.mark_read(&chapter.id);
        }
        state.mark_read("stale-id-from-another-book");
        assert_eq!(reading_percent(&book, &state), 100);
    }

    #[test]
    fn test_nav_buttons_disable_at_the_ends() {
        let (book, mut state) = sample_state();
        let at_start = nav_buttons(&book, &state);
        assert!(!at_start.prev_enabled);
        assert!(at_start.next_enabled);

        state.current_chapter = "ch12".to_string();
        let at_end = nav_buttons(&book, &state);
        assert!(at_end.prev_enabled);
        assert!(!at_end.next_enabled);

        state.current_chapter = "nope".to_string();
        let lost = nav_buttons(&book, &state);
        assert!(!lost.prev_enabled && !lost.next_enabled);
    }

    #[test]
    fn test_chapter_label() {
        let (book, mut state) = sample_state();
        assert_eq!(chapter_label(&book, &state), "Chapter 1 of 13");
        state.current_chapter = "ch12".to_string();
        assert_eq!(chapter_label(&book, &state), "Chapter 13 of 13");
    }

    #[test]
    fn test_line_spans_split_at_boundaries() {
        let highlights = vec![(TextRange::new(2, 5), HighlightColor::Yellow)];
        let runs = line_spans("abcdefg", 0, &highlights, None);
        assert_eq!(
            runs,
            vec![
                ("ab".to_string(), None),
                (
                    "cde".to_string(),
                    Some(SpanKind::Highlight(HighlightColor::Yellow))
                ),
                ("fg".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_selection_wins_over_highlight() {
        let highlights = vec![(TextRange::new(0, 7), HighlightColor::Pink)];
        let runs = line_spans("abcdefg", 0, &highlights, Some(TextRange::new(3, 5)));
        assert_eq!(runs[1], ("de".to_string(), Some(SpanKind::Selection)));
    }

    #[test]
    fn test_line_spans_use_absolute_offsets() {
        let highlights = vec![(TextRange::new(12, 15), HighlightColor::Blue)];
        let runs = line_spans("abcdef", 10, &highlights, None);
        assert_eq!(
            runs,
            vec![
                ("ab".to_string(), None),
                (
                    "cde".to_string(),
                    Some(SpanKind::Highlight(HighlightColor::Blue))
                ),
                ("f".to_string(), None),
            ]
        );
    }
}
