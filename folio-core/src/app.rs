//! Application state machine shared by the terminal and web frontends.
//!
//! The frontends translate their input events into calls on [`App`] and
//! render from its fields. All persistence goes through the injected
//! [`StateStore`]; a store that fails to save is logged and tolerated, the
//! session just loses durability.

use crate::cursor::ChapterCursor;
use crate::model::{Book, Chapter, Highlight, HighlightColor, TextRange};
use crate::scroll::{scroll_depth, scroll_row_for_depth, ScrollSaver};
use crate::state::ReaderState;
use crate::store::{self, StateStore};
use crate::view::{self, SidebarRow};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    Visual,
    ColorPicker,
    Help,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Reader,
    Sidebar,
}

pub struct App<S: StateStore> {
    pub book: Book,
    pub state: ReaderState,
    pub mode: Mode,
    pub focus: Focus,
    pub sidebar_open: bool,
    pub narrow: bool,
    pub cursor: ChapterCursor,
    pub scroll_row: usize,
    pub viewport_rows: usize,
    pub selection_anchor: Option<usize>,
    pub picker_index: usize,
    pub sidebar_index: usize,
    pub status: Option<String>,
    saver: ScrollSaver,
    pending_depth: Option<f64>,
    store: S,
}

impl<S: StateStore> App<S> {
    pub fn new(book: Book, store: S) -> Self {
        let mut state = store::load_or_default(&store);
        if !book.contains(&state.current_chapter) {
            if let Some(first) = book.first_id() {
                state.current_chapter = first.to_string();
            }
        }
        let initial = state.current_chapter.clone();

        let mut app = Self {
            book,
            state,
            mode: Mode::Normal,
            focus: Focus::Reader,
            sidebar_open: true,
            narrow: false,
            cursor: ChapterCursor::default(),
            scroll_row: 0,
            viewport_rows: 1,
            selection_anchor: None,
            picker_index: 0,
            sidebar_index: 0,
            status: None,
            saver: ScrollSaver::new(),
            pending_depth: None,
            store,
        };
        app.show_chapter(&initial);
        app.pending_depth = app.state.scroll_depth(&initial);
        app.sidebar_index = app.first_selectable_row();
        app
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ----- layout -----

    /// Narrow layouts drop the persistent sidebar; it becomes an overlay the
    /// user summons explicitly. Only a change of width class has any effect,
    /// so callers may report the current width every frame.
    pub fn set_narrow(&mut self, narrow: bool) {
        if narrow == self.narrow {
            return;
        }
        self.narrow = narrow;
        if narrow {
            self.sidebar_open = false;
            if self.focus == Focus::Sidebar {
                self.focus = Focus::Reader;
            }
        }
    }

    pub fn set_viewport(&mut self, rows: usize) {
        self.viewport_rows = rows.max(1);
        if let Some(depth) = self.pending_depth.take() {
            self.scroll_row =
                scroll_row_for_depth(depth, self.cursor.line_count(), self.viewport_rows);
            self.cursor.set_row(self.scroll_row);
        }
        self.scroll_row = self.scroll_row.min(self.max_scroll());
    }

    fn max_scroll(&self) -> usize {
        self.cursor.line_count().saturating_sub(self.viewport_rows)
    }

    // ----- chapter navigation -----

    pub fn current_chapter(&self) -> Option<&Chapter> {
        self.book.chapter(&self.state.current_chapter)
    }

    /// Switch chapters: reset the view, mark the chapter read, save. An
    /// unknown id is a no-op.
    pub fn show_chapter(&mut self, id: &str) -> bool {
        let Some(chapter) = self.book.chapter(id) else {
            return false;
        };
        self.cursor = ChapterCursor::new(&chapter.body);
        self.scroll_row = 0;
        self.saver.cancel();
        self.pending_depth = None;
        self.selection_anchor = None;
        self.mode = Mode::Normal;
        self.state.current_chapter = id.to_string();
        self.state.mark_read(id);
        if self.narrow {
            self.sidebar_open = false;
            self.focus = Focus::Reader;
        }
        self.persist();
        true
    }

    pub fn next_chapter(&mut self) -> bool {
        self.step_chapter(1)
    }

    pub fn prev_chapter(&mut self) -> bool {
        self.step_chapter(-1)
    }

    fn step_chapter(&mut self, direction: isize) -> bool {
        let Some(index) = self.book.position(&self.state.current_chapter) else {
            return false;
        };
        let Some(target) = index.checked_add_signed(direction) else {
            return false;
        };
        match self.book.chapter_at(target) {
            Some(chapter) => {
                let id = chapter.id.clone();
                self.show_chapter(&id)
            }
            None => false,
        }
    }

    // ----- reading pane movement -----

    pub fn cursor_up(&mut self, now_ms: u64) {
        self.cursor.move_up();
        self.after_cursor_move(now_ms);
    }

    pub fn cursor_down(&mut self, now_ms: u64) {
        self.cursor.move_down();
        self.after_cursor_move(now_ms);
    }

    pub fn cursor_left(&mut self) {
        self.cursor.move_left();
    }

    pub fn cursor_right(&mut self) {
        self.cursor.move_right();
    }

    pub fn cursor_word_forward(&mut self, now_ms: u64) {
        self.cursor.word_forward();
        self.after_cursor_move(now_ms);
    }

    pub fn cursor_word_back(&mut self, now_ms: u64) {
        self.cursor.word_back();
        self.after_cursor_move(now_ms);
    }

    pub fn cursor_line_start(&mut self) {
        self.cursor.move_to_line_start();
    }

    pub fn cursor_line_end(&mut self) {
        self.cursor.move_to_line_end();
    }

    pub fn cursor_top(&mut self, now_ms: u64) {
        self.cursor.move_to_top();
        self.after_cursor_move(now_ms);
    }

    pub fn cursor_bottom(&mut self, now_ms: u64) {
        self.cursor.move_to_bottom();
        self.after_cursor_move(now_ms);
    }

    /// Scroll the view without moving the cursor. Used by the mouse wheel.
    pub fn scroll_view(&mut self, delta: isize, now_ms: u64) {
        let before = self.scroll_row;
        self.scroll_row = self
            .scroll_row
            .saturating_add_signed(delta)
            .min(self.max_scroll());
        if self.scroll_row != before {
            self.saver.schedule(now_ms);
        }
    }

    pub fn half_page_down(&mut self, now_ms: u64) {
        self.cursor.move_vertical((self.viewport_rows / 2).max(1) as isize);
        self.after_cursor_move(now_ms);
    }

    pub fn half_page_up(&mut self, now_ms: u64) {
        self.cursor
            .move_vertical(-((self.viewport_rows / 2).max(1) as isize));
        self.after_cursor_move(now_ms);
    }

    fn after_cursor_move(&mut self, now_ms: u64) {
        let before = self.scroll_row;
        self.ensure_cursor_visible();
        if self.scroll_row != before {
            self.saver.schedule(now_ms);
        }
    }

    fn ensure_cursor_visible(&mut self) {
        let row = self.cursor.row();
        if row < self.scroll_row {
            self.scroll_row = row;
        } else if row >= self.scroll_row + self.viewport_rows {
            self.scroll_row = row + 1 - self.viewport_rows;
        }
    }

    // ----- selection and highlights -----

    pub fn enter_visual(&mut self) -> bool {
        if self.cursor.max_offset() == 0 {
            return false;
        }
        self.mode = Mode::Visual;
        self.selection_anchor = Some(self.cursor.offset());
        true
    }

    pub fn exit_visual(&mut self) {
        self.mode = Mode::Normal;
        self.selection_anchor = None;
    }

    /// The selected span, anchor through cursor inclusive.
    pub fn selection_range(&self) -> Option<TextRange> {
        let anchor = self.selection_anchor?;
        let here = self.cursor.offset();
        let (start, end) = if anchor <= here {
            (anchor, here + 1)
        } else {
            (here, anchor + 1)
        };
        Some(TextRange::new(start, end.min(self.cursor.max_offset())))
    }

    /// The selected text, or `None` when the selection holds nothing but
    /// whitespace.
    pub fn selection_text(&self) -> Option<String> {
        let range = self.selection_range()?;
        let chapter = self.current_chapter()?;
        let text = range.slice(&chapter.body);
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    pub fn open_color_picker(&mut self) -> bool {
        if self.selection_text().is_none() {
            return false;
        }
        self.mode = Mode::ColorPicker;
        self.picker_index = 0;
        true
    }

    pub fn close_color_picker(&mut self) {
        self.mode = Mode::Visual;
    }

    pub fn picker_next(&mut self) {
        self.picker_index = (self.picker_index + 1) % HighlightColor::ALL.len();
    }

    pub fn picker_prev(&mut self) {
        let len = HighlightColor::ALL.len();
        self.picker_index = (self.picker_index + len - 1) % len;
    }

    pub fn picker_color(&self) -> HighlightColor {
        HighlightColor::ALL[self.picker_index]
    }

    pub fn confirm_highlight(&mut self, date: &str) -> bool {
        self.apply_highlight(self.picker_color(), date)
    }

    /// Save the current selection as a highlight and leave visual mode.
    pub fn apply_highlight(&mut self, color: HighlightColor, date: &str) -> bool {
        let Some(range) = self.selection_range() else {
            return false;
        };
        let Some(text) = self.selection_text() else {
            return false;
        };
        let chapter = self.state.current_chapter.clone();
        self.state
            .add_highlight(Highlight::new(chapter, text, color, range, date));
        self.persist();
        self.exit_visual();
        self.set_status("Highlight added");
        true
    }

    /// Anchored highlights of the open chapter, ready for span styling.
    pub fn current_highlights(&self) -> Vec<(TextRange, HighlightColor)> {
        self.state
            .highlights_for(&self.state.current_chapter)
            .filter(|h| h.is_anchored())
            .map(|h| (h.range(), h.color))
            .collect()
    }

    // ----- bookmarks, font, theme -----

    pub fn toggle_bookmark(&mut self, date: &str) -> bool {
        let id = self.state.current_chapter.clone();
        let title = self.book.title_of(&id);
        let added = self.state.toggle_bookmark(&id, title, date);
        self.persist();
        self.set_status(if added {
            "Bookmark added"
        } else {
            "Bookmark removed"
        });
        added
    }

    pub fn adjust_font_size(&mut self, delta: i8) -> bool {
        let changed = self.state.adjust_font_size(delta);
        self.persist();
        self.set_status(format!("Font size {}px", self.state.font_size));
        changed
    }

    pub fn toggle_theme(&mut self) {
        let theme = self.state.toggle_theme();
        self.persist();
        self.set_status(match theme {
            crate::state::Theme::Dark => "Dark theme",
            crate::state::Theme::Light => "Light theme",
        });
    }

    // ----- sidebar -----

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
        self.focus = if self.sidebar_open {
            Focus::Sidebar
        } else {
            Focus::Reader
        };
    }

    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Reader if self.sidebar_open => Focus::Sidebar,
            _ => Focus::Reader,
        };
    }

    fn first_selectable_row(&self) -> usize {
        view::sidebar_rows(&self.book, &self.state)
            .iter()
            .position(SidebarRow::selectable)
            .unwrap_or(0)
    }

    pub fn sidebar_down(&mut self) {
        let rows = view::sidebar_rows(&self.book, &self.state);
        if let Some(next) =
            (self.sidebar_index + 1..rows.len()).find(|&i| rows[i].selectable())
        {
            self.sidebar_index = next;
        }
    }

    pub fn sidebar_up(&mut self) {
        let rows = view::sidebar_rows(&self.book, &self.state);
        if let Some(prev) = (0..self.sidebar_index.min(rows.len()))
            .rev()
            .find(|&i| rows[i].selectable())
        {
            self.sidebar_index = prev;
        }
    }

    /// Open whatever the sidebar selection points at.
    pub fn activate_sidebar_row(&mut self) -> bool {
        let rows = view::sidebar_rows(&self.book, &self.state);
        match rows.get(self.sidebar_index) {
            Some(SidebarRow::Toc { id, .. }) => {
                let id = id.clone();
                self.focus = Focus::Reader;
                self.show_chapter(&id)
            }
            Some(SidebarRow::Bookmark { chapter, .. }) => {
                let id = chapter.clone();
                self.focus = Focus::Reader;
                self.show_chapter(&id)
            }
            Some(SidebarRow::Highlight {
                chapter,
                start_offset,
                ..
            }) => {
                let id = chapter.clone();
                let offset = *start_offset;
                self.focus = Focus::Reader;
                if self.show_chapter(&id) {
                    self.cursor.set_offset(offset);
                    self.ensure_cursor_visible();
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    // ----- help, status -----

    pub fn toggle_help(&mut self) {
        self.mode = match self.mode {
            Mode::Help => Mode::Normal,
            _ => Mode::Help,
        };
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    // ----- persistence -----

    /// Flush the debounced scroll save if one is due.
    pub fn tick(&mut self, now_ms: u64) {
        if self.saver.take_due(now_ms) {
            self.record_scroll_depth();
            self.persist();
        }
    }

    /// Flush everything immediately. Called on the way out.
    pub fn save_now(&mut self) {
        if self.saver.is_pending() {
            self.saver.cancel();
            self.record_scroll_depth();
        }
        self.persist();
    }

    fn record_scroll_depth(&mut self) {
        let depth = scroll_depth(
            self.scroll_row,
            self.cursor.line_count(),
            self.viewport_rows,
        );
        let id = self.state.current_chapter.clone();
        self.state.set_scroll_depth(&id, depth);
    }

    fn persist(&mut self) {
        match self.state.to_json() {
            Ok(json) => {
                if let Err(err) = self.store.save(&json) {
                    log::warn!("failed to save reader state: {err}");
                }
            }
            Err(err) => log::warn!("failed to serialize reader state: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scroll::SCROLL_DEBOUNCE_MS;
    use crate::state::Theme;
    use crate::store::MemoryStore;
    use crate::view::reading_percent;
    use anyhow::anyhow;

    fn sample_app() -> App<MemoryStore> {
        App::new(Book::sample(), MemoryStore::new())
    }

    fn tiny_app(text: &str) -> App<MemoryStore> {
        App::new(Book::parse("T", text), MemoryStore::new())
    }

    #[test]
    fn test_new_marks_first_chapter_read_and_saves() {
        let app = sample_app();
        assert_eq!(app.state.current_chapter, "intro");
        assert!(app.state.is_read("intro"));
        assert_eq!(reading_percent(&app.book, &app.state), 8);
        let doc = app.store().doc().unwrap();
        assert!(doc.contains("\"intro\":true"));
    }

    #[test]
    fn test_next_chapter_advances_and_accumulates_progress() {
        let mut app = sample_app();
        assert!(app.next_chapter());
        assert_eq!(app.state.current_chapter, "ch1");
        assert!(app.state.is_read("ch1"));
        assert_eq!(reading_percent(&app.book, &app.state), 15);
        assert_eq!(app.scroll_row, 0);
    }

    #[test]
    fn test_prev_chapter_stops_at_the_front() {
        let mut app = sample_app();
        assert!(!app.prev_chapter());
        assert_eq!(app.state.current_chapter, "intro");
        app.state.current_chapter = "ch12".to_string();
        assert!(!app.next_chapter());
    }

    #[test]
    fn test_show_chapter_rejects_unknown_id() {
        let mut app = sample_app();
        assert!(!app.show_chapter("chapter-99"));
        assert_eq!(app.state.current_chapter, "intro");
        assert!(!app.state.progress.contains_key("chapter-99"));
    }

    #[test]
    fn test_saved_position_is_restored() {
        let store = MemoryStore::with_doc(r#"{"currentChapter":"ch5"}"#);
        let app = App::new(Book::sample(), store);
        assert_eq!(app.state.current_chapter, "ch5");
    }

    #[test]
    fn test_stale_saved_position_falls_back_to_first_chapter() {
        let store = MemoryStore::with_doc(r#"{"currentChapter":"gone"}"#);
        let app = App::new(Book::sample(), store);
        assert_eq!(app.state.current_chapter, "intro");
    }

    #[test]
    fn test_saved_scroll_depth_is_restored_on_first_layout() {
        let store = MemoryStore::with_doc(
            r#"{"currentChapter":"intro","progress":{"intro_scroll":50.0}}"#,
        );
        let mut app = App::new(Book::sample(), store);
        app.set_viewport(2);
        assert_eq!(app.scroll_row, 2);
        assert_eq!(app.cursor.row(), 2);
    }

    #[test]
    fn test_scroll_save_waits_for_the_debounce() {
        let mut app = sample_app();
        app.set_viewport(2);
        app.cursor_bottom(1_000);
        assert!(app.scroll_row > 0);

        app.tick(1_000 + SCROLL_DEBOUNCE_MS - 1);
        assert!(!app.store().doc().unwrap().contains("intro_scroll"));

        app.tick(1_000 + SCROLL_DEBOUNCE_MS);
        assert!(app
            .store()
            .doc()
            .unwrap()
            .contains("\"intro_scroll\":100.0"));
    }

    #[test]
    fn test_chapter_switch_cancels_the_pending_scroll_save() {
        let mut app = sample_app();
        app.set_viewport(2);
        app.cursor_bottom(0);
        app.next_chapter();
        app.tick(10_000);
        assert!(!app.store().doc().unwrap().contains("intro_scroll"));
    }

    #[test]
    fn test_save_now_flushes_the_pending_depth() {
        let mut app = sample_app();
        app.set_viewport(2);
        app.cursor_bottom(0);
        app.save_now();
        assert!(app.store().doc().unwrap().contains("intro_scroll"));
    }

    #[test]
    fn test_selection_becomes_a_highlight() {
        let mut app = tiny_app("# One\nalpha beta gamma\n");
        assert!(app.enter_visual());
        for _ in 0..4 {
            app.cursor_right();
        }
        assert_eq!(app.selection_text().as_deref(), Some("alpha"));

        assert!(app.open_color_picker());
        app.picker_next();
        assert_eq!(app.picker_color(), HighlightColor::Green);
        assert!(app.confirm_highlight("2024-03-01"));

        assert_eq!(app.mode, Mode::Normal);
        assert!(app.selection_anchor.is_none());
        let h = &app.state.highlights[0];
        assert_eq!(h.chapter, "ch1");
        assert_eq!(h.full_text, "alpha");
        assert_eq!(h.color, HighlightColor::Green);
        assert_eq!(h.range(), TextRange::new(0, 5));
        assert!(app.store().doc().unwrap().contains("alpha"));
    }

    #[test]
    fn test_visual_mode_needs_text() {
        let mut app = tiny_app("# One\n");
        assert!(!app.enter_visual());
        assert_eq!(app.mode, Mode::Normal);
    }

    #[test]
    fn test_whitespace_selection_is_rejected() {
        let mut app = tiny_app("# One\na  b\n");
        app.cursor_right();
        assert!(app.enter_visual());
        app.cursor_right();
        assert_eq!(app.selection_text(), None);
        assert!(!app.apply_highlight(HighlightColor::Yellow, "2024-03-01"));
    }

    #[test]
    fn test_backward_selection_is_normalized() {
        let mut app = tiny_app("# One\nalpha beta\n");
        for _ in 0..4 {
            app.cursor_right();
        }
        assert!(app.enter_visual());
        for _ in 0..4 {
            app.cursor_left();
        }
        assert_eq!(app.selection_range(), Some(TextRange::new(0, 5)));
        assert_eq!(app.selection_text().as_deref(), Some("alpha"));
    }

    #[test]
    fn test_bookmark_toggle_round_trip() {
        let mut app = sample_app();
        assert!(app.toggle_bookmark("2024-03-01"));
        assert_eq!(app.state.bookmarks[0].title, "Introduction");
        assert_eq!(app.status.as_deref(), Some("Bookmark added"));

        assert!(!app.toggle_bookmark("2024-03-02"));
        assert!(app.state.bookmarks.is_empty());
        assert_eq!(app.status.as_deref(), Some("Bookmark removed"));
    }

    #[test]
    fn test_font_and_theme_changes_are_saved() {
        let mut app = sample_app();
        assert!(app.adjust_font_size(2));
        app.toggle_theme();
        let doc = app.store().doc().unwrap();
        assert!(doc.contains("\"fontSize\":20"));
        assert!(doc.contains("\"theme\":\"dark\""));
        assert_eq!(app.status.as_deref(), Some("Dark theme"));
    }

    #[test]
    fn test_narrow_layout_closes_the_sidebar() {
        let mut app = sample_app();
        assert!(app.sidebar_open);
        app.set_narrow(true);
        assert!(!app.sidebar_open);
        assert_eq!(app.focus, Focus::Reader);

        app.toggle_sidebar();
        assert!(app.sidebar_open);
        assert_eq!(app.focus, Focus::Sidebar);

        app.show_chapter("ch3");
        assert!(!app.sidebar_open, "overlay closes after navigating");
    }

    #[test]
    fn test_sidebar_selection_skips_headers() {
        let mut app = sample_app();
        assert_eq!(app.sidebar_index, 1);
        app.sidebar_up();
        assert_eq!(app.sidebar_index, 1, "nothing selectable above the toc");
        app.sidebar_down();
        assert!(app.activate_sidebar_row());
        assert_eq!(app.state.current_chapter, "ch1");
        assert_eq!(app.focus, Focus::Reader);
    }

    #[test]
    fn test_sidebar_highlight_row_jumps_to_its_offset() {
        let mut app = sample_app();
        app.state.add_highlight(Highlight::new(
            "ch2",
            "the examination is held in fog",
            HighlightColor::Yellow,
            TextRange::new(30, 60),
            "2024-03-01",
        ));
        let rows = view::sidebar_rows(&app.book, &app.state);
        app.sidebar_index = rows
            .iter()
            .position(|r| matches!(r, SidebarRow::Highlight { .. }))
            .unwrap();
        assert!(app.activate_sidebar_row());
        assert_eq!(app.state.current_chapter, "ch2");
        assert_eq!(app.cursor.offset(), 30);
    }

    #[test]
    fn test_cycle_focus_needs_an_open_sidebar() {
        let mut app = sample_app();
        app.cycle_focus();
        assert_eq!(app.focus, Focus::Sidebar);
        app.cycle_focus();
        assert_eq!(app.focus, Focus::Reader);

        app.toggle_sidebar();
        app.toggle_sidebar();
        app.sidebar_open = false;
        app.cycle_focus();
        assert_eq!(app.focus, Focus::Reader);
    }

    #[test]
    fn test_help_toggles_from_any_mode() {
        let mut app = sample_app();
        app.toggle_help();
        assert_eq!(app.mode, Mode::Help);
        app.toggle_help();
        assert_eq!(app.mode, Mode::Normal);
    }

    struct FailStore;

    impl StateStore for FailStore {
        fn load(&self) -> anyhow::Result<Option<String>> {
            Ok(None)
        }
        fn save(&mut self, _json: &str) -> anyhow::Result<()> {
            Err(anyhow!("disk full"))
        }
    }

    #[test]
    fn test_save_failures_do_not_break_the_session() {
        let mut app = App::new(Book::sample(), FailStore);
        assert!(app.toggle_bookmark("2024-03-01"));
        assert_eq!(app.state.bookmarks.len(), 1);
        assert!(app.next_chapter());
        assert_eq!(app.state.current_chapter, "ch1");
    }

    #[test]
    fn test_theme_toggle_twice_returns_to_light() {
        let mut app = sample_app();
        app.toggle_theme();
        app.toggle_theme();
        assert_eq!(app.state.theme, Theme::Light);
    }
}
