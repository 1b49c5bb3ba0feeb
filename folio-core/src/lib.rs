//! Core logic for Folio, a keyboard-driven book reader.
//!
//! This crate is frontend-agnostic: it owns the book model, the persisted
//! reader state, and the [`App`] state machine, while the terminal and web
//! binaries supply input, rendering, and a [`StateStore`] backend.

pub mod app;
pub mod cursor;
pub mod model;
pub mod scroll;
pub mod state;
pub mod store;
pub mod view;

pub use app::{App, Focus, Mode};
pub use cursor::ChapterCursor;
pub use model::{Book, Bookmark, Chapter, Highlight, HighlightColor, TextRange};
pub use scroll::{scroll_depth, scroll_row_for_depth, ScrollSaver, SCROLL_DEBOUNCE_MS};
pub use state::{ProgressEntry, ReaderState, Theme};
pub use store::{load_or_default, MemoryStore, StateStore};
