//! Data model: the book itself plus everything a reader layers on top.

pub mod annotation;
pub mod book;
pub mod text_range;

pub use annotation::{preview, Bookmark, Highlight, HighlightColor, PREVIEW_LEN};
pub use book::{Book, Chapter, UNKNOWN_TITLE};
pub use text_range::TextRange;
