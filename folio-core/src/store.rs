//! Storage port for the state document.
//!
//! Frontends plug in their own backend (a JSON file on disk, browser
//! localStorage); the core only ever sees strings through this trait.

use anyhow::Result;

use crate::state::ReaderState;

pub trait StateStore {
    /// The saved document, or `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<String>>;
    fn save(&mut self, json: &str) -> Result<()>;
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_doc(json: impl Into<String>) -> Self {
        Self {
            doc: Some(json.into()),
        }
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.doc.clone())
    }

    fn save(&mut self, json: &str) -> Result<()> {
        self.doc = Some(json.to_string());
        Ok(())
    }
}

/// Load the saved state, falling back to defaults when the store is empty,
/// unreadable, or holds a document that no longer parses.
pub fn load_or_default<S: StateStore>(store: &S) -> ReaderState {
    match store.load() {
        Ok(Some(json)) => match ReaderState::from_json(&json) {
            Ok(state) => state,
            Err(err) => {
                log::warn!("discarding unreadable saved state: {err}");
                ReaderState::default()
            }
        },
        Ok(None) => ReaderState::default(),
        Err(err) => {
            log::warn!("failed to load saved state: {err}");
            ReaderState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_yields_defaults() {
        let store = MemoryStore::new();
        assert_eq!(load_or_default(&store), ReaderState::default());
    }

    #[test]
    fn test_saved_document_is_restored() {
        let store = MemoryStore::with_doc(r#"{"currentChapter":"ch7","fontSize":20}"#);
        let state = load_or_default(&store);
        assert_eq!(state.current_chapter, "ch7");
        assert_eq!(state.font_size, 20);
    }

    #[test]
    fn test_corrupt_document_falls_back_to_defaults() {
        let store = MemoryStore::with_doc("{{{");
        assert_eq!(load_or_default(&store), ReaderState::default());
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        let state = ReaderState::default();
        store.save(&state.to_json().unwrap()).unwrap();
        assert_eq!(load_or_default(&store), state);
    }
}
