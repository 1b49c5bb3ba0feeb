//! Disk storage and book loading for the terminal frontend.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use folio_core::{Book, StateStore};

/// Width chapter bodies are re-wrapped to at load time. A fixed width keeps
/// highlight offsets stable across terminal resizes.
pub const WRAP_COLS: usize = 76;

const STATE_FILE: &str = "state.json";

/// `~/.folio`, created on first use.
pub fn folio_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("could not determine home directory")?;
    let dir = home.join(".folio");
    if !dir.exists() {
        fs::create_dir_all(&dir)
            .with_context(|| format!("could not create {}", dir.display()))?;
    }
    Ok(dir)
}

/// State document stored as a JSON file.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_path() -> Result<Self> {
        Ok(Self::new(folio_dir()?.join(STATE_FILE)))
    }
}

impl StateStore for FileStore {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("could not read {}", self.path.display()))?;
        Ok(Some(json))
    }

    fn save(&mut self, json: &str) -> Result<()> {
        fs::write(&self.path, json)
            .with_context(|| format!("could not write {}", self.path.display()))
    }
}

/// Load a book from a plain-text or markdown file.
pub fn load_book(path: &Path) -> Result<Book> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("could not read {}", path.display()))?;
    let title = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Untitled".to_string());
    Ok(rewrap(Book::parse(title, &text)))
}

/// Re-wrap every chapter body to [`WRAP_COLS`].
pub fn rewrap(mut book: Book) -> Book {
    for chapter in &mut book.chapters {
        chapter.body = textwrap::refill(&chapter.body, WRAP_COLS);
    }
    book
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("folio-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_file_store_round_trip() {
        let path = scratch_path("store.json");
        let mut store = FileStore::new(path.clone());
        assert!(store.load().unwrap().is_none());

        store.save(r#"{"fontSize":20}"#).unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some(r#"{"fontSize":20}"#));

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_load_book_titles_from_file_stem() {
        let path = scratch_path("voyage.md");
        fs::write(&path, "# First\nsome text\n").unwrap();

        let book = load_book(&path).unwrap();
        assert_eq!(
            book.title,
            format!("folio-{}-voyage", std::process::id()),
            "title comes from the file stem, extension dropped"
        );
        assert_eq!(book.chapters[0].title, "First");

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_load_book_missing_file_is_an_error() {
        assert!(load_book(Path::new("/nonexistent/folio-book.md")).is_err());
    }

    #[test]
    fn test_rewrap_bounds_line_width() {
        let long = format!("# One\n{}\n", "word ".repeat(40));
        let book = rewrap(Book::parse("T", &long));
        assert!(book
            .chapter("ch1")
            .unwrap()
            .body
            .lines()
            .all(|l| l.chars().count() <= WRAP_COLS));
    }
}
