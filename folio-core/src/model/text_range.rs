use serde::{Deserialize, Serialize};

/// A span of chapter text addressed by character offsets.
///
/// Offsets count `char`s from the start of the chapter body, so a stored
/// range stays valid regardless of how the text is encoded on disk.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TextRange {
    pub start_offset: usize,
    pub end_offset: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start_offset: start.min(end),
            end_offset: start.max(end),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start_offset == self.end_offset
    }

    /// Check if this range contains the given char offset
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start_offset && offset < self.end_offset
    }

    /// Extract the spanned text from a chapter body.
    pub fn slice(&self, text: &str) -> String {
        text.chars()
            .skip(self.start_offset)
            .take(self.end_offset.saturating_sub(self.start_offset))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_orders_endpoints() {
        let range = TextRange::new(10, 4);
        assert_eq!(range.start_offset, 4);
        assert_eq!(range.end_offset, 10);
    }

    #[test]
    fn test_zero_width_range_is_empty() {
        assert!(TextRange::new(3, 3).is_empty());
        assert!(TextRange::default().is_empty());
        assert!(!TextRange::new(3, 4).is_empty());
    }

    #[test]
    fn test_contains_is_half_open() {
        let range = TextRange::new(2, 5);
        assert!(!range.contains(1));
        assert!(range.contains(2));
        assert!(range.contains(4));
        assert!(!range.contains(5));
    }

    #[test]
    fn test_slice_counts_chars_not_bytes() {
        let text = "première époque";
        let range = TextRange::new(9, 15);
        assert_eq!(range.slice(text), "époque");
    }

    #[test]
    fn test_slice_clamps_past_end() {
        let range = TextRange::new(3, 100);
        assert_eq!(range.slice("hello"), "lo");
    }
}
