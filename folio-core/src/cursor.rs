//! Cursor movement over a chapter body.
//!
//! Positions are (row, col) in characters, convertible to an absolute char
//! offset where each line break counts as one character. All arithmetic is
//! in `char`s so multibyte text moves and slices cleanly.

/// A cursor over one chapter's lines.
#[derive(Debug, Clone, Default)]
pub struct ChapterCursor {
    lines: Vec<String>,
    row: usize,
    col: usize,
}

impl ChapterCursor {
    pub fn new(body: &str) -> Self {
        let lines = if body.is_empty() {
            Vec::new()
        } else {
            body.lines().map(str::to_string).collect()
        };
        Self {
            lines,
            row: 0,
            col: 0,
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(String::as_str)
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines
            .get(row)
            .map(|l| l.chars().count())
            .unwrap_or(0)
    }

    pub fn move_up(&mut self) {
        self.move_vertical(-1);
    }

    pub fn move_down(&mut self) {
        self.move_vertical(1);
    }

    /// Move by `delta` rows, clamping the column to the target line.
    pub fn move_vertical(&mut self, delta: isize) {
        if self.lines.is_empty() {
            return;
        }
        let last = self.lines.len() - 1;
        self.row = self.row.saturating_add_signed(delta).min(last);
        self.col = self.col.min(self.line_len(self.row));
    }

    pub fn move_left(&mut self) {
        self.col = self.col.saturating_sub(1);
    }

    /// The column may sit one past the last character, so a selection can
    /// close over the end of a line.
    pub fn move_right(&mut self) {
        if self.col < self.line_len(self.row) {
            self.col += 1;
        }
    }

    pub fn move_to_line_start(&mut self) {
        self.col = 0;
    }

    pub fn move_to_line_end(&mut self) {
        self.col = self.line_len(self.row);
    }

    pub fn move_to_top(&mut self) {
        self.row = 0;
        self.col = 0;
    }

    pub fn move_to_bottom(&mut self) {
        if self.lines.is_empty() {
            return;
        }
        self.row = self.lines.len() - 1;
        self.col = self.col.min(self.line_len(self.row));
    }

    /// Jump to the start of the next word, crossing line ends.
    pub fn word_forward(&mut self) {
        let mut offset = self.offset();
        let chars: Vec<char> = self.flat_chars();
        // Skip the rest of the current word, then the gap after it.
        while offset < chars.len() && !chars[offset].is_whitespace() {
            offset += 1;
        }
        while offset < chars.len() && chars[offset].is_whitespace() {
            offset += 1;
        }
        self.set_offset(offset);
    }

    /// Jump to the start of the previous word.
    pub fn word_back(&mut self) {
        let mut offset = self.offset();
        let chars: Vec<char> = self.flat_chars();
        while offset > 0 && chars[offset - 1].is_whitespace() {
            offset -= 1;
        }
        while offset > 0 && !chars[offset - 1].is_whitespace() {
            offset -= 1;
        }
        self.set_offset(offset);
    }

    /// Absolute char offset of the cursor, line breaks included.
    pub fn offset(&self) -> usize {
        let before: usize = self
            .lines
            .iter()
            .take(self.row)
            .map(|l| l.chars().count() + 1)
            .sum();
        before + self.col
    }

    /// One past the last addressable position.
    pub fn max_offset(&self) -> usize {
        if self.lines.is_empty() {
            return 0;
        }
        let chars: usize = self.lines.iter().map(|l| l.chars().count()).sum();
        chars + self.lines.len() - 1
    }

    /// Park the cursor at the start of a row.
    pub fn set_row(&mut self, row: usize) {
        if self.lines.is_empty() {
            return;
        }
        self.row = row.min(self.lines.len() - 1);
        self.col = 0;
    }

    /// Place the cursor at an absolute offset, clamping past-the-end values.
    pub fn set_offset(&mut self, offset: usize) {
        let mut remaining = offset.min(self.max_offset());
        for (row, line) in self.lines.iter().enumerate() {
            let len = line.chars().count();
            if remaining <= len {
                self.row = row;
                self.col = remaining;
                return;
            }
            remaining -= len + 1;
        }
        self.row = 0;
        self.col = 0;
    }

    fn flat_chars(&self) -> Vec<char> {
        let mut chars = Vec::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                chars.push('\n');
            }
            chars.extend(line.chars());
        }
        chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "first line\nsecond\nthe third line";

    #[test]
    fn test_offset_counts_line_breaks() {
        let mut cursor = ChapterCursor::new(BODY);
        assert_eq!(cursor.offset(), 0);
        cursor.move_down();
        assert_eq!(cursor.offset(), 11);
        cursor.move_right();
        cursor.move_right();
        assert_eq!(cursor.offset(), 13);
    }

    #[test]
    fn test_vertical_move_clamps_column() {
        let mut cursor = ChapterCursor::new(BODY);
        cursor.move_to_line_end();
        assert_eq!(cursor.col(), 10);
        cursor.move_down();
        assert_eq!(cursor.col(), 6);
        cursor.move_up();
        assert_eq!(cursor.col(), 6);
    }

    #[test]
    fn test_horizontal_moves_stop_at_edges() {
        let mut cursor = ChapterCursor::new("ab");
        cursor.move_left();
        assert_eq!(cursor.col(), 0);
        cursor.move_right();
        cursor.move_right();
        cursor.move_right();
        assert_eq!(cursor.col(), 2);
    }

    #[test]
    fn test_set_offset_round_trips() {
        let mut cursor = ChapterCursor::new(BODY);
        for offset in [0, 5, 10, 11, 17, 18, cursor.max_offset()] {
            cursor.set_offset(offset);
            assert_eq!(cursor.offset(), offset);
        }
        cursor.set_offset(9999);
        assert_eq!(cursor.offset(), cursor.max_offset());
    }

    #[test]
    fn test_offsets_are_char_based() {
        let mut cursor = ChapterCursor::new("première\népoque");
        cursor.move_down();
        assert_eq!(cursor.offset(), 9);
        cursor.move_to_line_end();
        assert_eq!(cursor.offset(), 15);
        assert_eq!(cursor.max_offset(), 15);
    }

    #[test]
    fn test_word_motion() {
        let mut cursor = ChapterCursor::new("one two\nthree");
        cursor.word_forward();
        assert_eq!(cursor.offset(), 4);
        cursor.word_forward();
        assert_eq!(cursor.offset(), 8);
        cursor.word_back();
        assert_eq!(cursor.offset(), 4);
        cursor.word_back();
        assert_eq!(cursor.offset(), 0);
        cursor.word_back();
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn test_empty_body_is_inert() {
        let mut cursor = ChapterCursor::new("");
        cursor.move_down();
        cursor.move_right();
        cursor.move_to_bottom();
        assert_eq!(cursor.offset(), 0);
        assert_eq!(cursor.max_offset(), 0);
        assert_eq!(cursor.line_count(), 0);
    }
}
