//! Scroll depth math and the debounced depth save.

/// Quiet period before a scroll position is persisted, in milliseconds.
pub const SCROLL_DEBOUNCE_MS: u64 = 100;

/// How far into a chapter the view has scrolled, as a rounded percentage.
///
/// A chapter that fits entirely in the viewport reads as 100: there is
/// nothing left to scroll to.
pub fn scroll_depth(scroll_row: usize, line_count: usize, viewport_rows: usize) -> f64 {
    let max_row = line_count.saturating_sub(viewport_rows);
    if max_row == 0 {
        return 100.0;
    }
    let ratio = scroll_row.min(max_row) as f64 / max_row as f64;
    (ratio * 100.0).round()
}

/// Inverse of [`scroll_depth`]: the top row that shows a saved depth again.
pub fn scroll_row_for_depth(depth: f64, line_count: usize, viewport_rows: usize) -> usize {
    let max_row = line_count.saturating_sub(viewport_rows);
    if max_row == 0 {
        return 0;
    }
    let row = (depth.clamp(0.0, 100.0) / 100.0 * max_row as f64).round() as usize;
    row.min(max_row)
}

/// One-shot timer that coalesces a burst of scroll events into a single
/// save. Each [`schedule`](Self::schedule) pushes the deadline out; the save
/// is due only after the burst has been quiet for [`SCROLL_DEBOUNCE_MS`].
#[derive(Debug, Clone, Default)]
pub struct ScrollSaver {
    deadline: Option<u64>,
}

impl ScrollSaver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now_ms: u64) {
        self.deadline = Some(now_ms + SCROLL_DEBOUNCE_MS);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once, at the first call on or after the deadline.
    pub fn take_due(&mut self, now_ms: u64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
