//! Sliding window over the visual-note sequence.
//!
//! The window keeps the most recent `capacity` due notes. Drawing within
//! one epoch is incremental via a cursor (`drawn_up_to`); any change of the
//! window start begins a new epoch and rewinds the cursor to the new start.

use core::ops::Range;

/// Result of moving the window to a new due count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowChange {
    pub start: usize,
    pub end: usize,
    /// The start moved, so everything drawn so far is stale.
    pub slid: bool,
}

/// Visible range bookkeeping for the renderer.
#[derive(Clone, Debug)]
pub struct RenderWindow {
    capacity: usize,
    start: usize,
    end: usize,
    drawn_up_to: usize,
    epoch: u64,
}

impl RenderWindow {
    /// Create an empty window. A zero capacity is bumped to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            start: 0,
            end: 0,
            drawn_up_to: 0,
            epoch: 0,
        }
    }

    /// Window bounds for `due` notes, before clamping to the sequence.
    pub fn target(&self, due: usize) -> (usize, usize) {
        if due <= self.capacity {
            (0, due)
        } else {
            (due - self.capacity, due)
        }
    }

    /// Move the window so it ends at `due` (clamped to `len`).
    pub fn advance(&mut self, due: usize, len: usize) -> WindowChange {
        let (start, end) = self.target(due.min(len));
        let slid = start != self.start;
        if slid {
            self.drawn_up_to = start;
            self.epoch += 1;
        }
        self.start = start;
        self.end = end;
        WindowChange { start, end, slid }
    }

    /// Claim the next undrawn index, advancing the cursor.
    pub fn next_to_draw(&mut self, len: usize) -> Option<usize> {
        if self.drawn_up_to < self.end && self.drawn_up_to < len {
            let index = self.drawn_up_to;
            self.drawn_up_to += 1;
            Some(index)
        } else {
            None
        }
    }

    /// Horizontal slot of `index` relative to the window start.
    pub fn slot(&self, index: usize) -> Option<usize> {
        if (self.start..self.end).contains(&index) {
            Some(index - self.start)
        } else {
            None
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn drawn_up_to(&self) -> usize {
        self.drawn_up_to
    }

    /// Number of slides so far.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_from_zero_until_full() {
        let mut w = RenderWindow::new(4);
        assert_eq!(w.advance(3, 10), WindowChange { start: 0, end: 3, slid: false });
        assert_eq!(w.advance(4, 10), WindowChange { start: 0, end: 4, slid: false });
        assert_eq!(w.len(), 4);
    }

    #[test]
    fn slides_at_fixed_width() {
        let mut w = RenderWindow::new(4);
        w.advance(4, 10);
        let change = w.advance(6, 10);
        assert!(change.slid);
        assert_eq!(w.range(), 2..6);
        assert_eq!(w.len(), 4);
        assert_eq!(w.drawn_up_to(), 2);
        assert_eq!(w.epoch(), 1);
    }

    #[test]
    fn cursor_only_increases_within_epoch() {
        let mut w = RenderWindow::new(4);
        w.advance(3, 10);
        let drawn: Vec<_> = std::iter::from_fn(|| w.next_to_draw(10)).collect();
        assert_eq!(drawn, vec![0, 1, 2]);

        w.advance(3, 10);
        assert_eq!(w.next_to_draw(10), None);

        w.advance(4, 10);
        assert_eq!(w.next_to_draw(10), Some(3));
    }

    #[test]
    fn due_clamped_to_sequence_length() {
        let mut w = RenderWindow::new(4);
        let change = w.advance(50, 6);
        assert_eq!((change.start, change.end), (2, 6));
    }

    #[test]
    fn cursor_bounded_by_len() {
        let mut w = RenderWindow::new(8);
        w.advance(5, 5);
        let drawn: Vec<_> = std::iter::from_fn(|| w.next_to_draw(3)).collect();
        assert_eq!(drawn, vec![0, 1, 2]);
    }

    #[test]
    fn slot_is_window_relative() {
        let mut w = RenderWindow::new(4);
        w.advance(7, 10);
        assert_eq!(w.slot(3), Some(0));
        assert_eq!(w.slot(6), Some(3));
        assert_eq!(w.slot(7), None);
        assert_eq!(w.slot(2), None);
    }

    #[test]
    fn zero_capacity_bumped() {
        assert_eq!(RenderWindow::new(0).capacity(), 1);
    }
}
