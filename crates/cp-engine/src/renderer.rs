//! Windowed candlestick renderer.
//!
//! Polled once per tick with the current song time. Draws newly due notes
//! incrementally and performs a full clear + redraw of the cached values
//! whenever the window start moves.

use cp_ir::{CandleKind, VisualNote};
use serde::Deserialize;
use tracing::debug;

use crate::surface::{Point, Rect, RenderSurface, Rgba, Theme, ViewBounds};
use crate::window::RenderWindow;

/// Default number of candles kept on screen.
pub const DEFAULT_CAPACITY: usize = 32;

/// Candle geometry in chart units.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CandleStyle {
    /// Body width, centered on the slot
    pub body_width: f64,
    /// Body height substituted when `open == close`
    pub min_body_height: f64,
    /// Padding above the highest high and below the lowest low
    pub y_margin: f64,
    /// Wick stroke width in pixels
    pub wick_width: f32,
}

impl Default for CandleStyle {
    fn default() -> Self {
        Self {
            body_width: 0.7,
            min_body_height: 0.3,
            y_margin: 2.0,
            wick_width: 1.5,
        }
    }
}

/// What one tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickOutcome {
    /// Notes whose start time has passed
    pub due: usize,
    pub start: usize,
    pub end: usize,
    /// Candles drawn during this tick
    pub drawn: usize,
    /// The window slid and the surface was cleared
    pub cleared: bool,
}

/// Sliding-window renderer over a fixed visual-note sequence.
pub struct WindowedRenderer {
    notes: Vec<VisualNote>,
    window: RenderWindow,
    style: CandleStyle,
    theme: Theme,
}

impl WindowedRenderer {
    pub fn new(notes: Vec<VisualNote>, capacity: usize) -> Self {
        Self::with_style(notes, capacity, CandleStyle::default(), Theme::default())
    }

    pub fn with_style(
        notes: Vec<VisualNote>,
        capacity: usize,
        style: CandleStyle,
        theme: Theme,
    ) -> Self {
        Self {
            notes,
            window: RenderWindow::new(capacity),
            style,
            theme,
        }
    }

    /// Apply the chrome once before the first tick.
    pub fn prepare(&self, surface: &mut dyn RenderSurface) {
        surface.apply_theme(&self.theme);
    }

    /// Number of notes due at `song_time`.
    pub fn due_count(&self, song_time: f64) -> usize {
        self.notes.partition_point(|n| n.time <= song_time)
    }

    /// Advance to `song_time`, drawing whatever became visible.
    pub fn tick(&mut self, song_time: f64, surface: &mut dyn RenderSurface) -> TickOutcome {
        let due = self.due_count(song_time);
        let change = self.window.advance(due, self.notes.len());

        if change.slid {
            debug!(start = change.start, end = change.end, "window slid, redrawing");
            surface.clear();
            surface.apply_theme(&self.theme);
        }

        let mut drawn = 0;
        while let Some(index) = self.window.next_to_draw(self.notes.len()) {
            if self.draw_note(index, surface) {
                drawn += 1;
            }
        }

        self.update_bounds(surface);

        TickOutcome {
            due,
            start: change.start,
            end: change.end,
            drawn,
            cleared: change.slid,
        }
    }

    /// Draw the note at `index` in its window slot. Out-of-range indices
    /// are ignored.
    pub fn draw_note(&self, index: usize, surface: &mut dyn RenderSurface) -> bool {
        let (Some(note), Some(slot)) = (self.notes.get(index), self.window.slot(index)) else {
            return false;
        };
        let x = slot as f64;
        let color = self.color_for(note.kind());

        surface.draw_line(
            Point::new(x, note.low),
            Point::new(x, note.high),
            color,
            self.style.wick_width,
        );
        surface.draw_rect(self.body_rect(note, x), color, color);
        true
    }

    /// Body rectangle for a candle centered at `x`.
    pub fn body_rect(&self, note: &VisualNote, x: f64) -> Rect {
        let (y, height) = match note.kind() {
            CandleKind::Neutral => (
                note.close - self.style.min_body_height / 2.0,
                self.style.min_body_height,
            ),
            _ => (note.body_bottom(), note.body_height()),
        };
        Rect {
            x: x - self.style.body_width / 2.0,
            y,
            width: self.style.body_width,
            height,
        }
    }

    pub fn color_for(&self, kind: CandleKind) -> Rgba {
        match kind {
            CandleKind::Bullish => self.theme.bullish,
            CandleKind::Bearish => self.theme.bearish,
            CandleKind::Neutral => self.theme.neutral,
        }
    }

    /// Bounds covering the visible candles, if any are visible.
    pub fn view_bounds(&self) -> Option<ViewBounds> {
        let visible = self.visible();
        if visible.is_empty() {
            return None;
        }
        let low = visible.iter().map(|n| n.low).fold(f64::INFINITY, f64::min);
        let high = visible.iter().map(|n| n.high).fold(f64::NEG_INFINITY, f64::max);
        Some(ViewBounds {
            x: (-1.0, self.window.capacity() as f64),
            y: (low - self.style.y_margin, high + self.style.y_margin),
        })
    }

    fn update_bounds(&self, surface: &mut dyn RenderSurface) {
        if let Some(bounds) = self.view_bounds() {
            surface.set_limits(bounds);
        }
    }

    /// Notes currently inside the window.
    pub fn visible(&self) -> &[VisualNote] {
        &self.notes[self.window.range()]
    }

    pub fn notes(&self) -> &[VisualNote] {
        &self.notes
    }

    pub fn window(&self) -> &RenderWindow {
        &self.window
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Every note has been drawn at least once.
    pub fn is_exhausted(&self) -> bool {
        self.window.drawn_up_to() >= self.notes.len()
    }
}
