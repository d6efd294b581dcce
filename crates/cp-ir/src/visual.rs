//! Candlestick values derived from a note.

/// Colour class of a candlestick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CandleKind {
    /// `open > close`
    Bullish,
    /// `open < close`
    Bearish,
    /// `open == close`
    Neutral,
}

/// One note's synthetic open/high/low/close quadruple.
///
/// Computed once by the encoder and never mutated, so a redraw after a
/// window slide shows exactly the same candle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualNote {
    /// Rank in the time-sorted sequence
    pub index: usize,
    /// Note start in seconds
    pub time: f64,
    pub pitch: u8,
    /// Note length in seconds
    pub duration: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl VisualNote {
    /// Single comparison that drives wick, body fill and body edge colour.
    pub fn kind(&self) -> CandleKind {
        if self.open > self.close {
            CandleKind::Bullish
        } else if self.open < self.close {
            CandleKind::Bearish
        } else {
            CandleKind::Neutral
        }
    }

    /// Lower edge of the open/close body.
    pub fn body_bottom(&self) -> f64 {
        self.open.min(self.close)
    }

    /// Height of the open/close body, zero when flat.
    pub fn body_height(&self) -> f64 {
        (self.close - self.open).abs()
    }
}
