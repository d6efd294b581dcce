//! Playback engine for candleplay.
//!
//! Owns the song-time clock, the sliding-window candlestick renderer and
//! the drawing surface abstraction it renders through, plus the offline
//! synthesizer that produces the playback buffer.

pub mod clock;
pub mod renderer;
pub mod surface;
pub mod synth;
mod window;

pub use clock::{ClockMisuse, PlaybackClock};
pub use renderer::{CandleStyle, TickOutcome, WindowedRenderer, DEFAULT_CAPACITY};
pub use surface::{DisplayList, Point, Primitive, Rect, RenderSurface, Rgba, Theme, ViewBounds};
pub use synth::{midi_to_hz, SineSynth, SynthError, Synthesizer};
pub use window::{RenderWindow, WindowChange};
