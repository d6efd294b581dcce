//! Core IR types for candleplay.
//!
//! Defines the raw notes that score loaders emit, the cached candlestick
//! values the renderer consumes, and the mono PCM buffer passed between the
//! synthesizer and the audio backends.

mod audio_buffer;
mod encode;
pub mod score;
mod visual;

pub use audio_buffer::{PcmBuffer, DEFAULT_SAMPLE_RATE};
pub use encode::{encode, encode_with, HIGH_SPREAD, LOW_SPREAD};
pub use score::{Note, Score, Track};
pub use visual::{CandleKind, VisualNote};
