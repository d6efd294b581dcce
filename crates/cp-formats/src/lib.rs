//! Score loaders for candleplay.
//!
//! Parses Standard MIDI Files into the IR: one `Track` per source track and
//! channel that carries notes, with note times converted to seconds through
//! the file's tempo map.

mod midi;
mod tempo;

pub use midi::{load_midi, load_midi_file};
pub use tempo::TempoMap;

use thiserror::Error;

/// Error type for format parsing.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Malformed or unsupported MIDI data
    #[error("Invalid MIDI data: {0}")]
    Midi(#[from] midly::Error),
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
