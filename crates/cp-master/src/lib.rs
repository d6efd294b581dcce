//! Headless playback coordinator for candleplay.
//!
//! Owns a playback session end to end: synthesizes the track, negotiates an
//! audio backend with fallback, runs the song-time clock and drives the
//! windowed renderer. Both the GUI and the CLI sit on top of it.

mod config;
mod session;
mod state;
mod ticker;

use thiserror::Error;

pub use config::{ConfigError, SessionConfig, DEFAULT_CONFIG_FILE};
pub use session::{Session, TickReport};
pub use state::{AudioMode, PlaybackEvent, PlaybackState, SessionPhase};
pub use ticker::Ticker;

// Re-export common types so callers don't need the lower crates directly.
pub use cp_audio::{list_output_devices, AudioBackend, AudioError, DeviceInfo};
pub use cp_engine::{
    ClockMisuse, DisplayList, Point, Primitive, Rect, RenderSurface, Rgba, Theme, TickOutcome,
    ViewBounds,
};
pub use cp_formats::{load_midi, load_midi_file, FormatError};
pub use cp_ir::{Note, PcmBuffer, Score, Track};

/// Error type for session control.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Clock(#[from] ClockMisuse),
    #[error("session already started")]
    AlreadyStarted,
    #[error("session is not running")]
    NotRunning,
    #[error("score has no track {0}")]
    NoSuchTrack(usize),
}
