use std::fmt;
use std::time::Instant;

use cp_engine::PlaybackClock;

/// Where the session is in its start-up and playback lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    TryingPrimaryAudio,
    PrimaryAudioOk,
    TryingAlternateAudio,
    AlternateAudioOk,
    NoAudio,
    Running,
    Finished,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionPhase::Idle => "idle",
            SessionPhase::TryingPrimaryAudio => "trying primary audio",
            SessionPhase::PrimaryAudioOk => "primary audio ok",
            SessionPhase::TryingAlternateAudio => "trying alternate audio",
            SessionPhase::AlternateAudioOk => "alternate audio ok",
            SessionPhase::NoAudio => "no audio",
            SessionPhase::Running => "running",
            SessionPhase::Finished => "finished",
        };
        f.write_str(label)
    }
}

/// Which output path, if any, is driving song time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AudioMode {
    #[default]
    Unattempted,
    /// First-ranked backend
    DeviceBackend,
    /// A lower-ranked backend
    AlternateBackend,
    /// Visuals run alone at the fallback speed
    Unavailable,
}

impl fmt::Display for AudioMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AudioMode::Unattempted => "not attempted",
            AudioMode::DeviceBackend => "device",
            AudioMode::AlternateBackend => "alternate",
            AudioMode::Unavailable => "unavailable",
        };
        f.write_str(label)
    }
}

/// Shared timing state of one session. Only the tick driver writes it.
#[derive(Clone, Debug, Default)]
pub struct PlaybackState {
    pub clock: PlaybackClock,
    pub audio_mode: AudioMode,
    /// Name of the backend that is playing, if any
    pub backend: Option<String>,
}

impl PlaybackState {
    pub fn origin(&self) -> Option<Instant> {
        self.clock.origin()
    }

    pub fn speed(&self) -> f64 {
        self.clock.speed()
    }
}

/// Messages from the audio playback thread.
#[derive(Clone, Debug, PartialEq)]
pub enum PlaybackEvent {
    /// Output began at this instant
    Started(Instant),
    Completed,
    Failed(String),
}
