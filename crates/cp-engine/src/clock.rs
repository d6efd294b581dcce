//! Song-time clock.
//!
//! Real playback position cannot be polled from every output device, so
//! song time is approximated as wall-clock time elapsed since a single
//! origin, scaled by a speed multiplier (1.0 with audio, faster without).

use std::time::Instant;

use thiserror::Error;

/// Programming errors in clock usage.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ClockMisuse {
    #[error("clock already started")]
    AlreadyStarted,
    #[error("clock read before start")]
    NotStarted,
    #[error("speed cannot change after start")]
    SpeedAfterStart,
    #[error("invalid speed multiplier {0}")]
    InvalidSpeed(f64),
}

/// Monotonic song-time source with a set-once origin.
#[derive(Clone, Debug)]
pub struct PlaybackClock {
    origin: Option<Instant>,
    speed: f64,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self {
            origin: None,
            speed: 1.0,
        }
    }

    /// Set the no-audio speed multiplier. Only valid before `start`.
    pub fn set_fallback_speed(&mut self, multiplier: f64) -> Result<(), ClockMisuse> {
        if self.origin.is_some() {
            return Err(ClockMisuse::SpeedAfterStart);
        }
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(ClockMisuse::InvalidSpeed(multiplier));
        }
        self.speed = multiplier;
        Ok(())
    }

    /// Fix song-time zero at `origin`.
    pub fn start(&mut self, origin: Instant) -> Result<(), ClockMisuse> {
        if self.origin.is_some() {
            return Err(ClockMisuse::AlreadyStarted);
        }
        self.origin = Some(origin);
        Ok(())
    }

    /// Song time in seconds at the current wall-clock instant.
    pub fn now(&self) -> Result<f64, ClockMisuse> {
        self.song_time_at(Instant::now())
    }

    /// Song time in seconds at `wall`. Instants before the origin read as 0.
    pub fn song_time_at(&self, wall: Instant) -> Result<f64, ClockMisuse> {
        let origin = self.origin.ok_or(ClockMisuse::NotStarted)?;
        Ok(wall.saturating_duration_since(origin).as_secs_f64() * self.speed)
    }

    /// Forget the origin and restore real-time speed.
    pub fn reset(&mut self) {
        self.origin = None;
        self.speed = 1.0;
    }

    pub fn is_started(&self) -> bool {
        self.origin.is_some()
    }

    pub fn origin(&self) -> Option<Instant> {
        self.origin
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new()
    }
}
