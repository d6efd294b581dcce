//! Audio backend trait and error types.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use cp_ir::PcmBuffer;
use thiserror::Error;

/// Error type for audio operations.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Device init error: {0}")]
    DeviceInit(String),
    #[error("Stream create error: {0}")]
    StreamCreate(String),
    #[error("Playback error: {0}")]
    Playback(String),
    #[error("No audio device available")]
    NoDevice,
    #[error("Output device {0:?} not found")]
    DeviceNotFound(String),
    #[error("Output stalled, not finished after {0:?}")]
    Timeout(Duration),
}

/// An output path that can play a PCM buffer.
///
/// Backends are probed in rank order on the caller's thread; the first one
/// that succeeds is moved into a detached playback thread.
pub trait AudioBackend: Send {
    /// Short name for logs and status lines.
    fn name(&self) -> &str;

    /// Validate the output path by playing `tone` and blocking until it
    /// finishes. Bounded by the tone length plus a grace period.
    fn probe(&mut self, tone: &PcmBuffer) -> Result<(), AudioError>;

    /// Play `buffer` to completion, or until `stop` is raised. `on_start`
    /// fires once, at the instant output begins.
    fn play(
        self: Box<Self>,
        buffer: Arc<PcmBuffer>,
        stop: &AtomicBool,
        on_start: &mut dyn FnMut(Instant),
    ) -> Result<(), AudioError>;
}
