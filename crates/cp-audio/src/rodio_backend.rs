//! Rodio sink backend, used when direct cpal streaming fails.

use cp_ir::PcmBuffer;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, Sink};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

use crate::traits::{AudioBackend, AudioError};

const GRACE: Duration = Duration::from_millis(500);

/// Plays through rodio's default output stream.
pub struct RodioBackend {
    volume: f32,
}

impl RodioBackend {
    pub fn new() -> Self {
        Self { volume: 1.0 }
    }

    pub fn with_volume(volume: f32) -> Self {
        Self {
            volume: volume.clamp(0.0, 1.0),
        }
    }
}

impl Default for RodioBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Open the default stream and queue `buffer` on a fresh sink. The stream
/// must outlive the sink, so both are returned.
fn open_sink(buffer: &PcmBuffer, volume: f32) -> Result<(OutputStream, Sink), AudioError> {
    let (stream, handle) =
        OutputStream::try_default().map_err(|e| AudioError::DeviceInit(e.to_string()))?;
    let sink = Sink::try_new(&handle).map_err(|e| AudioError::StreamCreate(e.to_string()))?;
    sink.set_volume(volume);
    sink.append(SamplesBuffer::new(
        1,
        buffer.sample_rate(),
        buffer.samples().to_vec(),
    ));
    Ok((stream, sink))
}

impl AudioBackend for RodioBackend {
    fn name(&self) -> &str {
        "rodio"
    }

    fn probe(&mut self, tone: &PcmBuffer) -> Result<(), AudioError> {
        let (_stream, sink) = open_sink(tone, self.volume)?;
        let limit = Duration::from_secs_f64(tone.duration()) + GRACE;
        let started = Instant::now();
        while !sink.empty() {
            if started.elapsed() > limit {
                return Err(AudioError::Timeout(limit));
            }
            thread::sleep(Duration::from_millis(5));
        }
        info!("rodio output ready");
        Ok(())
    }

    fn play(
        self: Box<Self>,
        buffer: Arc<PcmBuffer>,
        stop: &AtomicBool,
        on_start: &mut dyn FnMut(Instant),
    ) -> Result<(), AudioError> {
        let (_stream, sink) = open_sink(&buffer, self.volume)?;
        on_start(Instant::now());
        while !sink.empty() {
            if stop.load(Ordering::Relaxed) {
                sink.stop();
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        Ok(())
    }
}
