//! CPAL-based audio output backend.

use cp_ir::PcmBuffer;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, StreamConfig};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapProd, HeapRb};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::traits::{AudioBackend, AudioError};

/// Extra time allowed past the buffer length before output counts as stalled.
const GRACE: Duration = Duration::from_millis(500);

/// Time left for the device to flush its last callback before the stream drops.
const TAIL: Duration = Duration::from_millis(50);

/// CPAL output on the default host, streaming through a ring buffer.
pub struct CpalBackend {
    /// Output device by name; `None` selects the host default
    device_name: Option<String>,
}

impl CpalBackend {
    /// Use the default output device.
    pub fn new() -> Self {
        Self { device_name: None }
    }

    /// Use the output device with this exact name.
    pub fn with_device(name: impl Into<String>) -> Self {
        Self {
            device_name: Some(name.into()),
        }
    }

    fn open(&self) -> Result<(Device, StreamConfig), AudioError> {
        let host = cpal::default_host();
        let device = match &self.device_name {
            Some(wanted) => host
                .output_devices()
                .map_err(|e| AudioError::DeviceInit(e.to_string()))?
                .find(|d| d.name().is_ok_and(|n| &n == wanted))
                .ok_or_else(|| AudioError::DeviceNotFound(wanted.clone()))?,
            None => host.default_output_device().ok_or(AudioError::NoDevice)?,
        };

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::DeviceInit(e.to_string()))?;

        Ok((device, config.into()))
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for CpalBackend {
    fn name(&self) -> &str {
        "cpal"
    }

    fn probe(&mut self, tone: &PcmBuffer) -> Result<(), AudioError> {
        debug!(host = cpal::default_host().id().name(), "probing cpal output");

        let (device, config) = self.open()?;
        info!(
            device = %device.name().unwrap_or_default(),
            sample_rate = config.sample_rate.0,
            channels = config.channels,
            "using cpal output device"
        );
        let never = AtomicBool::new(false);
        stream_buffer(&device, &config, tone, &never, &mut |_: Instant| {})
    }

    fn play(
        self: Box<Self>,
        buffer: Arc<PcmBuffer>,
        stop: &AtomicBool,
        on_start: &mut dyn FnMut(Instant),
    ) -> Result<(), AudioError> {
        let (device, config) = self.open()?;
        stream_buffer(&device, &config, &buffer, stop, on_start)
    }
}

/// Stream `buffer` to `device`, blocking until every sample was consumed
/// by the device callback or `stop` is raised.
fn stream_buffer(
    device: &Device,
    config: &StreamConfig,
    buffer: &PcmBuffer,
    stop: &AtomicBool,
    on_start: &mut dyn FnMut(Instant),
) -> Result<(), AudioError> {
    let buffer = buffer.resampled(config.sample_rate.0);
    let samples = buffer.samples();
    let channels = config.channels.max(1) as usize;

    // About 100ms of mono samples
    let rb = HeapRb::<f32>::new((config.sample_rate.0 as usize / 10).max(64));
    let (mut producer, mut consumer) = rb.split();
    let played = Arc::new(AtomicUsize::new(0));
    let played_cb = played.clone();

    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                // Mono source: the same sample goes to every channel of the frame
                for frame in data.chunks_mut(channels) {
                    let sample = match consumer.try_pop() {
                        Some(s) => {
                            played_cb.fetch_add(1, Ordering::Relaxed);
                            s
                        }
                        None => 0.0,
                    };
                    frame.fill(sample);
                }
            },
            |err| warn!(%err, "audio stream error"),
            None,
        )
        .map_err(|e| AudioError::StreamCreate(e.to_string()))?;

    let mut next = fill(&mut producer, samples, 0);
    stream
        .play()
        .map_err(|e| AudioError::Playback(e.to_string()))?;
    on_start(Instant::now());

    let limit = Duration::from_secs_f64(buffer.duration()) + GRACE;
    let deadline = Instant::now() + limit;
    while played.load(Ordering::Relaxed) < samples.len() {
        if stop.load(Ordering::Relaxed) {
            debug!("cpal playback stopped early");
            return Ok(());
        }
        if Instant::now() > deadline {
            return Err(AudioError::Timeout(limit));
        }
        next = fill(&mut producer, samples, next);
        thread::sleep(Duration::from_millis(5));
    }

    thread::sleep(TAIL);
    Ok(())
}

/// Push as many samples as fit, returning the index of the next unpushed one.
fn fill(producer: &mut HeapProd<f32>, samples: &[f32], mut next: usize) -> usize {
    while next < samples.len() && producer.try_push(samples[next]).is_ok() {
        next += 1;
    }
    next
}
