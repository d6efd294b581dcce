//! Mono f32 PCM buffer.

use std::f32::consts::TAU;

/// Sample rate the synthesizer renders at.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// A mono PCM buffer with its sample rate.
#[derive(Clone, Debug, PartialEq)]
pub struct PcmBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl PcmBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// A sine tone, used to validate an output path before playback.
    pub fn tone(frequency: f32, seconds: f32, sample_rate: u32, amplitude: f32) -> Self {
        let len = (seconds.max(0.0) * sample_rate as f32) as usize;
        let step = TAU * frequency / sample_rate as f32;
        let samples = (0..len)
            .map(|i| (i as f32 * step).sin() * amplitude)
            .collect();
        Self::new(samples, sample_rate)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length in seconds.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0_f32, |acc, s| acc.max(s.abs()))
    }

    /// Linear-interpolation resample to `rate`. Returns a clone when the
    /// rates already match.
    pub fn resampled(&self, rate: u32) -> PcmBuffer {
        if rate == self.sample_rate || self.sample_rate == 0 || rate == 0 || self.is_empty() {
            return self.clone();
        }

        let ratio = self.sample_rate as f64 / rate as f64;
        let out_len = ((self.samples.len() as f64) / ratio).floor() as usize;
        let last = self.samples.len() - 1;
        let samples = (0..out_len)
            .map(|i| {
                let pos = i as f64 * ratio;
                let idx = pos.floor() as usize;
                let frac = (pos - idx as f64) as f32;
                let a = self.samples[idx.min(last)];
                let b = self.samples[(idx + 1).min(last)];
                a + (b - a) * frac
            })
            .collect();
        PcmBuffer::new(samples, rate)
    }
}
