//! Offline note synthesis.
//!
//! Renders a track to a mono PCM buffer in one pass. This is a one-shot
//! precomputation done before playback starts, never during ticks.

use std::f32::consts::TAU;

use cp_ir::{Note, PcmBuffer};
use thiserror::Error;

/// Error type for synthesis.
#[derive(Debug, Error, PartialEq)]
pub enum SynthError {
    #[error("nothing to synthesize")]
    EmptyScore,
    #[error("note {index} has invalid timing ({start}..{end})")]
    InvalidNote { index: usize, start: f64, end: f64 },
    #[error("score is {seconds:.1}s long, limit is {limit:.1}s")]
    TooLong { seconds: f64, limit: f64 },
    #[error("sample rate must be non-zero")]
    InvalidSampleRate,
}

/// Anything that turns notes into audio.
pub trait Synthesizer: Send {
    fn synthesize(&self, notes: &[Note], sample_rate: u32) -> Result<PcmBuffer, SynthError>;
}

/// Convert a MIDI note number to frequency in Hz (A4 = 440).
pub fn midi_to_hz(pitch: u8) -> f32 {
    440.0 * 2f32.powf((pitch as f32 - 69.0) / 12.0)
}

/// Additive sine synthesizer with a linear attack/release envelope.
#[derive(Clone, Debug)]
pub struct SineSynth {
    /// Attack time in seconds
    pub attack: f32,
    /// Release tail after note end, in seconds
    pub release: f32,
    /// Relative level of the second harmonic
    pub overtone: f32,
    /// Output is normalized down to this peak if it exceeds it
    pub headroom: f32,
    /// Longest score accepted, in seconds
    pub max_seconds: f64,
}

impl Default for SineSynth {
    fn default() -> Self {
        Self {
            attack: 0.005,
            release: 0.08,
            overtone: 0.3,
            headroom: 0.8,
            max_seconds: 30.0 * 60.0,
        }
    }
}

impl SineSynth {
    fn envelope(&self, t: f32, held: f32) -> f32 {
        let attack = if self.attack > 0.0 {
            (t / self.attack).min(1.0)
        } else {
            1.0
        };
        if t <= held {
            attack
        } else if self.release > 0.0 {
            attack * (1.0 - (t - held) / self.release).max(0.0)
        } else {
            0.0
        }
    }

    fn render_note(&self, note: &Note, sample_rate: u32, out: &mut [f32]) {
        let rate = sample_rate as f32;
        let first = (note.start.max(0.0) * sample_rate as f64) as usize;
        let held = note.duration() as f32;
        let len = ((held + self.release) * rate) as usize;
        let step = TAU * midi_to_hz(note.pitch) / rate;
        let gain = note.velocity as f32 / 127.0 * 0.25;

        for (i, slot) in out.iter_mut().skip(first).take(len).enumerate() {
            let t = i as f32 / rate;
            let phase = i as f32 * step;
            let wave = phase.sin() + self.overtone * (2.0 * phase).sin();
            *slot += wave * gain * self.envelope(t, held);
        }
    }
}

impl Synthesizer for SineSynth {
    fn synthesize(&self, notes: &[Note], sample_rate: u32) -> Result<PcmBuffer, SynthError> {
        if sample_rate == 0 {
            return Err(SynthError::InvalidSampleRate);
        }
        if notes.is_empty() {
            return Err(SynthError::EmptyScore);
        }
        for (index, note) in notes.iter().enumerate() {
            if !note.start.is_finite() || !note.end.is_finite() {
                return Err(SynthError::InvalidNote {
                    index,
                    start: note.start,
                    end: note.end,
                });
            }
        }

        let seconds = notes.iter().map(|n| n.end.max(n.start)).fold(0.0, f64::max)
            + self.release as f64;
        if seconds > self.max_seconds {
            return Err(SynthError::TooLong {
                seconds,
                limit: self.max_seconds,
            });
        }

        let mut samples = vec![0.0_f32; (seconds * sample_rate as f64).ceil() as usize];
        for note in notes {
            self.render_note(note, sample_rate, &mut samples);
        }

        let peak = samples.iter().fold(0.0_f32, |acc, s| acc.max(s.abs()));
        if peak > self.headroom {
            let scale = self.headroom / peak;
            samples.iter_mut().for_each(|s| *s *= scale);
        }

        Ok(PcmBuffer::new(samples, sample_rate))
    }
}
