//! Tick-to-seconds conversion.

use midly::Timing;

/// Microseconds per beat when a file sets no tempo (120 BPM).
const DEFAULT_TEMPO: u32 = 500_000;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Segment {
    tick: u64,
    seconds: f64,
    seconds_per_tick: f64,
}

/// Piecewise-linear map from MIDI ticks to seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct TempoMap {
    segments: Vec<Segment>,
    ticks_per_beat: Option<f64>,
}

impl TempoMap {
    /// Build from the header timing and `(tick, microseconds per beat)`
    /// changes in any order. Timecode files ignore tempo changes.
    pub fn new(timing: Timing, mut changes: Vec<(u64, u32)>) -> Self {
        let ticks_per_beat = match timing {
            Timing::Metrical(tpb) => tpb.as_int().max(1) as f64,
            Timing::Timecode(fps, subframes) => {
                let per_second = fps.as_f32() as f64 * subframes.max(1) as f64;
                return Self {
                    segments: vec![Segment {
                        tick: 0,
                        seconds: 0.0,
                        seconds_per_tick: 1.0 / per_second,
                    }],
                    ticks_per_beat: None,
                };
            }
        };

        let spt = |tempo: u32| tempo as f64 / 1_000_000.0 / ticks_per_beat;
        let mut segments = vec![Segment {
            tick: 0,
            seconds: 0.0,
            seconds_per_tick: spt(DEFAULT_TEMPO),
        }];

        changes.sort_by_key(|&(tick, _)| tick);
        for (tick, tempo) in changes {
            let Some(last) = segments.last_mut() else { break };
            if tick == last.tick {
                last.seconds_per_tick = spt(tempo);
                continue;
            }
            let seconds = last.seconds + (tick - last.tick) as f64 * last.seconds_per_tick;
            segments.push(Segment {
                tick,
                seconds,
                seconds_per_tick: spt(tempo),
            });
        }

        Self {
            segments,
            ticks_per_beat: Some(ticks_per_beat),
        }
    }

    /// Seconds elapsed at `tick`.
    pub fn seconds_at(&self, tick: u64) -> f64 {
        let idx = self.segments.partition_point(|s| s.tick <= tick).saturating_sub(1);
        let seg = &self.segments[idx];
        seg.seconds + (tick - seg.tick) as f64 * seg.seconds_per_tick
    }

    /// Ticks per quarter note, `None` for timecode files.
    pub fn ticks_per_beat(&self) -> Option<f64> {
        self.ticks_per_beat
    }

    /// Number of distinct tempo segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use midly::Fps;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn default_tempo_is_120_bpm() {
        let map = TempoMap::new(Timing::Metrical(480.into()), Vec::new());
        assert!(close(map.seconds_at(480), 0.5));
        assert_eq!(map.seconds_at(0), 0.0);
        assert_eq!(map.ticks_per_beat(), Some(480.0));
    }

    #[test]
    fn tempo_change_applies_from_its_tick() {
        // 120 BPM for one beat, then 60 BPM
        let map = TempoMap::new(Timing::Metrical(100.into()), vec![(100, 1_000_000)]);
        assert!(close(map.seconds_at(100), 0.5));
        assert!(close(map.seconds_at(200), 1.5));
        assert_eq!(map.segment_count(), 2);
    }

    #[test]
    fn unsorted_and_duplicate_changes() {
        let map = TempoMap::new(
            Timing::Metrical(100.into()),
            vec![(200, 250_000), (0, 1_000_000), (0, 2_000_000)],
        );
        // 0..200 at 2s/beat, then 0.25s/beat
        assert!(close(map.seconds_at(200), 4.0));
        assert!(close(map.seconds_at(300), 4.25));
    }

    #[test]
    fn timecode_is_constant() {
        let map = TempoMap::new(Timing::Timecode(Fps::Fps25, 40), vec![(0, 1)]);
        assert!(close(map.seconds_at(1000), 1.0));
        assert_eq!(map.ticks_per_beat(), None);
    }
}
