//! Note-to-candlestick encoding.
//!
//! Each note gets `high = pitch + U(0, 3)`, `low = pitch + U(-3, 0)`, and
//! `open`/`close` drawn uniformly from `[low, high]`. The draws are not
//! seeded: two encodings of the same score differ, only the ranges hold.

use rand::Rng;

use crate::score::Note;
use crate::visual::VisualNote;

/// Maximum distance of `high` above the pitch.
pub const HIGH_SPREAD: f64 = 3.0;
/// Maximum distance of `low` below the pitch.
pub const LOW_SPREAD: f64 = 3.0;

/// Encode notes with the thread-local RNG.
pub fn encode(notes: &[Note]) -> Vec<VisualNote> {
    encode_with(notes, &mut rand::thread_rng())
}

/// Encode notes with a caller-supplied RNG.
///
/// Output is stably sorted by the clamped start time; ties keep input order.
pub fn encode_with<R: Rng>(notes: &[Note], rng: &mut R) -> Vec<VisualNote> {
    let mut sorted: Vec<(f64, &Note)> = notes
        .iter()
        .map(|note| (clamped_start(note.start), note))
        .collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    sorted
        .into_iter()
        .enumerate()
        .map(|(index, (time, note))| {
            let pitch = note.pitch as f64;
            let high = pitch + rng.gen_range(0.0..=HIGH_SPREAD);
            let low = pitch + rng.gen_range(-LOW_SPREAD..=0.0);
            let open = rng.gen_range(low..=high);
            let close = rng.gen_range(low..=high);

            VisualNote {
                index,
                time,
                pitch: note.pitch,
                duration: note.duration(),
                open,
                high,
                low,
                close,
            }
        })
        .collect()
}

/// Song time a note is placed at. Negative and NaN starts land at zero.
fn clamped_start(start: f64) -> f64 {
    if start > 0.0 {
        start
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scrambled_notes() -> Vec<Note> {
        vec![
            Note::new(64, 2.0, 2.5),
            Note::new(60, 0.0, 1.0),
            Note::new(67, 1.0, 1.2),
            Note::new(72, 1.0, 3.0),
            Note::new(0, 0.5, 0.5),
            Note::new(127, 4.0, 4.1),
        ]
    }

    #[test]
    fn ohlc_ranges_hold() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            for v in encode_with(&scrambled_notes(), &mut rng) {
                let pitch = v.pitch as f64;
                assert!(v.low <= v.high);
                assert!(v.low <= v.open && v.open <= v.high);
                assert!(v.low <= v.close && v.close <= v.high);
                assert!(v.high >= pitch && v.high <= pitch + HIGH_SPREAD);
                assert!(v.low <= pitch && v.low >= pitch - LOW_SPREAD);
            }
        }
    }

    #[test]
    fn sorted_by_time_with_stable_ties() {
        let encoded = encode(&scrambled_notes());
        assert_eq!(encoded.len(), 6);
        for pair in encoded.windows(2) {
            assert!(pair[0].time <= pair[1].time);
        }
        for (rank, v) in encoded.iter().enumerate() {
            assert_eq!(v.index, rank);
        }
        // 67 and 72 both start at 1.0; input order is kept
        assert_eq!(encoded[3].pitch, 67);
        assert_eq!(encoded[4].pitch, 72);
    }

    #[test]
    fn empty_input() {
        assert!(encode(&[]).is_empty());
    }

    #[test]
    fn carries_duration_and_clamps_time() {
        let encoded = encode(&[Note::new(60, -0.5, 1.0), Note::new(62, 2.0, 1.0)]);
        assert_eq!(encoded[0].time, 0.0);
        assert_eq!(encoded[0].duration, 1.5);
        assert_eq!(encoded[1].duration, 0.0);
    }

    #[test]
    fn clamped_starts_tie_in_input_order() {
        let encoded = encode(&[Note::new(60, 0.0, 1.0), Note::new(72, -0.5, 1.0)]);
        let ranked: Vec<(usize, f64, u8)> =
            encoded.iter().map(|v| (v.index, v.time, v.pitch)).collect();
        assert_eq!(ranked, vec![(0, 0.0, 60), (1, 0.0, 72)]);
    }

    #[test]
    fn nan_start_sorts_as_zero() {
        let encoded = encode(&[Note::new(72, 5.0, 6.0), Note::new(60, f64::NAN, 1.0)]);
        assert_eq!(encoded[0].pitch, 60);
        assert_eq!(encoded[0].time, 0.0);
        assert_eq!(encoded[1].time, 5.0);
        for pair in encoded.windows(2) {
            assert!(pair[0].time <= pair[1].time);
        }
    }
}
