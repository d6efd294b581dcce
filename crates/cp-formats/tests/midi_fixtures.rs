//! Integration tests for the MIDI loader against in-memory files.

use cp_formats::{load_midi, FormatError};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};

fn note_on(delta: u32, channel: u8, key: u8, vel: u8) -> TrackEvent<'static> {
    TrackEvent {
        delta: delta.into(),
        kind: TrackEventKind::Midi {
            channel: channel.into(),
            message: MidiMessage::NoteOn {
                key: key.into(),
                vel: vel.into(),
            },
        },
    }
}

fn note_off(delta: u32, channel: u8, key: u8) -> TrackEvent<'static> {
    TrackEvent {
        delta: delta.into(),
        kind: TrackEventKind::Midi {
            channel: channel.into(),
            message: MidiMessage::NoteOff {
                key: key.into(),
                vel: 0.into(),
            },
        },
    }
}

fn meta(delta: u32, message: MetaMessage<'static>) -> TrackEvent<'static> {
    TrackEvent {
        delta: delta.into(),
        kind: TrackEventKind::Meta(message),
    }
}

fn end() -> TrackEvent<'static> {
    meta(0, MetaMessage::EndOfTrack)
}

fn encode(format: Format, tracks: Vec<Vec<TrackEvent<'static>>>) -> Vec<u8> {
    let mut smf = Smf::new(Header::new(format, Timing::Metrical(480.into())));
    smf.tracks = tracks;
    let mut bytes = Vec::new();
    smf.write_std(&mut bytes).expect("writing to a Vec cannot fail");
    bytes
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn single_track_at_default_tempo() {
    let data = encode(
        Format::SingleTrack,
        vec![vec![
            meta(0, MetaMessage::TrackName(b"Lead")),
            note_on(0, 0, 60, 100),
            note_off(480, 0, 60),
            note_on(0, 0, 64, 90),
            note_on(240, 0, 64, 0),
            end(),
        ]],
    );
    let score = load_midi(&data).unwrap();
    assert_eq!(score.title, "Lead");
    assert_eq!(score.tracks.len(), 1);

    let track = score.first_track().unwrap();
    assert_eq!(track.name, "Lead");
    assert_eq!(track.notes.len(), 2);
    assert_eq!(track.notes[0].pitch, 60);
    assert!(close(track.notes[0].start, 0.0));
    assert!(close(track.notes[0].end, 0.5));
    assert_eq!(track.notes[1].velocity, 90);
    assert!(close(track.notes[1].start, 0.5));
    assert!(close(track.notes[1].end, 0.75));
}

#[test]
fn tempo_track_applies_to_note_tracks() {
    let data = encode(
        Format::Parallel,
        vec![
            vec![
                meta(0, MetaMessage::TrackName(b"Song")),
                meta(0, MetaMessage::Tempo(1_000_000.into())),
                end(),
            ],
            vec![note_on(0, 0, 48, 80), note_off(960, 0, 48), end()],
        ],
    );
    let score = load_midi(&data).unwrap();
    assert_eq!(score.title, "Song");
    // The conductor track has no notes and is not a Track
    assert_eq!(score.tracks.len(), 1);
    assert_eq!(score.tracks[0].name, "Track 2");
    assert!(close(score.tracks[0].notes[0].end, 2.0));
}

#[test]
fn channels_split_into_tracks() {
    let data = encode(
        Format::SingleTrack,
        vec![vec![
            note_on(0, 9, 36, 100),
            note_on(0, 0, 60, 100),
            note_off(480, 0, 60),
            note_off(0, 9, 36),
            end(),
        ]],
    );
    let score = load_midi(&data).unwrap();
    assert_eq!(score.tracks.len(), 2);
    assert!(score.tracks.iter().any(|t| t.is_drum && t.channel == 9));
    assert!(score.tracks.iter().all(|t| t.name.starts_with("Track 1 (ch ")));
}

#[test]
fn overlapping_same_key_closes_oldest_first() {
    let data = encode(
        Format::SingleTrack,
        vec![vec![
            note_on(0, 0, 60, 100),
            note_on(240, 0, 60, 100),
            note_off(240, 0, 60),
            note_off(240, 0, 60),
            end(),
        ]],
    );
    let score = load_midi(&data).unwrap();
    let notes = &score.tracks[0].notes;
    assert_eq!(notes.len(), 2);
    assert!(close(notes[0].start, 0.0) && close(notes[0].end, 0.5));
    assert!(close(notes[1].start, 0.25) && close(notes[1].end, 0.75));
}

#[test]
fn unterminated_notes_dropped() {
    let data = encode(
        Format::SingleTrack,
        vec![vec![note_on(0, 0, 60, 100), note_on(0, 0, 62, 100), note_off(10, 0, 62), end()]],
    );
    let score = load_midi(&data).unwrap();
    assert_eq!(score.tracks[0].notes.len(), 1);
    assert_eq!(score.tracks[0].notes[0].pitch, 62);
}

#[test]
fn garbage_is_rejected() {
    let err = load_midi(b"definitely not a midi file").unwrap_err();
    assert!(matches!(err, FormatError::Midi(_)));
}

#[test]
fn empty_file_has_no_tracks() {
    let data = encode(Format::SingleTrack, vec![vec![end()]]);
    let score = load_midi(&data).unwrap();
    assert!(score.first_track().is_none());
}
