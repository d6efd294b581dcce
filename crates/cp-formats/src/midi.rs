//! Standard MIDI File loader.

use std::collections::{HashMap, VecDeque};
use std::path::Path;

use cp_ir::{Note, Score, Track};
use midly::{MetaMessage, MidiMessage, Smf, TrackEventKind};
use tracing::debug;

use crate::tempo::TempoMap;
use crate::FormatError;

/// General MIDI percussion channel (0-based).
const DRUM_CHANNEL: u8 = 9;

/// Notes collected for one (source track, channel) pair.
struct Voice {
    track: usize,
    channel: u8,
    program: u8,
    /// (start tick, end tick, key, velocity)
    notes: Vec<(u64, u64, u8, u8)>,
}

/// Read and parse a MIDI file from disk.
pub fn load_midi_file(path: impl AsRef<Path>) -> Result<Score, FormatError> {
    let data = std::fs::read(path)?;
    load_midi(&data)
}

/// Parse a Standard MIDI File.
///
/// Every (track, channel) pair with at least one note becomes a `Track`,
/// ordered by source track then first note. Note-offs close the oldest
/// open note of the same key (a note-on with velocity 0 counts as a
/// note-off); notes still open at the end of their track are dropped.
pub fn load_midi(data: &[u8]) -> Result<Score, FormatError> {
    let smf = Smf::parse(data)?;

    let mut tempo_changes = Vec::new();
    let mut track_names: Vec<Option<String>> = Vec::with_capacity(smf.tracks.len());
    let mut voices: Vec<Voice> = Vec::new();
    let mut dropped = 0usize;

    for (track_idx, events) in smf.tracks.iter().enumerate() {
        let mut tick: u64 = 0;
        let mut name = None;
        let mut programs = [0u8; 16];
        let mut open: HashMap<(u8, u8), VecDeque<(u64, u8)>> = HashMap::new();
        let mut slots: HashMap<u8, usize> = HashMap::new();

        for event in events {
            tick += event.delta.as_int() as u64;
            match event.kind {
                TrackEventKind::Meta(MetaMessage::Tempo(t)) => {
                    tempo_changes.push((tick, t.as_int()));
                }
                TrackEventKind::Meta(MetaMessage::TrackName(raw)) if name.is_none() => {
                    let text = String::from_utf8_lossy(raw).trim().to_string();
                    if !text.is_empty() {
                        name = Some(text);
                    }
                }
                TrackEventKind::Midi { channel, message } => {
                    let ch = channel.as_int();
                    match message {
                        MidiMessage::ProgramChange { program } => {
                            programs[ch as usize] = program.as_int();
                        }
                        MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                            open.entry((ch, key.as_int()))
                                .or_default()
                                .push_back((tick, vel.as_int()));
                        }
                        MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                            let key = key.as_int();
                            let Some((start, vel)) =
                                open.get_mut(&(ch, key)).and_then(VecDeque::pop_front)
                            else {
                                continue;
                            };
                            let slot = *slots.entry(ch).or_insert_with(|| {
                                voices.push(Voice {
                                    track: track_idx,
                                    channel: ch,
                                    program: programs[ch as usize],
                                    notes: Vec::new(),
                                });
                                voices.len() - 1
                            });
                            voices[slot].notes.push((start, tick, key, vel));
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        dropped += open.values().map(VecDeque::len).sum::<usize>();
        track_names.push(name);
    }

    if dropped > 0 {
        debug!(dropped, "ignored notes without a note-off");
    }

    let tempo = TempoMap::new(smf.header.timing, tempo_changes);

    // Voices are completed in note-off order; order them by first note-on.
    voices.sort_by_key(|v| (v.track, v.notes.iter().map(|n| n.0).min().unwrap_or(0)));

    let channels_per_track = |track: usize| voices.iter().filter(|v| v.track == track).count();
    let tracks: Vec<Track> = voices
        .iter()
        .map(|voice| {
            let base = track_names
                .get(voice.track)
                .cloned()
                .flatten()
                .unwrap_or_else(|| format!("Track {}", voice.track + 1));
            let name = if channels_per_track(voice.track) > 1 {
                format!("{} (ch {})", base, voice.channel + 1)
            } else {
                base
            };

            let mut notes: Vec<_> = voice.notes.clone();
            notes.sort_by_key(|n| n.0);
            Track {
                name,
                channel: voice.channel,
                program: voice.program,
                is_drum: voice.channel == DRUM_CHANNEL,
                notes: notes
                    .into_iter()
                    .map(|(start, end, pitch, velocity)| Note {
                        pitch,
                        start: tempo.seconds_at(start),
                        end: tempo.seconds_at(end),
                        velocity,
                    })
                    .collect(),
            }
        })
        .collect();

    let title = track_names.first().cloned().flatten().unwrap_or_default();

    Ok(Score { title, tracks })
}
