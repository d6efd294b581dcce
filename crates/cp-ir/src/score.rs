//! Score structure: tracks of timed notes.

/// A single note as emitted by a score loader.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Note {
    /// MIDI pitch (0-127)
    pub pitch: u8,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// MIDI velocity (1-127), only used for synthesis
    pub velocity: u8,
}

impl Note {
    pub fn new(pitch: u8, start: f64, end: f64) -> Self {
        Self {
            pitch,
            start,
            end,
            velocity: 100,
        }
    }

    /// Note length in seconds, never negative.
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// One instrument's worth of notes.
#[derive(Clone, Debug, Default)]
pub struct Track {
    pub name: String,
    /// MIDI channel the notes were read from
    pub channel: u8,
    /// Last program change seen before the first note
    pub program: u8,
    /// True for the General MIDI percussion channel
    pub is_drum: bool,
    /// Notes in encounter order (not necessarily sorted)
    pub notes: Vec<Note>,
}

impl Track {
    pub fn new(name: &str, notes: Vec<Note>) -> Self {
        Self {
            name: name.to_string(),
            notes,
            ..Default::default()
        }
    }

    /// End time of the last sounding note.
    pub fn end_time(&self) -> f64 {
        self.notes.iter().map(|n| n.end).fold(0.0, f64::max)
    }
}

/// A loaded score.
#[derive(Clone, Debug, Default)]
pub struct Score {
    pub title: String,
    pub tracks: Vec<Track>,
}

impl Score {
    /// Build a single-track score from bare notes.
    pub fn from_notes(notes: Vec<Note>) -> Self {
        Self {
            title: String::new(),
            tracks: vec![Track::new("Track 1", notes)],
        }
    }

    /// The track visualized by default.
    pub fn first_track(&self) -> Option<&Track> {
        self.tracks.first()
    }

    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Total number of notes across all tracks.
    pub fn note_count(&self) -> usize {
        self.tracks.iter().map(|t| t.notes.len()).sum()
    }

    /// End time of the last note in any track.
    pub fn duration(&self) -> f64 {
        self.tracks.iter().map(Track::end_time).fold(0.0, f64::max)
    }
}
