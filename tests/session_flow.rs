//! End-to-end session behavior against a retained display list.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use cp_engine::{SynthError, Synthesizer};
use cp_master::{
    AudioBackend, AudioError, AudioMode, DisplayList, Note, PcmBuffer, Score, Session,
    SessionConfig, SessionPhase, TickReport,
};

fn evenly_spaced(count: usize) -> Vec<Note> {
    (0..count)
        .map(|i| Note::new(48 + (i * 5 % 36) as u8, i as f64, i as f64 + 0.9))
        .collect()
}

/// Session with no audio backends: runs at the fallback speed.
fn silent_session(notes: Vec<Note>) -> Session {
    Session::new(notes, SessionConfig::default()).with_backends(Vec::new())
}

/// Wall instant at which a 4x session reads `song_time`.
fn at_song_time(origin: Instant, song_time: f64) -> Instant {
    origin + Duration::from_secs_f64(song_time / 4.0)
}

struct Unplugged;

impl AudioBackend for Unplugged {
    fn name(&self) -> &str {
        "unplugged"
    }

    fn probe(&mut self, _tone: &PcmBuffer) -> Result<(), AudioError> {
        Err(AudioError::DeviceInit("no such device".into()))
    }

    fn play(
        self: Box<Self>,
        _buffer: Arc<PcmBuffer>,
        _stop: &AtomicBool,
        _on_start: &mut dyn FnMut(Instant),
    ) -> Result<(), AudioError> {
        Err(AudioError::NoDevice)
    }
}

/// Reports a fixed start instant.
struct StartsAt(Instant);

impl AudioBackend for StartsAt {
    fn name(&self) -> &str {
        "starts-at"
    }

    fn probe(&mut self, _tone: &PcmBuffer) -> Result<(), AudioError> {
        Ok(())
    }

    fn play(
        self: Box<Self>,
        _buffer: Arc<PcmBuffer>,
        _stop: &AtomicBool,
        on_start: &mut dyn FnMut(Instant),
    ) -> Result<(), AudioError> {
        on_start(self.0);
        Ok(())
    }
}

struct Mute;

impl Synthesizer for Mute {
    fn synthesize(&self, _notes: &[Note], _rate: u32) -> Result<PcmBuffer, SynthError> {
        Err(SynthError::TooLong {
            seconds: 1e9,
            limit: 1800.0,
        })
    }
}

#[test]
fn window_slides_once_past_capacity() {
    let mut surface = DisplayList::new();
    let mut session = silent_session(evenly_spaced(40));
    session.start(&mut surface).unwrap();
    let origin = session.playback().origin().unwrap();

    for t in 0..=31 {
        session.tick(at_song_time(origin, t as f64), &mut surface).unwrap();
    }
    assert_eq!(surface.clear_count(), 0);
    assert_eq!(session.renderer().window().range(), 0..32);
    assert_eq!(surface.rects().count(), 32);

    let report = session.tick(at_song_time(origin, 35.0), &mut surface).unwrap();
    let TickReport::Rendered { song_time, outcome } = report else {
        panic!("expected a render, got {report:?}");
    };
    assert_eq!(song_time, 35.0);
    assert_eq!(outcome.due, 36);
    assert!(outcome.cleared);
    assert_eq!((outcome.start, outcome.end), (4, 36));
    assert_eq!(surface.clear_count(), 1);
    // Prepare plus one re-application after the clear
    assert_eq!(surface.theme_count(), 2);
    // Every visible candle is redrawn, nothing more
    assert_eq!(surface.rects().count(), 32);

    let bounds = surface.bounds().unwrap();
    assert_eq!(bounds.x, (-1.0, 32.0));
}

#[test]
fn all_backends_failing_still_animates() {
    let mut surface = DisplayList::new();
    let mut session = Session::new(evenly_spaced(10), SessionConfig::default())
        .with_backends(vec![Box::new(Unplugged), Box::new(Unplugged)]);
    session.start(&mut surface).unwrap();

    assert_eq!(session.phase(), SessionPhase::Running);
    assert!(session.history().contains(&SessionPhase::NoAudio));
    assert_eq!(session.audio_mode(), AudioMode::Unavailable);
    assert_eq!(session.speed(), 4.0);

    let origin = session.playback().origin().unwrap();
    let report = session.tick(origin + Duration::from_secs(1), &mut surface).unwrap();
    assert!(matches!(report, TickReport::Rendered { outcome, .. } if outcome.due == 5));
}

#[test]
fn audio_start_instant_becomes_origin() {
    let started = Instant::now() + Duration::from_millis(250);
    let mut surface = DisplayList::new();
    let mut session = Session::new(evenly_spaced(10), SessionConfig::default())
        .with_backends(vec![Box::new(StartsAt(started))]);
    session.start(&mut surface).unwrap();
    assert_eq!(session.audio_mode(), AudioMode::DeviceBackend);

    let deadline = Instant::now() + Duration::from_secs(5);
    while session.playback().origin().is_none() && Instant::now() < deadline {
        session.tick(Instant::now(), &mut surface).unwrap();
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(session.playback().origin(), Some(started));
    assert_eq!(session.speed(), 1.0);

    // Before the origin, song time reads zero
    assert_eq!(session.song_time(started - Duration::from_millis(100)), Some(0.0));
    assert_eq!(session.song_time(started + Duration::from_secs(3)), Some(3.0));
}

#[test]
fn synthesis_failure_runs_without_audio() {
    let mut surface = DisplayList::new();
    let mut session = Session::new(evenly_spaced(10), SessionConfig::default())
        .with_synth(Box::new(Mute))
        .with_backends(vec![Box::new(StartsAt(Instant::now()))]);
    session.start(&mut surface).unwrap();

    assert_eq!(
        session.history(),
        &[SessionPhase::Idle, SessionPhase::NoAudio, SessionPhase::Running]
    );
    assert!(session.audio().is_none());
    assert_eq!(session.speed(), 4.0);
}

#[test]
fn finished_session_ignores_ticks() {
    let mut surface = DisplayList::new();
    let mut session = silent_session(evenly_spaced(5));
    session.start(&mut surface).unwrap();
    let origin = session.playback().origin().unwrap();

    session.tick(at_song_time(origin, 10.0), &mut surface).unwrap();
    assert_eq!(session.phase(), SessionPhase::Finished);
    assert!(session.renderer().is_exhausted());

    let before = surface.primitives().len();
    for later in [20.0, 30.0] {
        let report = session.tick(at_song_time(origin, later), &mut surface).unwrap();
        assert_eq!(report, TickReport::Finished);
    }
    assert_eq!(surface.primitives().len(), before);
}

#[test]
fn empty_track_finishes_on_first_tick() {
    let mut surface = DisplayList::new();
    let mut session = silent_session(Vec::new());
    session.start(&mut surface).unwrap();
    session.tick(Instant::now(), &mut surface).unwrap();
    assert!(session.is_finished());
    assert_eq!(surface.rects().count(), 0);
}

#[test]
fn session_for_selected_track() {
    let mut score = Score::from_notes(evenly_spaced(3));
    score.tracks.push(cp_master::Track::new("Bass", evenly_spaced(7)));

    let session = Session::for_track(&score, 1, SessionConfig::default()).unwrap();
    assert_eq!(session.notes().len(), 7);
    assert_eq!(session.renderer().notes().len(), 7);
}
