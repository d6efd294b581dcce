//! Playback session: audio negotiation, song-time clock and render ticks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use cp_audio::AudioBackend;
use cp_engine::{RenderSurface, SineSynth, Synthesizer, TickOutcome, Theme, WindowedRenderer};
use cp_ir::{Note, PcmBuffer, Score};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::state::{AudioMode, PlaybackEvent, PlaybackState, SessionPhase};
use crate::ticker::Ticker;
use crate::SessionError;

/// Pitch of the device validation tone (A4).
const PROBE_FREQUENCY: f32 = 440.0;
const PROBE_AMPLITUDE: f32 = 0.05;

/// Result of one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickReport {
    /// A backend was chosen but has not reported that output began
    AwaitingAudio,
    Rendered { song_time: f64, outcome: TickOutcome },
    Finished,
}

/// One playback of one note sequence.
///
/// Owns the renderer and the timing state. The tick driver (GUI frame loop
/// or `run_blocking`) is the only caller that mutates it; the audio thread
/// reports back over a channel.
pub struct Session {
    config: SessionConfig,
    notes: Vec<Note>,
    renderer: WindowedRenderer,
    state: PlaybackState,
    phase: SessionPhase,
    history: Vec<SessionPhase>,
    synth: Box<dyn Synthesizer>,
    backends: Vec<Box<dyn AudioBackend>>,
    audio: Option<Arc<PcmBuffer>>,
    events: Option<Receiver<PlaybackEvent>>,
    awaiting_since: Option<Instant>,
    audio_done: bool,
    stop_signal: Arc<AtomicBool>,
    ticker: Ticker,
}

impl Session {
    pub fn new(notes: Vec<Note>, config: SessionConfig) -> Self {
        let visual = cp_ir::encode(&notes);
        let renderer = WindowedRenderer::with_style(
            visual,
            config.capacity,
            config.style,
            Theme::default(),
        );
        let backends = cp_audio::default_backends(config.output_device.as_deref());
        let ticker = Ticker::new(config.tick_interval());
        Self {
            config,
            notes,
            renderer,
            state: PlaybackState::default(),
            phase: SessionPhase::Idle,
            history: vec![SessionPhase::Idle],
            synth: Box::new(SineSynth::default()),
            backends,
            audio: None,
            events: None,
            awaiting_since: None,
            audio_done: false,
            stop_signal: Arc::new(AtomicBool::new(false)),
            ticker,
        }
    }

    /// Session over track `index` of `score`.
    pub fn for_track(
        score: &Score,
        index: usize,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let track = score.track(index).ok_or(SessionError::NoSuchTrack(index))?;
        Ok(Self::new(track.notes.clone(), config))
    }

    /// Replace the ranked backend list.
    pub fn with_backends(mut self, backends: Vec<Box<dyn AudioBackend>>) -> Self {
        self.backends = backends;
        self
    }

    pub fn with_synth(mut self, synth: Box<dyn Synthesizer>) -> Self {
        self.synth = synth;
        self
    }

    /// Reuse an already synthesized buffer instead of synthesizing on start.
    pub fn with_audio(mut self, buffer: Arc<PcmBuffer>) -> Self {
        self.audio = Some(buffer);
        self
    }

    // --- Lifecycle ---

    /// Prepare the surface, negotiate audio and start the clock.
    ///
    /// Always ends in `Running`: audio problems only change the speed.
    pub fn start(&mut self, surface: &mut dyn RenderSurface) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Idle {
            return Err(SessionError::AlreadyStarted);
        }
        self.renderer.prepare(surface);

        let chosen = match self.prepare_audio() {
            Some(buffer) => self.probe_backends().map(|found| (found, buffer)),
            None => None,
        };

        match chosen {
            Some(((backend, mode), buffer)) => self.launch(backend, mode, buffer)?,
            None => {
                self.enter(SessionPhase::NoAudio);
                self.run_without_audio(Instant::now())?;
            }
        }

        self.enter(SessionPhase::Running);
        Ok(())
    }

    /// Advance to wall-clock instant `now`.
    pub fn tick(
        &mut self,
        now: Instant,
        surface: &mut dyn RenderSurface,
    ) -> Result<TickReport, SessionError> {
        match self.phase {
            SessionPhase::Running => {}
            SessionPhase::Finished => return Ok(TickReport::Finished),
            _ => return Err(SessionError::NotRunning),
        }

        self.drain_events(now)?;

        if !self.state.clock.is_started() {
            let waited = self
                .awaiting_since
                .map(|since| now.saturating_duration_since(since))
                .unwrap_or_default();
            if waited < self.config.audio_start_timeout() {
                return Ok(TickReport::AwaitingAudio);
            }
            warn!(?waited, "audio did not start in time, continuing without audio");
            self.run_without_audio(now)?;
        }

        let song_time = self.state.clock.song_time_at(now)?;
        let outcome = self.renderer.tick(song_time, surface);
        if self.renderer.is_exhausted() {
            info!(song_time, "all notes drawn");
            self.enter(SessionPhase::Finished);
        }
        Ok(TickReport::Rendered { song_time, outcome })
    }

    /// Tick if the fixed interval has elapsed since the last tick.
    pub fn poll(
        &mut self,
        now: Instant,
        surface: &mut dyn RenderSurface,
    ) -> Result<Option<TickReport>, SessionError> {
        if self.is_finished() || !self.ticker.due(now) {
            return Ok(None);
        }
        self.tick(now, surface).map(Some)
    }

    /// Drive the session from the calling thread until every note is drawn
    /// or `stop` is raised. Starts the session if needed.
    pub fn run_blocking(
        &mut self,
        surface: &mut dyn RenderSurface,
        stop: &AtomicBool,
        mut on_tick: impl FnMut(&Session, &TickReport),
    ) -> Result<(), SessionError> {
        if self.phase == SessionPhase::Idle {
            self.start(surface)?;
        }
        while !self.is_finished() {
            if stop.load(Ordering::Relaxed) {
                self.end();
                break;
            }
            if let Some(report) = self.poll(Instant::now(), surface)? {
                on_tick(self, &report);
            }
            thread::sleep(self.ticker.until_next(Instant::now()));
        }
        Ok(())
    }

    /// End the session and ask the audio thread to stop. The thread is
    /// never joined.
    pub fn end(&mut self) {
        self.stop_signal.store(true, Ordering::Relaxed);
        if self.phase != SessionPhase::Finished {
            info!("session ended by host");
            self.enter(SessionPhase::Finished);
        }
    }

    /// Block until the playback thread reports that it is done, up to
    /// `limit`. Returns false on timeout; sessions without audio return
    /// true at once.
    pub fn wait_for_audio(&mut self, limit: Duration) -> bool {
        if self.audio_done {
            return true;
        }
        let Some(rx) = &self.events else {
            return true;
        };
        let deadline = Instant::now() + limit;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok(PlaybackEvent::Started(_)) => continue,
                Ok(_) | Err(RecvTimeoutError::Disconnected) => {
                    self.audio_done = true;
                    return true;
                }
                Err(RecvTimeoutError::Timeout) => return false,
            }
        }
    }

    // --- Accessors ---

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Every phase entered so far, in order.
    pub fn history(&self) -> &[SessionPhase] {
        &self.history
    }

    pub fn playback(&self) -> &PlaybackState {
        &self.state
    }

    pub fn audio_mode(&self) -> AudioMode {
        self.state.audio_mode
    }

    pub fn speed(&self) -> f64 {
        self.state.clock.speed()
    }

    /// Song time at `now`, if the clock has started.
    pub fn song_time(&self, now: Instant) -> Option<f64> {
        self.state.clock.song_time_at(now).ok()
    }

    pub fn renderer(&self) -> &WindowedRenderer {
        &self.renderer
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The synthesized buffer, once available.
    pub fn audio(&self) -> Option<&Arc<PcmBuffer>> {
        self.audio.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.phase == SessionPhase::Finished
    }

    /// The playback thread reported completion or failure.
    pub fn audio_done(&self) -> bool {
        self.audio_done
    }

    // --- Internals ---

    fn enter(&mut self, phase: SessionPhase) {
        debug!(from = %self.phase, to = %phase, "session phase");
        self.phase = phase;
        self.history.push(phase);
    }

    fn prepare_audio(&mut self) -> Option<Arc<PcmBuffer>> {
        if !self.config.enable_audio {
            info!("audio disabled by configuration");
            return None;
        }
        if let Some(buffer) = &self.audio {
            return Some(buffer.clone());
        }
        match self.synth.synthesize(&self.notes, self.config.sample_rate) {
            Ok(buffer) => {
                debug!(seconds = buffer.duration(), "synthesized playback buffer");
                let buffer = Arc::new(buffer);
                self.audio = Some(buffer.clone());
                Some(buffer)
            }
            Err(err) => {
                warn!(%err, "synthesis failed, continuing without audio");
                None
            }
        }
    }

    /// Probe backends in rank order and return the first that works.
    fn probe_backends(&mut self) -> Option<(Box<dyn AudioBackend>, AudioMode)> {
        let tone = PcmBuffer::tone(
            PROBE_FREQUENCY,
            self.config.probe_tone_seconds(),
            self.config.sample_rate,
            PROBE_AMPLITUDE,
        );
        let backends = std::mem::take(&mut self.backends);
        for (rank, mut backend) in backends.into_iter().enumerate() {
            let (trying, ok, mode) = if rank == 0 {
                (
                    SessionPhase::TryingPrimaryAudio,
                    SessionPhase::PrimaryAudioOk,
                    AudioMode::DeviceBackend,
                )
            } else {
                (
                    SessionPhase::TryingAlternateAudio,
                    SessionPhase::AlternateAudioOk,
                    AudioMode::AlternateBackend,
                )
            };
            self.enter(trying);
            match backend.probe(&tone) {
                Ok(()) => {
                    info!(backend = backend.name(), "audio backend ready");
                    self.enter(ok);
                    return Some((backend, mode));
                }
                Err(err) => warn!(backend = backend.name(), %err, "audio backend failed"),
            }
        }
        None
    }

    /// Hand the backend to a detached playback thread.
    fn launch(
        &mut self,
        backend: Box<dyn AudioBackend>,
        mode: AudioMode,
        buffer: Arc<PcmBuffer>,
    ) -> Result<(), SessionError> {
        let name = backend.name().to_string();
        let (tx, rx) = mpsc::channel();
        let stop = self.stop_signal.clone();
        let spawned = thread::Builder::new()
            .name(format!("cp-audio-{name}"))
            .spawn(move || {
                let started = tx.clone();
                let result = backend.play(buffer, &stop, &mut |at: Instant| {
                    let _ = started.send(PlaybackEvent::Started(at));
                });
                let _ = tx.send(match result {
                    Ok(()) => PlaybackEvent::Completed,
                    Err(err) => PlaybackEvent::Failed(err.to_string()),
                });
            });

        match spawned {
            Ok(_) => {
                self.state.audio_mode = mode;
                self.state.backend = Some(name);
                self.events = Some(rx);
                self.awaiting_since = Some(Instant::now());
                Ok(())
            }
            Err(err) => {
                warn!(%err, "could not spawn audio thread, continuing without audio");
                self.enter(SessionPhase::NoAudio);
                self.run_without_audio(Instant::now())
            }
        }
    }

    fn run_without_audio(&mut self, origin: Instant) -> Result<(), SessionError> {
        // A late start would play out of sync with the fallback clock
        if self.events.take().is_some() {
            self.stop_signal.store(true, Ordering::Relaxed);
        }
        self.state.audio_mode = AudioMode::Unavailable;
        self.state.backend = None;
        self.awaiting_since = None;
        self.state.clock.set_fallback_speed(self.config.fallback_speed)?;
        self.state.clock.start(origin)?;
        info!(speed = self.config.fallback_speed, "running without audio");
        Ok(())
    }

    fn drain_events(&mut self, now: Instant) -> Result<(), SessionError> {
        let pending: Vec<PlaybackEvent> = match &self.events {
            Some(rx) => rx.try_iter().collect(),
            None => return Ok(()),
        };

        for event in pending {
            match event {
                PlaybackEvent::Started(at) => {
                    if !self.state.clock.is_started() {
                        self.state.clock.start(at)?;
                        self.awaiting_since = None;
                        info!(backend = ?self.state.backend, "audio playback started");
                    }
                }
                PlaybackEvent::Completed => {
                    self.audio_done = true;
                    debug!("audio playback completed");
                    if !self.state.clock.is_started() {
                        warn!("audio finished without starting, continuing without audio");
                        self.run_without_audio(now)?;
                    }
                }
                PlaybackEvent::Failed(reason) => {
                    self.audio_done = true;
                    if self.state.clock.is_started() {
                        warn!(%reason, "audio playback failed");
                    } else {
                        warn!(%reason, "audio failed before start, continuing without audio");
                        self.run_without_audio(now)?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop_signal.store(true, Ordering::Relaxed);
    }
}
