//! UI modules and layout composition.

mod chart;
mod transport;

use std::path::{Path, PathBuf};
use std::time::Instant;

use cp_master::{DisplayList, Score, Session, SessionConfig, SessionPhase};
use tracing::{error, info, warn};

/// UI-facing state bundle, passed to all panel functions.
/// No GL/imgui/renderer fields.
pub struct GuiState {
    pub config: SessionConfig,
    pub score: Option<Score>,
    pub source: Option<PathBuf>,
    pub track: usize,
    pub session: Option<Session>,
    /// What the session has drawn; painted every frame
    pub surface: DisplayList,
    pub status: String,
}

impl GuiState {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            score: None,
            source: None,
            track: 0,
            session: None,
            surface: DisplayList::new(),
            status: "Load a MIDI file to start".to_string(),
        }
    }

    /// Load a MIDI file and queue a session for `track`.
    pub fn open(&mut self, path: &Path, track: usize) {
        match cp_master::load_midi_file(path) {
            Err(err) => {
                warn!(path = %path.display(), %err, "could not load score");
                self.status = format!("Load error: {err}");
            }
            Ok(score) => {
                let name = path.file_name().unwrap_or_default().to_string_lossy();
                info!(file = %name, tracks = score.tracks.len(), "loaded score");
                self.source = Some(path.to_path_buf());
                self.score = Some(score);
                self.select_track(track);
            }
        }
    }

    /// Replace the running session with a fresh one over `track`.
    pub fn select_track(&mut self, track: usize) {
        self.shutdown();
        self.session = None;
        self.surface.reset();

        let Some(score) = &self.score else { return };
        match Session::for_track(score, track, self.config.clone()) {
            Ok(session) => {
                self.track = track;
                self.status = format!("{} notes", session.notes().len());
                self.session = Some(session);
            }
            Err(err) => self.status = format!("{err}"),
        }
    }

    /// Start the current track over. Keeps the synthesized audio.
    pub fn restart(&mut self) {
        let audio = self
            .session
            .as_ref()
            .and_then(|session| session.audio().cloned());
        self.select_track(self.track);
        if let (Some(session), Some(audio)) = (self.session.take(), audio) {
            self.session = Some(session.with_audio(audio));
        }
    }

    /// End the session, stopping its audio.
    pub fn shutdown(&mut self) {
        if let Some(session) = &mut self.session {
            session.end();
        }
    }

    /// Start the session on its first frame, then tick at the fixed interval.
    fn drive(&mut self, now: Instant) {
        let Some(session) = &mut self.session else { return };

        if session.phase() == SessionPhase::Idle {
            if let Err(err) = session.start(&mut self.surface) {
                error!(%err, "session failed to start");
                self.status = format!("Start failed: {err}");
                return;
            }
        }

        if let Err(err) = session.poll(now, &mut self.surface) {
            error!(%err, "tick failed");
            self.status = format!("Playback error: {err}");
            session.end();
        }
    }
}

pub fn build_ui(ui: &imgui::Ui, gui: &mut GuiState) {
    gui.drive(Instant::now());

    let display_size = ui.io().display_size;
    ui.window("candleplay")
        .position([0.0, 0.0], imgui::Condition::Always)
        .size(display_size, imgui::Condition::Always)
        .flags(
            imgui::WindowFlags::NO_TITLE_BAR
                | imgui::WindowFlags::NO_RESIZE
                | imgui::WindowFlags::NO_MOVE
                | imgui::WindowFlags::NO_COLLAPSE
                | imgui::WindowFlags::NO_BRING_TO_FRONT_ON_FOCUS,
        )
        .build(|| {
            transport::transport_panel(ui, gui);
            ui.separator();

            let avail = ui.content_region_avail();
            ui.child_window("chart")
                .size(avail)
                .build(|| chart::chart_panel(ui, &gui.surface));
        });
}
