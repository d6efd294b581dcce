//! Transport bar: Load, Restart, track picker, playback status.

use std::time::Instant;

use super::GuiState;

pub fn transport_panel(ui: &imgui::Ui, gui: &mut GuiState) {
    if ui.button("Load") {
        load_midi_dialog(gui);
    }
    ui.same_line();
    ui.disabled(gui.score.is_none(), || {
        if ui.button("Restart") {
            gui.restart();
        }
    });

    let names: Vec<String> = gui
        .score
        .as_ref()
        .map(|score| {
            score
                .tracks
                .iter()
                .map(|t| format!("{} ({} notes)", t.name, t.notes.len()))
                .collect()
        })
        .unwrap_or_default();
    if names.len() > 1 {
        ui.same_line();
        ui.set_next_item_width(240.0);
        let mut selected = gui.track;
        if ui.combo_simple_string("Track", &mut selected, &names) && selected != gui.track {
            gui.select_track(selected);
        }
    }

    ui.same_line();
    ui.separator();
    ui.same_line();

    if let Some(score) = &gui.score {
        let title = if score.title.is_empty() {
            gui.source
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        } else {
            score.title.clone()
        };
        ui.text(title);
        ui.same_line();
    }

    if let Some(session) = &gui.session {
        let renderer = session.renderer();
        let window = renderer.window();
        let song_time = session
            .song_time(Instant::now())
            .map(|t| format!("{t:.1}s"))
            .unwrap_or_else(|| "-".to_string());
        ui.text(format!(
            "{} | audio: {} | speed: {:.1}x | t = {} | candles {}..{} of {}",
            session.phase(),
            session.audio_mode(),
            session.speed(),
            song_time,
            window.start(),
            window.end(),
            renderer.notes().len(),
        ));
        ui.same_line();
    }

    if !gui.status.is_empty() {
        ui.text(&gui.status);
    }
}

fn load_midi_dialog(gui: &mut GuiState) {
    let file = rfd::FileDialog::new()
        .add_filter("MIDI files", &["mid", "midi", "MID", "MIDI"])
        .pick_file();

    let Some(path) = file else { return };
    gui.open(&path, 0);
}
