//! candleplay - plays a MIDI track while charting its notes as candlesticks.
//! Uses winit + glutin + glow + imgui-rs for the GUI.

mod app;
mod ui;

use std::path::PathBuf;

use app::App;
use clap::Parser;
use cp_master::SessionConfig;
use tracing::error;
use ui::GuiState;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::WindowId;

#[derive(Parser, Debug)]
#[command(name = "candleplay", version, about = "MIDI candlestick player")]
struct Args {
    /// MIDI file to open on start
    file: Option<PathBuf>,

    /// Track to play
    #[arg(short, long, default_value_t = 0)]
    track: usize,

    /// Config file (default: ./candleplay.toml if present)
    #[arg(short, long, env = "CANDLEPLAY_CONFIG")]
    config: Option<PathBuf>,

    /// Skip audio and run at the fallback speed
    #[arg(long)]
    no_audio: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    candleplay::logger::init_logging(args.verbose);

    let mut config = match SessionConfig::discover(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };
    if args.no_audio {
        config.enable_audio = false;
    }

    let mut gui = GuiState::new(config);
    if let Some(path) = &args.file {
        gui.open(path, args.track);
    }

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            error!(%err, "could not create event loop");
            std::process::exit(1);
        }
    };

    let mut state = AppState {
        pending: Some(gui),
        app: None,
    };
    if let Err(err) = event_loop.run_app(&mut state) {
        error!(%err, "event loop exited with error");
    }
}

struct AppState {
    /// GUI state waiting for the window to exist
    pending: Option<GuiState>,
    app: Option<App>,
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_some() {
            return;
        }
        let Some(gui) = self.pending.take() else {
            return;
        };
        self.app = Some(App::new(event_loop, 1200.0, 800.0, gui));
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(app) = &mut self.app else { return };

        let wrapped: winit::event::Event<()> = winit::event::Event::WindowEvent {
            window_id,
            event: event.clone(),
        };
        app.handle_event(&wrapped);

        match event {
            WindowEvent::CloseRequested => {
                app.gui.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => app.handle_resize(size),
            WindowEvent::RedrawRequested => app.render_frame(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(app) = &self.app {
            app.window().request_redraw();
        }
    }
}
