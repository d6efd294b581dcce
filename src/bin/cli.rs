//! candleplay CLI: headless playback with a text progress line.
//!
//! Usage:
//!   cp-cli path/to/song.mid
//!   cp-cli path/to/song.mid --track 2 --no-audio
//!   cp-cli --list-devices

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use clap::Parser;
use cp_master::{DisplayList, Score, Session, SessionConfig, TickReport};

/// How long to let the audio tail play after the last candle.
const AUDIO_TAIL_LIMIT: Duration = Duration::from_secs(30);

#[derive(Parser, Debug)]
#[command(name = "cp-cli", version, about = "Headless MIDI candlestick player")]
struct Args {
    /// MIDI file to play
    #[arg(required_unless_present = "list_devices")]
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

    /// Print the score summary and exit
    #[arg(long)]
    info: bool,

    /// List audio output devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    candleplay::logger::init_logging(args.verbose);

    if args.list_devices {
        return list_devices();
    }

    let mut config = match SessionConfig::discover(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };
    if args.no_audio {
        config.enable_audio = false;
    }

    let Some(path) = args.file else {
        eprintln!("Usage: cp-cli <file.mid> [--track N] [--no-audio]");
        return ExitCode::from(2);
    };
    let score = match cp_master::load_midi_file(&path) {
        Ok(score) => score,
        Err(err) => {
            eprintln!("Failed to load {}: {}", path.display(), err);
            return ExitCode::FAILURE;
        }
    };

    print_score(&score);
    if args.info {
        return ExitCode::SUCCESS;
    }

    let mut session = match Session::for_track(&score, args.track, config) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    play(&mut session)
}

fn print_score(score: &Score) {
    let title: &str = if score.title.is_empty() { "(untitled)" } else { &score.title };
    println!("Title:    {}", title);
    println!("Duration: {:.1}s", score.duration());
    println!("Notes:    {}", score.note_count());
    println!("Tracks:");
    for (i, track) in score.tracks.iter().enumerate() {
        println!(
            "  {:>2}: {:<28} ch {:>2}{} {:>5} notes, {:.1}s",
            i,
            track.name,
            track.channel + 1,
            if track.is_drum { " (drums)" } else { "" },
            track.notes.len(),
            track.end_time(),
        );
    }
    println!();
}

fn play(session: &mut Session) -> ExitCode {
    let mut surface = DisplayList::new();
    let stop = AtomicBool::new(false);

    println!("Playing...");
    let result = session.run_blocking(&mut surface, &stop, |session, report| {
        if let TickReport::Rendered { song_time, outcome } = report {
            print!(
                "\r{} | audio: {} | {:.1}x | t = {:7.2}s | candles {:>5}..{:<5} of {}",
                session.phase(),
                session.audio_mode(),
                session.speed(),
                song_time,
                outcome.start,
                outcome.end,
                session.renderer().notes().len(),
            );
            let _ = std::io::stdout().flush();
        }
    });
    println!();

    if let Err(err) = result {
        eprintln!("Playback failed: {err}");
        return ExitCode::FAILURE;
    }

    if !session.wait_for_audio(AUDIO_TAIL_LIMIT) {
        eprintln!("Audio did not finish, stopping");
    }
    session.end();
    println!("Done.");
    ExitCode::SUCCESS
}

fn list_devices() -> ExitCode {
    let devices = cp_master::list_output_devices();
    if devices.is_empty() {
        println!("No audio output devices found.");
        return ExitCode::SUCCESS;
    }
    for device in devices {
        println!(
            "{:<10} {}{}",
            device.host,
            device.name,
            if device.is_default { " (default)" } else { "" }
        );
    }
    ExitCode::SUCCESS
}
