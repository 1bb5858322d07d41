//! Jukebox demo application
//!
//! Loads one file, plays it to the end and unloads it.
//!
//! ```text
//! jukebox <path> [--stream] [--volume <0-100>] [--config <audio.toml>] [--verbose]
//! ```

use audio_engine::audio::backend::rodio_backend::RodioDevice;
use audio_engine::foundation::logging::{self, LevelFilter};
use audio_engine::prelude::*;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Play one audio file through the default output device
#[derive(Parser, Debug)]
#[command(name = "jukebox", version, about)]
struct Args {
    /// Audio file to play
    path: PathBuf,

    /// Load as a streamed track instead of a buffered clip
    #[arg(long)]
    stream: bool,

    /// Playback volume, clamped to 0-100
    #[arg(long, value_name = "0-100")]
    volume: Option<f32>,

    /// Load defaults from a TOML or RON file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log loads, unloads and state changes
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init_with_level(if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });

    let config = match &args.config {
        Some(path) => AudioConfig::load_from_file(&path.to_string_lossy())?,
        None => AudioConfig::default(),
    };

    let device = RodioDevice::open_default()?;
    let mut audio = AudioSystem::with_config(device.backend(), &config);
    let manager = if args.stream {
        audio.music_mut()
    } else {
        audio.sounds_mut()
    };

    let id = manager.load(&args.path)?;
    if let Some(volume) = args.volume {
        manager.set_volume(id, volume)?;
    }
    log::info!(
        "Playing {} ({:?}, volume {:.0}, {:+.1} dB)",
        manager.get_path(id)?,
        manager.get_duration(id)?,
        manager.get_volume(id)?,
        linear_to_db(manager.get_volume(id)? / 100.0),
    );

    manager.play(id)?;
    while manager.is_playing(id)? {
        std::thread::sleep(POLL_INTERVAL);
    }

    manager.unload(id)?;
    log::info!("Done");
    Ok(())
}
