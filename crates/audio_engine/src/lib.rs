//! # Audio Engine
//!
//! Lifecycle, identity and playback state of loaded audio for interactive
//! applications.
//!
//! ## Features
//!
//! - **Two resource kinds**: buffered clips for effects, streamed tracks for music
//! - **ID-indexed**: callers hold plain identifiers, never handles
//! - **Uniform control**: play/pause/stop, volume, pitch and position, per id or for all
//! - **Pluggable backend**: Rodio for real output, headless for tests and servers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use audio_engine::prelude::*;
//! use audio_engine::audio::backend::rodio_backend::RodioDevice;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let device = RodioDevice::open_default()?;
//!     let mut audio = AudioSystem::new(device.backend());
//!
//!     let theme = audio.music_mut().load("resources/audio/theme.ogg")?;
//!     audio.music_mut().play(theme)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

pub mod audio;
pub mod config;
pub mod foundation;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        audio::{
            db_to_linear, linear_to_db, AudioError, AudioId, AudioResult, AudioSystem,
            LoadOptions, PlaybackStatus, ResourceKind, ResourceManager,
        },
        config::{AudioConfig, Config, ConfigError},
    };
}
