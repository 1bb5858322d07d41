//! Audio system
//!
//! Loaded audio is split into two resource kinds sharing one control surface:
//!
//! - **Buffered clips**: decoded fully into memory, for short effects
//! - **Streamed tracks**: decoded progressively from disk, for music
//!
//! Each kind lives in its own [`ResourceManager`], addressed by [`AudioId`].
//! The manager never decodes audio itself; that is delegated to an
//! [`AudioBackend`](backend::AudioBackend).

pub mod backend;
pub mod ids;
pub mod loader;
pub mod manager;
pub mod mixer;
pub mod resource;
pub mod table;
pub mod validator;

use std::path::PathBuf;
use thiserror::Error;

pub use backend::{AudioBackend, HandleSettings, PlaybackHandle, PlaybackStatus};
pub use ids::{AudioId, IdAllocator};
pub use loader::LoadOptions;
pub use manager::ResourceManager;
pub use mixer::{db_to_linear, linear_to_db};
pub use resource::{AudioHandle, AudioResource, ResourceKind};
pub use table::ResourceTable;
pub use validator::{LoadValidator, AUDIO_LIMIT, SUPPORTED_EXTENSIONS};

use crate::config::AudioConfig;

/// Errors raised by the audio system
#[derive(Debug, Error)]
pub enum AudioError {
    /// Load path does not exist on the filesystem
    #[error("Invalid path: {0:?} does not exist on this filesystem")]
    InvalidPath(PathBuf),

    /// File extension is not in the supported list
    #[error("Unsupported file type: {0:?}")]
    UnsupportedFileType(String),

    /// The destination table already holds the maximum number of resources
    #[error("Audio limit of {limit} exceeded, unload unused audio first")]
    CapacityExceeded {
        /// Maximum number of resources per manager
        limit: usize,
    },

    /// No resource with this identifier is loaded
    #[error("Invalid audio id: {0}")]
    InvalidId(AudioId),

    /// The identifier space of a manager has been used up
    #[error("Audio id space exhausted")]
    IdSpaceExhausted,

    /// The backend could not open or decode a validated file
    #[error("Failed to decode {path:?}: {message}")]
    DecodeFailed {
        /// File that failed to decode
        path: PathBuf,
        /// Backend error message
        message: String,
    },

    /// Audio output could not be initialized
    #[error("Audio backend initialization failed: {0}")]
    BackendInitFailed(String),

    /// The backend could not start playback
    #[error("Playback failed: {0}")]
    PlaybackFailed(String),
}

/// Result alias for audio operations
pub type AudioResult<T> = Result<T, AudioError>;

/// Sound effects and music over one backend
///
/// Each half has its own table and therefore its own capacity ceiling.
pub struct AudioSystem<B: AudioBackend + Clone> {
    sounds: ResourceManager<B>,
    music: ResourceManager<B>,
}

impl<B: AudioBackend + Clone> AudioSystem<B> {
    /// Create an audio system using default load options
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, &AudioConfig::default())
    }

    /// Create an audio system with per-kind load defaults from `config`
    pub fn with_config(backend: B, config: &AudioConfig) -> Self {
        Self {
            sounds: ResourceManager::clips(backend.clone()).with_defaults(config.clip_defaults),
            music: ResourceManager::tracks(backend).with_defaults(config.track_defaults),
        }
    }

    /// Buffered clip manager
    pub fn sounds(&self) -> &ResourceManager<B> {
        &self.sounds
    }

    /// Mutable buffered clip manager
    pub fn sounds_mut(&mut self) -> &mut ResourceManager<B> {
        &mut self.sounds
    }

    /// Streamed track manager
    pub fn music(&self) -> &ResourceManager<B> {
        &self.music
    }

    /// Mutable streamed track manager
    pub fn music_mut(&mut self) -> &mut ResourceManager<B> {
        &mut self.music
    }

    /// True if any clip or track is currently playing
    pub fn is_active(&self) -> bool {
        self.sounds.is_manager_active() || self.music.is_manager_active()
    }

    /// Stop everything on both managers
    pub fn stop_all(&mut self) {
        self.sounds.stop_all();
        self.music.stop_all();
    }

    /// Unload everything on both managers
    pub fn unload_all(&mut self) {
        self.sounds.unload_all();
        self.music.unload_all();
    }
}

#[cfg(test)]
mod tests {
    use super::backend::headless::HeadlessBackend;
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_system_keeps_kinds_apart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blip.wav");
        std::fs::write(&path, b"RIFF").unwrap();

        let backend = HeadlessBackend::new(Duration::from_millis(500));
        let mut system = AudioSystem::new(backend.clone());

        let sfx = system.sounds_mut().load(&path).unwrap();
        let track = system.music_mut().load(&path).unwrap();

        // Separate allocators, so both start at 1
        assert_eq!(sfx, track);
        assert_eq!(system.sounds().kind(), ResourceKind::BufferedClip);
        assert_eq!(system.music().kind(), ResourceKind::StreamedTrack);
        assert_eq!(backend.live_handles(), 2);

        assert!(!system.is_active());
        system.music_mut().play(track).unwrap();
        assert!(system.is_active());

        system.stop_all();
        assert!(!system.is_active());

        system.unload_all();
        assert_eq!(backend.live_handles(), 0);
    }

    #[test]
    fn test_error_messages() {
        let err = AudioError::CapacityExceeded { limit: AUDIO_LIMIT };
        assert!(err.to_string().contains("255"));

        let err = AudioError::InvalidId(AudioId::from_raw(7));
        assert_eq!(err.to_string(), "Invalid audio id: 7");
    }
}
