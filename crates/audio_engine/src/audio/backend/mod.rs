//! Audio backend implementations
//!
//! Platform-independent abstraction over the decoding/playback engine.
//! The resource manager only talks to these traits; it never decodes audio.

pub mod headless;
#[cfg(feature = "rodio-backend")]
pub mod rodio_backend;

use crate::audio::AudioResult;
use std::path::Path;
use std::time::Duration;

/// Playback state reported by a handle
///
/// Owned and transitioned by the engine; the manager only observes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackStatus {
    /// Not playing, offset reset
    Stopped,
    /// Suspended at the current offset
    Paused,
    /// Producing audio
    Playing,
}

/// Playback capability of one loaded audio resource
///
/// # Threading
/// NOT Send + Sync: the manager is single-threaded and handles are only ever
/// touched from the thread that owns it.
pub trait PlaybackHandle {
    /// Start or resume playback
    ///
    /// # Errors
    /// `PlaybackFailed` if the engine cannot start the handle, or
    /// `DecodeFailed` if a stream can no longer be reopened.
    fn play(&mut self) -> AudioResult<()>;

    /// Pause at the current offset
    fn pause(&mut self);

    /// Stop playback and rewind
    fn stop(&mut self);

    /// Set volume on the 0..=100 scale
    fn set_volume(&mut self, volume: f32);

    /// Set pitch multiplier (1.0 = unchanged)
    fn set_pitch(&mut self, pitch: f32);

    /// Move the playback offset
    fn set_offset(&mut self, offset: Duration);

    /// Current playback offset
    fn offset(&self) -> Duration;

    /// Current playback status
    fn status(&self) -> PlaybackStatus;
}

/// Handle over audio fully decoded into memory
pub trait ClipHandle: PlaybackHandle {
    /// Total duration of the decoded sample buffer
    fn buffer_duration(&self) -> Duration;
}

/// Handle over audio decoded progressively from disk
pub trait StreamHandle: PlaybackHandle {
    /// Total duration reported by the open stream
    fn stream_duration(&self) -> Duration;
}

/// Parameters applied to a handle when it is constructed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleSettings {
    /// Loop back to the start when the end is reached
    pub looping: bool,
    /// Volume on the 0..=100 scale
    pub volume: f32,
    /// Pitch multiplier
    pub pitch: f32,
}

impl Default for HandleSettings {
    fn default() -> Self {
        Self {
            looping: false,
            volume: 100.0,
            pitch: 1.0,
        }
    }
}

/// Factory for playback handles
pub trait AudioBackend {
    /// Handle type for buffered clips
    type Clip: ClipHandle + 'static;
    /// Handle type for streamed tracks
    type Stream: StreamHandle + 'static;

    /// Decode the whole file at `path` into memory
    ///
    /// # Errors
    /// `DecodeFailed` if the file cannot be opened or decoded.
    fn decode_clip(&self, path: &Path, settings: &HandleSettings) -> AudioResult<Self::Clip>;

    /// Open the file at `path` for progressive decoding
    ///
    /// # Errors
    /// `DecodeFailed` if the file cannot be opened or decoded.
    fn open_stream(&self, path: &Path, settings: &HandleSettings) -> AudioResult<Self::Stream>;
}
