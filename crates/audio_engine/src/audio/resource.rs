//! Audio resource types
//!
//! An [`AudioResource`] pairs load-time metadata with the one playback handle
//! it exclusively owns. Dropping the resource releases the handle.

use crate::audio::backend::{AudioBackend, PlaybackHandle};
use crate::audio::AudioId;
use std::fmt;
use std::time::Duration;

/// Upper bound of the volume domain
pub const MAX_VOLUME: f32 = 100.0;

/// Upper bound of the pitch domain
pub const MAX_PITCH: f32 = 15.0;

/// Which construction path a resource came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Decoded fully into memory, for short effects
    BufferedClip,
    /// Decoded progressively from disk, for long-form music
    StreamedTrack,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferedClip => write!(f, "clip"),
            Self::StreamedTrack => write!(f, "track"),
        }
    }
}

/// Underlying playback handle of either kind
pub enum AudioHandle<B: AudioBackend> {
    /// Handle over a decoded sample buffer
    Clip(B::Clip),
    /// Handle over an open stream
    Stream(B::Stream),
}

impl<B: AudioBackend> AudioHandle<B> {
    /// Kind of resource this handle belongs to
    pub const fn kind(&self) -> ResourceKind {
        match self {
            Self::Clip(_) => ResourceKind::BufferedClip,
            Self::Stream(_) => ResourceKind::StreamedTrack,
        }
    }

    /// Common playback capability
    pub fn playback(&self) -> &dyn PlaybackHandle {
        match self {
            Self::Clip(clip) => clip,
            Self::Stream(stream) => stream,
        }
    }

    /// Mutable common playback capability
    pub fn playback_mut(&mut self) -> &mut dyn PlaybackHandle {
        match self {
            Self::Clip(clip) => clip,
            Self::Stream(stream) => stream,
        }
    }
}

/// Clamp to `0..=max`, mapping NaN to 0
pub(crate) fn clamp_domain(value: f32, max: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, max)
    }
}

/// One loaded audio asset
pub struct AudioResource<B: AudioBackend> {
    id: AudioId,
    path: String,
    looping: bool,
    volume: f32,
    pitch: f32,
    duration: Duration,
    handle: AudioHandle<B>,
}

impl<B: AudioBackend> AudioResource<B> {
    /// Assemble a resource around a freshly built handle
    ///
    /// Volume and pitch are clamped into their domains here.
    pub(crate) fn new(
        id: AudioId,
        path: String,
        looping: bool,
        volume: f32,
        pitch: f32,
        duration: Duration,
        handle: AudioHandle<B>,
    ) -> Self {
        Self {
            id,
            path,
            looping,
            volume: clamp_domain(volume, MAX_VOLUME),
            pitch: clamp_domain(pitch, MAX_PITCH),
            duration,
            handle,
        }
    }

    /// Identifier assigned at load
    pub const fn id(&self) -> AudioId {
        self.id
    }

    /// Source path as given at load
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Looping flag set at load
    pub const fn is_looping(&self) -> bool {
        self.looping
    }

    /// Stored volume, always in `0..=100`
    pub const fn volume(&self) -> f32 {
        self.volume
    }

    /// Stored pitch, always in `0..=15`
    pub const fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Duration computed at load
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Resource kind
    pub const fn kind(&self) -> ResourceKind {
        self.handle.kind()
    }

    /// Backend-specific handle, for inspection
    pub const fn raw_handle(&self) -> &AudioHandle<B> {
        &self.handle
    }

    /// Playback capability of the owned handle
    pub fn handle(&self) -> &dyn PlaybackHandle {
        self.handle.playback()
    }

    /// Clamp and store `volume`, then forward it to the handle
    pub(crate) fn set_volume(&mut self, volume: f32) {
        self.volume = clamp_domain(volume, MAX_VOLUME);
        self.handle.playback_mut().set_volume(self.volume);
    }

    /// Clamp and store `pitch`, then forward it to the handle
    pub(crate) fn set_pitch(&mut self, pitch: f32) {
        self.pitch = clamp_domain(pitch, MAX_PITCH);
        self.handle.playback_mut().set_pitch(self.pitch);
    }

    pub(crate) fn handle_mut(&mut self) -> &mut dyn PlaybackHandle {
        self.handle.playback_mut()
    }

    /// Stop the handle and drop it
    pub(crate) fn release(mut self) {
        self.handle.playback_mut().stop();
        log::debug!("Released {} {} ({})", self.kind(), self.id, self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_domain() {
        assert_eq!(clamp_domain(150.0, MAX_VOLUME), 100.0);
        assert_eq!(clamp_domain(-10.0, MAX_VOLUME), 0.0);
        assert_eq!(clamp_domain(42.5, MAX_VOLUME), 42.5);
        assert_eq!(clamp_domain(20.0, MAX_PITCH), 15.0);
        assert_eq!(clamp_domain(f32::NAN, MAX_PITCH), 0.0);
        assert_eq!(clamp_domain(f32::INFINITY, MAX_VOLUME), 100.0);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ResourceKind::BufferedClip.to_string(), "clip");
        assert_eq!(ResourceKind::StreamedTrack.to_string(), "track");
    }
}
