//! Kind-specific loaders
//!
//! The only code that knows how a buffered clip differs from a streamed
//! track: which backend call builds the handle, and where the duration
//! comes from.

use crate::audio::backend::{AudioBackend, ClipHandle, HandleSettings, StreamHandle};
use crate::audio::resource::{clamp_domain, MAX_PITCH, MAX_VOLUME};
use crate::audio::{AudioHandle, AudioResult, ResourceKind};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Parameters for loading one resource
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Loop back to the start when the end is reached
    pub looping: bool,
    /// Initial volume, clamped to `0..=100`
    pub volume: f32,
    /// Initial pitch, clamped to `0..=15`
    pub pitch: f32,
}

impl LoadOptions {
    /// Set looping
    pub const fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Set initial volume
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = clamp_domain(volume, MAX_VOLUME);
        self
    }

    /// Set initial pitch
    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = clamp_domain(pitch, MAX_PITCH);
        self
    }

    /// Settings handed to the backend, with both values clamped
    pub(crate) fn handle_settings(&self) -> HandleSettings {
        HandleSettings {
            looping: self.looping,
            volume: clamp_domain(self.volume, MAX_VOLUME),
            pitch: clamp_domain(self.pitch, MAX_PITCH),
        }
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            looping: false,
            volume: 100.0,
            pitch: 1.0,
        }
    }
}

/// Build a handle of `kind` for `path` and read its duration
pub(crate) fn build_handle<B: AudioBackend>(
    backend: &B,
    kind: ResourceKind,
    path: &Path,
    settings: &HandleSettings,
) -> AudioResult<(AudioHandle<B>, Duration)> {
    match kind {
        ResourceKind::BufferedClip => load_clip(backend, path, settings),
        ResourceKind::StreamedTrack => load_track(backend, path, settings),
    }
}

/// Decode into memory; duration is that of the sample buffer
fn load_clip<B: AudioBackend>(
    backend: &B,
    path: &Path,
    settings: &HandleSettings,
) -> AudioResult<(AudioHandle<B>, Duration)> {
    let clip = backend.decode_clip(path, settings)?;
    let duration = clip.buffer_duration();
    Ok((AudioHandle::Clip(clip), duration))
}

/// Open for streaming; duration is what the stream reports
fn load_track<B: AudioBackend>(
    backend: &B,
    path: &Path,
    settings: &HandleSettings,
) -> AudioResult<(AudioHandle<B>, Duration)> {
    let stream = backend.open_stream(path, settings)?;
    let duration = stream.stream_duration();
    Ok((AudioHandle::Stream(stream), duration))
}
