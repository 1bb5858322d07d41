//! Headless audio backend
//!
//! Simulates the playback engine without an output device. Time does not
//! advance on its own: a playing handle stays at its offset until moved.
//! Used for tests and for running without audio hardware.

use super::{AudioBackend, ClipHandle, HandleSettings, PlaybackHandle, PlaybackStatus, StreamHandle};
use crate::audio::{AudioError, AudioResult};
use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

/// Backend producing simulated handles
///
/// Clones share the live-handle counter, so one backend can be handed to
/// several managers and still report totals.
#[derive(Debug, Clone)]
pub struct HeadlessBackend {
    default_duration: Duration,
    durations: HashMap<PathBuf, Duration>,
    broken: HashSet<PathBuf>,
    unplayable: HashSet<PathBuf>,
    live: Rc<Cell<usize>>,
    created: Rc<Cell<usize>>,
}

impl HeadlessBackend {
    /// Create a backend where every file lasts `default_duration`
    pub fn new(default_duration: Duration) -> Self {
        Self {
            default_duration,
            durations: HashMap::new(),
            broken: HashSet::new(),
            unplayable: HashSet::new(),
            live: Rc::new(Cell::new(0)),
            created: Rc::new(Cell::new(0)),
        }
    }

    /// Give the file at `path` its own duration
    pub fn with_duration(mut self, path: impl Into<PathBuf>, duration: Duration) -> Self {
        self.durations.insert(path.into(), duration);
        self
    }

    /// Make decoding the file at `path` fail
    pub fn with_broken(mut self, path: impl Into<PathBuf>) -> Self {
        self.broken.insert(path.into());
        self
    }

    /// Make every `play` of the file at `path` fail
    pub fn with_unplayable(mut self, path: impl Into<PathBuf>) -> Self {
        self.unplayable.insert(path.into());
        self
    }

    /// Number of handles constructed and not yet dropped
    pub fn live_handles(&self) -> usize {
        self.live.get()
    }

    /// Number of handles ever constructed
    pub fn created_handles(&self) -> usize {
        self.created.get()
    }

    fn open(&self, path: &Path, settings: &HandleSettings) -> AudioResult<HeadlessHandle> {
        if self.broken.contains(path) {
            return Err(AudioError::DecodeFailed {
                path: path.to_path_buf(),
                message: "simulated decode failure".to_string(),
            });
        }

        let duration = self
            .durations
            .get(path)
            .copied()
            .unwrap_or(self.default_duration);

        self.live.set(self.live.get() + 1);
        self.created.set(self.created.get() + 1);

        Ok(HeadlessHandle {
            status: PlaybackStatus::Stopped,
            offset: Duration::ZERO,
            duration,
            looping: settings.looping,
            volume: settings.volume,
            pitch: settings.pitch,
            unplayable: self.unplayable.contains(path),
            live: Rc::clone(&self.live),
        })
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl AudioBackend for HeadlessBackend {
    type Clip = HeadlessHandle;
    type Stream = HeadlessHandle;

    fn decode_clip(&self, path: &Path, settings: &HandleSettings) -> AudioResult<Self::Clip> {
        self.open(path, settings)
    }

    fn open_stream(&self, path: &Path, settings: &HandleSettings) -> AudioResult<Self::Stream> {
        self.open(path, settings)
    }
}

/// Simulated playback handle
#[derive(Debug)]
pub struct HeadlessHandle {
    status: PlaybackStatus,
    offset: Duration,
    duration: Duration,
    looping: bool,
    volume: f32,
    pitch: f32,
    unplayable: bool,
    live: Rc<Cell<usize>>,
}

impl HeadlessHandle {
    /// Volume last applied by the manager
    pub const fn volume(&self) -> f32 {
        self.volume
    }

    /// Pitch last applied by the manager
    pub const fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Looping flag applied at construction
    pub const fn is_looping(&self) -> bool {
        self.looping
    }
}

impl PlaybackHandle for HeadlessHandle {
    fn play(&mut self) -> AudioResult<()> {
        if self.unplayable {
            return Err(AudioError::PlaybackFailed("simulated output failure".to_string()));
        }
        self.status = PlaybackStatus::Playing;
        Ok(())
    }

    fn pause(&mut self) {
        if self.status == PlaybackStatus::Playing {
            self.status = PlaybackStatus::Paused;
        }
    }

    fn stop(&mut self) {
        self.status = PlaybackStatus::Stopped;
        self.offset = Duration::ZERO;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch;
    }

    fn set_offset(&mut self, offset: Duration) {
        self.offset = offset.min(self.duration);
    }

    fn offset(&self) -> Duration {
        self.offset
    }

    fn status(&self) -> PlaybackStatus {
        self.status
    }
}

impl ClipHandle for HeadlessHandle {
    fn buffer_duration(&self) -> Duration {
        self.duration
    }
}

impl StreamHandle for HeadlessHandle {
    fn stream_duration(&self) -> Duration {
        self.duration
    }
}

impl Drop for HeadlessHandle {
    fn drop(&mut self) {
        self.live.set(self.live.get().saturating_sub(1));
    }
}
