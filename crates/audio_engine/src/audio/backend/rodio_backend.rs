//! Rodio audio backend implementation
//!
//! Uses the Rodio library for cross-platform audio playback.
//! Rodio is pure Rust and supports WAV, OGG Vorbis, MP3, and FLAC formats.
//! Vorbis goes through Symphonia so streams report their length from the
//! container.
//!
//! Every handle owns at most one [`Sink`]. A freshly built handle has no sink
//! and reports `Stopped`; `play` creates the sink and queues the source,
//! `stop` drops it again. Looping sources stay seekable.
//!
//! # Example
//!
//! ```no_run
//! use audio_engine::audio::backend::rodio_backend::RodioDevice;
//! use audio_engine::audio::ResourceManager;
//!
//! let device = RodioDevice::open_default().unwrap();
//! let mut sounds = ResourceManager::clips(device.backend());
//!
//! let id = sounds.load("resources/audio/explosion.wav").unwrap();
//! sounds.play(id).unwrap();
//! ```

use super::{AudioBackend, ClipHandle, HandleSettings, PlaybackHandle, PlaybackStatus, StreamHandle};
use crate::audio::{AudioError, AudioResult};
use rodio::source::SeekError;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

type BoxedSource = Box<dyn Source<Item = f32> + Send>;

/// Default audio output device
///
/// Must outlive every backend and handle created from it; dropping the
/// device silences all of them.
pub struct RodioDevice {
    /// Audio output stream (must be kept alive)
    _output_stream: OutputStream,
    /// Output stream handle for creating sinks
    stream_handle: OutputStreamHandle,
}

impl RodioDevice {
    /// Open the system's default output device
    ///
    /// # Errors
    /// `BackendInitFailed` if no output device is available.
    pub fn open_default() -> AudioResult<Self> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| AudioError::BackendInitFailed(format!("Failed to create audio output: {e}")))?;

        log::info!("Rodio audio backend initialized");
        Ok(Self {
            _output_stream: stream,
            stream_handle,
        })
    }

    /// Backend that builds handles playing on this device
    pub fn backend(&self) -> RodioBackend {
        RodioBackend {
            stream_handle: self.stream_handle.clone(),
        }
    }
}

impl Drop for RodioDevice {
    fn drop(&mut self) {
        log::info!("Rodio audio backend shutdown");
    }
}

/// Rodio-based audio backend
#[derive(Clone)]
pub struct RodioBackend {
    stream_handle: OutputStreamHandle,
}

fn open_file(path: &Path) -> AudioResult<BufReader<File>> {
    let file = File::open(path).map_err(|e| AudioError::DecodeFailed {
        path: path.to_path_buf(),
        message: format!("Failed to open audio file: {e}"),
    })?;
    Ok(BufReader::new(file))
}

fn decode_error(path: &Path, e: &rodio::decoder::DecoderError) -> AudioError {
    AudioError::DecodeFailed {
        path: path.to_path_buf(),
        message: format!("Failed to decode audio: {e}"),
    }
}

fn open_decoder(path: &Path) -> AudioResult<Decoder<BufReader<File>>> {
    Decoder::new(open_file(path)?).map_err(|e| decode_error(path, &e))
}

/// Freshly opened source for a streamed track
///
/// A looping track restarts its decoder at the end instead of buffering, so
/// seeking keeps working after the first pass.
fn track_source(path: &Path, looping: bool) -> AudioResult<BoxedSource> {
    if looping {
        let decoder = Decoder::new_looped(open_file(path)?).map_err(|e| decode_error(path, &e))?;
        Ok(Box::new(decoder.convert_samples::<f32>()))
    } else {
        Ok(Box::new(open_decoder(path)?.convert_samples::<f32>()))
    }
}

impl AudioBackend for RodioBackend {
    type Clip = RodioClip;
    type Stream = RodioStream;

    fn decode_clip(&self, path: &Path, settings: &HandleSettings) -> AudioResult<RodioClip> {
        let decoder = open_decoder(path)?;
        let channels = decoder.channels();
        let sample_rate = decoder.sample_rate();
        let samples: Arc<[f32]> = decoder.convert_samples::<f32>().collect();

        let source = SharedSamples::new(samples, channels, sample_rate, settings.looping);
        let duration = source.buffer_duration();
        log::debug!("Decoded {:?}: {} samples, {:?}", path, source.samples.len(), duration);

        Ok(RodioClip {
            slot: SinkSlot::new(self.stream_handle.clone(), settings),
            source,
            duration,
        })
    }

    fn open_stream(&self, path: &Path, settings: &HandleSettings) -> AudioResult<RodioStream> {
        let decoder = open_decoder(path)?;
        let duration = match decoder.total_duration() {
            Some(duration) => duration,
            None => {
                // No length in the container, count frames once
                let channels = u64::from(decoder.channels().max(1));
                let sample_rate = f64::from(decoder.sample_rate().max(1));
                let frames = decoder.count() as u64 / channels;
                Duration::from_secs_f64(frames as f64 / sample_rate)
            }
        };
        log::debug!("Opened stream {:?}: {:?}", path, duration);

        Ok(RodioStream {
            slot: SinkSlot::new(self.stream_handle.clone(), settings),
            path: path.to_path_buf(),
            looping: settings.looping,
            duration,
        })
    }
}

/// Sink ownership and parameters shared by both handle kinds
struct SinkSlot {
    stream_handle: OutputStreamHandle,
    sink: Option<Sink>,
    volume: f32,
    pitch: f32,
    start_offset: Duration,
}

impl SinkSlot {
    fn new(stream_handle: OutputStreamHandle, settings: &HandleSettings) -> Self {
        Self {
            stream_handle,
            sink: None,
            volume: settings.volume,
            pitch: settings.pitch,
            start_offset: Duration::ZERO,
        }
    }

    /// Sink that still has queued audio
    fn active(&self) -> Option<&Sink> {
        self.sink.as_ref().filter(|sink| !sink.empty())
    }

    fn play_with(&mut self, make_source: impl FnOnce() -> AudioResult<BoxedSource>) -> AudioResult<()> {
        if let Some(sink) = self.active() {
            sink.play();
            return Ok(());
        }

        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| AudioError::PlaybackFailed(format!("Failed to create sink: {e}")))?;
        let source = make_source()?;

        sink.set_volume(self.volume / 100.0);
        sink.set_speed(self.pitch);
        sink.append(source);

        if !self.start_offset.is_zero() {
            if let Err(e) = sink.try_seek(self.start_offset) {
                log::warn!("Seek to {:?} failed: {e}", self.start_offset);
            }
            self.start_offset = Duration::ZERO;
        }
        self.sink = Some(sink);
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = self.active() {
            sink.pause();
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.start_offset = Duration::ZERO;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(sink) = &self.sink {
            sink.set_volume(volume / 100.0);
        }
    }

    fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch;
        if let Some(sink) = &self.sink {
            sink.set_speed(pitch);
        }
    }

    fn set_offset(&mut self, offset: Duration) {
        if let Some(sink) = self.active() {
            if let Err(e) = sink.try_seek(offset) {
                log::warn!("Seek to {offset:?} failed: {e}");
            }
        } else {
            // Applied on the next play
            self.start_offset = offset;
        }
    }

    fn offset(&self) -> Duration {
        self.active().map_or(self.start_offset, Sink::get_pos)
    }

    fn status(&self) -> PlaybackStatus {
        match self.active() {
            None => PlaybackStatus::Stopped,
            Some(sink) if sink.is_paused() => PlaybackStatus::Paused,
            Some(_) => PlaybackStatus::Playing,
        }
    }
}

/// Decoded samples shared between a clip and every source it queues
///
/// Cloning only bumps the buffer's reference count.
#[derive(Clone)]
struct SharedSamples {
    samples: Arc<[f32]>,
    channels: u16,
    sample_rate: u32,
    looping: bool,
    cursor: usize,
}

impl SharedSamples {
    fn new(samples: Arc<[f32]>, channels: u16, sample_rate: u32, looping: bool) -> Self {
        Self {
            samples,
            channels: channels.max(1),
            sample_rate: sample_rate.max(1),
            looping,
            cursor: 0,
        }
    }

    fn buffer_duration(&self) -> Duration {
        let frames = self.samples.len() / usize::from(self.channels);
        Duration::from_secs_f64(frames as f64 / f64::from(self.sample_rate))
    }
}

impl Iterator for SharedSamples {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.cursor >= self.samples.len() && self.looping {
            self.cursor = 0;
        }
        let sample = self.samples.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(sample)
    }
}

impl Source for SharedSamples {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        (!self.looping).then(|| self.buffer_duration())
    }

    fn try_seek(&mut self, pos: Duration) -> Result<(), SeekError> {
        let frame = (pos.as_secs_f64() * f64::from(self.sample_rate)).round() as usize;
        let cursor = frame.saturating_mul(usize::from(self.channels));
        self.cursor = if self.looping && !self.samples.is_empty() {
            cursor % self.samples.len()
        } else {
            cursor.min(self.samples.len())
        };
        Ok(())
    }
}

/// Clip decoded fully into memory
pub struct RodioClip {
    slot: SinkSlot,
    source: SharedSamples,
    duration: Duration,
}

impl PlaybackHandle for RodioClip {
    fn play(&mut self) -> AudioResult<()> {
        let source: BoxedSource = Box::new(self.source.clone());
        self.slot.play_with(move || Ok(source))
    }

    fn pause(&mut self) {
        self.slot.pause();
    }

    fn stop(&mut self) {
        self.slot.stop();
    }

    fn set_volume(&mut self, volume: f32) {
        self.slot.set_volume(volume);
    }

    fn set_pitch(&mut self, pitch: f32) {
        self.slot.set_pitch(pitch);
    }

    fn set_offset(&mut self, offset: Duration) {
        self.slot.set_offset(offset);
    }

    fn offset(&self) -> Duration {
        self.slot.offset()
    }

    fn status(&self) -> PlaybackStatus {
        self.slot.status()
    }
}

impl ClipHandle for RodioClip {
    fn buffer_duration(&self) -> Duration {
        self.duration
    }
}

/// Track decoded from disk while playing
pub struct RodioStream {
    slot: SinkSlot,
    path: PathBuf,
    looping: bool,
    duration: Duration,
}

impl PlaybackHandle for RodioStream {
    fn play(&mut self) -> AudioResult<()> {
        let (path, looping) = (&self.path, self.looping);
        self.slot.play_with(|| track_source(path, looping))
    }

    fn pause(&mut self) {
        self.slot.pause();
    }

    fn stop(&mut self) {
        self.slot.stop();
    }

    fn set_volume(&mut self, volume: f32) {
        self.slot.set_volume(volume);
    }

    fn set_pitch(&mut self, pitch: f32) {
        self.slot.set_pitch(pitch);
    }

    fn set_offset(&mut self, offset: Duration) {
        self.slot.set_offset(offset);
    }

    fn offset(&self) -> Duration {
        self.slot.offset()
    }

    fn status(&self) -> PlaybackStatus {
        self.slot.status()
    }
}

impl StreamHandle for RodioStream {
    fn stream_duration(&self) -> Duration {
        self.duration
    }
}
